use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Opaque numeric user identity, assigned by the repository.
pub type UserId = i64;

/// Role assigned to a user. Stored with the record, not interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Unique, matched exactly as stored
    pub email: String,
    /// Argon2 PHC string, or a legacy SHA-256 hex digest
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Single-use reset token; `Some` while a reset is pending
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_pending_reset(&self) -> bool {
        self.reset_token.is_some()
    }
}

/// Record handed to the repository on registration. The password is
/// already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// User response DTO (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            roles: user.roles.into_iter().map(|r| r.name).collect(),
            created_at: user.created_at,
        }
    }
}

/// DTO for user registration
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 3, max = 130))]
    pub password: String,
}

/// DTO for user login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// DTO for requesting a password reset
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email, length(max = 255))]
    pub email: String,
}

/// DTO for completing a password reset
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasswordRequest {
    #[validate(length(min = 1, max = 130))]
    pub password: String,
    #[serde(alias = "rememberToken")]
    #[validate(length(min = 1))]
    pub reset_token: String,
}

/// Response after a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Some("success".to_string()),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_credentials() {
        let now = Utc::now();
        let user = User {
            id: 7,
            first_name: "Bob".to_string(),
            last_name: "Builder".to_string(),
            email: "bob@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            reset_token: Some("pending".to_string()),
            roles: vec![],
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("resetToken").is_none());
        assert_eq!(json["firstName"], "Bob");
        assert_eq!(user.full_name(), "Bob Builder");
        assert!(user.has_pending_reset());
    }

    #[test]
    fn test_register_request_validation() {
        let valid: RegisterRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Bob",
            "lastName": "Builder",
            "email": "bob@example.com",
            "password": "secret123"
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let short_password = RegisterRequest {
            password: "ab".to_string(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_create_password_request_accepts_legacy_field_name() {
        let request: CreatePasswordRequest = serde_json::from_value(serde_json::json!({
            "password": "newpass1",
            "rememberToken": "abc123"
        }))
        .unwrap();
        assert_eq!(request.reset_token, "abc123");
    }

    #[test]
    fn test_message_response_shapes() {
        let plain = serde_json::to_value(MessageResponse::new("done")).unwrap();
        assert!(plain.get("status").is_none());

        let success = serde_json::to_value(MessageResponse::success("sent")).unwrap();
        assert_eq!(success["status"], "success");
    }
}
