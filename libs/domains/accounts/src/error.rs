use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_helpers::{ErrorCode, ErrorResponse};
use thiserror::Error;

use crate::password::PasswordError;
use crate::token::TokenError;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Password cannot be empty")]
    EmptyInput,

    #[error("User not found")]
    NotFound,

    #[error("User with email '{0}' already exists")]
    Conflict(String),

    /// Unknown email and wrong password both land here.
    #[error("Invalid email or password")]
    Unauthorized,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

pub type AccountResult<T> = Result<T, AccountError>;

impl From<PasswordError> for AccountError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::EmptyInput => AccountError::EmptyInput,
            PasswordError::Hash(msg) => AccountError::PasswordHash(msg),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AccountError::EmptyInput => (ErrorCode::ValidationError, self.to_string()),
            AccountError::NotFound => (ErrorCode::NotFound, self.to_string()),
            AccountError::Conflict(_) => (ErrorCode::Conflict, self.to_string()),
            AccountError::Unauthorized => (ErrorCode::Unauthorized, self.to_string()),
            AccountError::Token(TokenError::Signing(msg)) => {
                tracing::error!("Session token signing error: {}", msg);
                (
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                )
            }
            AccountError::Token(_) => (
                ErrorCode::Unauthorized,
                "Invalid or expired session token".to_string(),
            ),
            AccountError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                (
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                )
            }
        };

        (code.status(), Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AccountError::EmptyInput, StatusCode::BAD_REQUEST),
            (AccountError::NotFound, StatusCode::NOT_FOUND),
            (
                AccountError::Conflict("a@x.com".into()),
                StatusCode::CONFLICT,
            ),
            (AccountError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                AccountError::Token(TokenError::Expired),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AccountError::Token(TokenError::Signing("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AccountError::PasswordHash("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_password_error_conversion() {
        assert!(matches!(
            AccountError::from(PasswordError::EmptyInput),
            AccountError::EmptyInput
        ));
        assert!(matches!(
            AccountError::from(PasswordError::Hash("x".into())),
            AccountError::PasswordHash(_)
        ));
    }
}
