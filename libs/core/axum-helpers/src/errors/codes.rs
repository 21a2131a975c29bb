//! Machine-readable error codes carried in every [`ErrorResponse`](super::ErrorResponse).
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::Conflict;
//! assert_eq!(code.as_str(), "CONFLICT");
//! assert_eq!(code.code(), 1008);
//! ```

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    IntoStaticStr,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body parsed but failed `validator` rules
    ValidationError,
    /// Body was not valid JSON for the target type
    JsonExtraction,
    NotFound,
    InternalError,
    /// Missing, wrong or expired credentials
    Unauthorized,
    /// Unique constraint (e.g. email) violated
    Conflict,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// (numeric code, HTTP status, default message)
    const fn attributes(self) -> (i32, StatusCode, &'static str) {
        match self {
            Self::ValidationError => (1001, StatusCode::BAD_REQUEST, "Request validation failed"),
            Self::JsonExtraction => (1003, StatusCode::BAD_REQUEST, "Failed to parse request body"),
            Self::NotFound => (1004, StatusCode::NOT_FOUND, "Resource not found"),
            Self::InternalError => (
                1005,
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
            Self::Unauthorized => (1006, StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::Conflict => (1008, StatusCode::CONFLICT, "Resource already exists"),
        }
    }

    pub fn code(&self) -> i32 {
        self.attributes().0
    }

    pub fn status(&self) -> StatusCode {
        self.attributes().1
    }

    pub fn default_message(&self) -> &'static str {
        self.attributes().2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_string_form_matches_serde() {
        for code in ErrorCode::iter() {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
            assert_eq!(code.to_string(), code.as_str());
        }
        assert_eq!(ErrorCode::JsonExtraction.as_str(), "JSON_EXTRACTION");
    }

    #[test]
    fn test_numeric_codes_are_unique() {
        let codes: HashSet<i32> = ErrorCode::iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), ErrorCode::iter().count());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
    }
}
