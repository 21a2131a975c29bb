//! JSON extractor with automatic validation using the validator crate.

use crate::errors::{ErrorCode, ErrorResponse};
use axum::{
    extract::{FromRequest, Json, Request, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON extractor that runs `validator` rules before the handler sees the
/// payload.
///
/// Malformed bodies render as `JSON_EXTRACTION`, rule violations as
/// `VALIDATION_ERROR` with per-field details. Both are 400.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct ResetPasswordRequest {
///     #[validate(email)]
///     email: String,
/// }
///
/// async fn reset(ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(extraction_failed)?;

        data.validate().map_err(validation_failed)?;

        Ok(ValidatedJson(data))
    }
}

fn extraction_failed(rejection: JsonRejection) -> Response {
    let code = ErrorCode::JsonExtraction;
    (
        code.status(),
        Json(ErrorResponse::new(code, rejection.body_text())),
    )
        .into_response()
}

/// `details` is `{ "<field>": [{ "code", "message", "params" }, ..] }`
fn validation_failed(errors: ValidationErrors) -> Response {
    let code = ErrorCode::ValidationError;
    let mut body = ErrorResponse::new(code, code.default_message());

    match serde_json::to_value(errors.field_errors()) {
        Ok(details) => body = body.with_details(details),
        Err(e) => tracing::warn!(error = %e, "Failed to serialize validation errors"),
    }

    (code.status(), Json(body)).into_response()
}
