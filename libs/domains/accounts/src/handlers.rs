use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{AccountError, AccountResult};
use crate::models::{
    CreatePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    ResetPasswordRequest, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::CredentialService;

pub const TAG: &str = "accounts";

/// OpenAPI documentation for the Accounts API
#[derive(OpenApi)]
#[openapi(
    paths(login, register, reset_password, create_password, me),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            ResetPasswordRequest,
            CreatePasswordRequest,
            MessageResponse,
            UserResponse
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Registration, login and password reset")
    )
)]
pub struct ApiDoc;

/// Create the accounts router
pub fn router<R: UserRepository + 'static>(service: CredentialService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/reset-password", post(reset_password))
        .route("/create-password", post(create_password))
        .route("/me", get(me))
        .with_state(shared_service)
}

/// Exchange credentials for a session token
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<CredentialService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AccountResult<Json<LoginResponse>> {
    let token = service.login(input).await?;
    Ok(Json(LoginResponse { token }))
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<CredentialService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> AccountResult<impl IntoResponse> {
    service.register(input).await?;
    Ok(StatusCode::CREATED)
}

/// Start a password reset; the token is delivered out of band
#[utoipa::path(
    post,
    path = "/reset-password",
    tag = TAG,
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Reset token issued", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reset_password<R: UserRepository>(
    State(service): State<Arc<CredentialService<R>>>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> AccountResult<Json<MessageResponse>> {
    service.request_password_reset(&input.email).await?;
    Ok(Json(MessageResponse::success(
        "Reset password link sent to email",
    )))
}

/// Consume a reset token and set a new password
#[utoipa::path(
    post,
    path = "/create-password",
    tag = TAG,
    request_body = CreatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_password<R: UserRepository>(
    State(service): State<Arc<CredentialService<R>>>,
    ValidatedJson(input): ValidatedJson<CreatePasswordRequest>,
) -> AccountResult<Json<MessageResponse>> {
    service
        .complete_password_reset(&input.reset_token, &input.password)
        .await?;
    Ok(Json(MessageResponse::new("Password Updated Successfully")))
}

/// Current user, resolved from the `Authorization: Bearer` session token
#[utoipa::path(
    get,
    path = "/me",
    tag = TAG,
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn me<R: UserRepository>(
    State(service): State<Arc<CredentialService<R>>>,
    headers: HeaderMap,
) -> AccountResult<Json<UserResponse>> {
    let token = bearer_token(&headers).ok_or(AccountError::Unauthorized)?;
    let user = service.authenticate(token).await?;
    Ok(Json(user.into()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
