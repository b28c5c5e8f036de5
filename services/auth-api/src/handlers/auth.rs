//! Authentication handlers (register, login, password reset, profile)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use kinship_auth_core::Claims;
use kinship_types::{
    AuthResponse, LoginRequest, MessageResponse, PasswordResetConfirm, PasswordResetRequest,
    RegisterRequest,
};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::state::AppState;
use crate::validation::Validate;

/// Unwrap a JSON body and run its shape checks
fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    let Json(body) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        ApiError::BadRequest
    })?;
    body.validate()?;
    Ok(body)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let req = validated(payload)?;
    let resp = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let req = validated(payload)?;
    Ok(Json(state.auth.login(req).await?))
}

/// POST /api/auth/password-reset/request
///
/// Responds identically whether or not the email belongs to an account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    payload: Result<Json<PasswordResetRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let req = validated(payload)?;
    Ok(Json(state.auth.request_password_reset(&req.email).await))
}

/// POST /api/auth/password-reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    payload: Result<Json<PasswordResetConfirm>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let req = validated(payload)?;
    let resp = state
        .auth
        .confirm_password_reset(&req.token, &req.new_password)
        .await?;
    Ok(Json(resp))
}

/// GET /api/auth/profile
///
/// Echo the verified token claims
pub async fn profile(AuthUser(claims): AuthUser) -> Json<Claims> {
    Json(claims)
}
