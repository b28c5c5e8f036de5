//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use kinship_auth_core::Claims;

use crate::state::AppState;

/// Authenticated user extracted from a bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// Error response for auth failures
#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    error: AuthErrorDetail,
}

#[derive(Debug, Serialize)]
struct AuthErrorDetail {
    code: &'static str,
    message: &'static str,
}

/// Auth rejection type
#[derive(Debug)]
pub struct AuthRejection {
    code: &'static str,
    message: &'static str,
}

impl AuthRejection {
    const MISSING: Self = Self {
        code: "MISSING_TOKEN",
        message: "missing authorization header",
    };

    const MALFORMED: Self = Self {
        code: "INVALID_HEADER",
        message: "invalid authorization header format",
    };

    const INVALID: Self = Self {
        code: "INVALID_TOKEN",
        message: "invalid or expired token",
    };
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = AuthErrorResponse {
            error: AuthErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let app_state = AppState::from_ref(state);

            let token = extract_bearer(parts)?;

            let claims = app_state.auth.validate_token(token).map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                AuthRejection::INVALID
            })?;

            Ok(AuthUser(claims))
        })
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(parts: &Parts) -> Result<&str, AuthRejection> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthRejection::MISSING)?
        .to_str()
        .map_err(|_| AuthRejection::MALFORMED)?;

    let mut split = value.split(' ');
    match (split.next(), split.next(), split.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthRejection::MALFORMED),
    }
}
