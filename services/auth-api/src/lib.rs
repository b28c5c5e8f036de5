//! Kinship Auth API
//!
//! HTTP boundary for registration, login and password reset. Request bodies
//! are shape-checked here and handed to [`kinship_auth_core::AuthService`].

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;
pub mod validation;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::{Config, ConfigError};
pub use state::AppState;

/// Build the application router with middleware
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/password-reset/request",
            post(handlers::request_password_reset),
        )
        .route(
            "/password-reset/confirm",
            post(handlers::confirm_password_reset),
        )
        .route("/profile", get(handlers::profile));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .nest("/api/auth", auth_routes)
        .layer(TimeoutLayer::new(state.request_timeout()))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open CORS in development; only the frontend origin in production
fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if !config.is_production() {
        return cors.allow_origin(Any);
    }

    match HeaderValue::from_str(config.smtp.frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(AllowOrigin::exact(origin)),
        Err(_) => {
            tracing::warn!(
                frontend_url = %config.smtp.frontend_url,
                "FRONTEND_URL is not a valid origin, CORS allows no cross-origin requests"
            );
            cors
        }
    }
}
