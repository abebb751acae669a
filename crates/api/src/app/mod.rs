//! HTTP application wiring (Axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: store selection and engine assembly
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and identifier parsing
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::{Extension, Router, routing::get};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};

use crate::auth::TokenVerifier;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

const REQUEST_DEADLINE: Duration = Duration::from_secs(15);

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let verifier = Arc::new(TokenVerifier::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { verifier };

    let services = Arc::new(services::build_services().await);

    // Everything except /health goes through the auth middleware; the
    // guard inside each handler decides what anonymous callers may do.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(REQUEST_DEADLINE)),
        )
}

async fn handle_middleware_error(err: BoxError) -> axum::response::Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        errors::json_error(StatusCode::REQUEST_TIMEOUT, "timeout", "request timed out")
    } else {
        errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            err.to_string(),
        )
    }
}
