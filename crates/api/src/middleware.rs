use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::auth::TokenVerifier;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
}

/// Establish the caller's identity before routing.
///
/// A missing Authorization header is not an error here: the request
/// proceeds as anonymous and the guard decides per route. A header that
/// is present but malformed, forged, or expired is rejected outright.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let context = match bearer_token(req.headers())? {
        None => AuthContext::anonymous(),
        Some(token) => {
            let claims = state.verifier.verify(token).map_err(|err| {
                tracing::warn!(error = %err, "rejected bearer token");
                StatusCode::UNAUTHORIZED
            })?;
            AuthContext::authenticated(claims.principal())
        }
    };

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?
        .trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}
