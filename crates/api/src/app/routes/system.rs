use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Identity echo: who the token says you are and what you can do right
/// now. The permission list is the resolved effective set, so a client
/// can drive its whole menu from this one call.
pub async fn whoami(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    let Some(principal) = ctx.principal() else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        );
    };

    match services
        .resolver
        .resolve_all(principal.role, principal.user_id)
        .await
    {
        Ok(permissions) => Json(serde_json::json!({
            "user_id": principal.user_id.to_string(),
            "role": principal.role.as_str(),
            "business_id": principal.business_id.to_string(),
            "permissions": permissions,
        }))
        .into_response(),
        Err(err) => errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            err.to_string(),
        ),
    }
}
