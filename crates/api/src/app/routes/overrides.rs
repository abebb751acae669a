use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use tillgate_access::{AdminError, OverrideView, Permission};
use tillgate_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/users/:id/overrides",
            get(view).put(replace).delete(clear_all),
        )
        .route("/users/:id/overrides/:permission", delete(clear_one))
        .route("/users/:id/overrides/:permission/grant", post(grant))
        .route("/users/:id/overrides/:permission/revoke", post(revoke))
}

/// Every mutation answers with the refreshed screen state, so the client
/// never has to issue a follow-up read.
fn respond(result: Result<OverrideView, AdminError>) -> axum::response::Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

fn parse_target(
    id: &str,
    permission: &str,
) -> Result<(UserId, Permission), axum::response::Response> {
    let user_id = dto::parse_user_id(id)?;
    let permission = dto::parse_permission(permission)?;
    Ok((user_id, permission))
}

pub async fn view(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id = match dto::parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    respond(
        services
            .admin
            .view_user_overrides(ctx.principal(), user_id)
            .await,
    )
}

pub async fn replace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOverridesRequest>,
) -> axum::response::Response {
    let user_id = match dto::parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let granted = match dto::parse_permission_set(&body.granted) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let revoked = match dto::parse_permission_set(&body.revoked) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    respond(
        services
            .admin
            .update_user_overrides(ctx.principal(), user_id, granted, revoked)
            .await,
    )
}

pub async fn clear_all(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id = match dto::parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    respond(
        services
            .admin
            .clear_user_overrides(ctx.principal(), user_id)
            .await,
    )
}

pub async fn grant(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, permission)): Path<(String, String)>,
) -> axum::response::Response {
    let (user_id, permission) = match parse_target(&id, &permission) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    respond(
        services
            .admin
            .grant_override(ctx.principal(), user_id, permission)
            .await,
    )
}

pub async fn revoke(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, permission)): Path<(String, String)>,
) -> axum::response::Response {
    let (user_id, permission) = match parse_target(&id, &permission) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    respond(
        services
            .admin
            .revoke_override(ctx.principal(), user_id, permission)
            .await,
    )
}

pub async fn clear_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path((id, permission)): Path<(String, String)>,
) -> axum::response::Response {
    let (user_id, permission) = match parse_target(&id, &permission) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    respond(
        services
            .admin
            .clear_override(ctx.principal(), user_id, permission)
            .await,
    )
}
