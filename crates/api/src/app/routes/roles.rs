use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/permissions", get(list_permissions))
        .route("/roles/:role/policy", get(view_policy).put(update_policy))
}

pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.admin.list_roles(ctx.principal()).await {
        Ok(roles) => (StatusCode::OK, Json(serde_json::json!({ "roles": roles }))).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.admin.list_permissions(ctx.principal()).await {
        Ok(permissions) => (
            StatusCode::OK,
            Json(serde_json::json!({ "permissions": permissions })),
        )
            .into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

pub async fn view_policy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(role): Path<String>,
) -> axum::response::Response {
    let role = match dto::parse_role_path(&role) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match services.admin.view_role_policy(ctx.principal(), role).await {
        Ok(permissions) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "role": role.as_str(),
                "editable": role.is_editable(),
                "permissions": permissions,
            })),
        )
            .into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

pub async fn update_policy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(role): Path<String>,
    Json(body): Json<dto::UpdateRolePolicyRequest>,
) -> axum::response::Response {
    let role = match dto::parse_role_path(&role) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let permissions = match dto::parse_permission_set(&body.permissions) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match services
        .admin
        .update_role_policy(ctx.principal(), role, permissions.clone())
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "role": role.as_str(),
                "permissions": permissions,
            })),
        )
            .into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}
