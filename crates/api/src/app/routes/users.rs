use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};

use tillgate_access::UserRecord;
use tillgate_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(register_user))
        .route("/users/:id", delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.admin.list_users(ctx.principal()).await {
        Ok(users) => (StatusCode::OK, Json(serde_json::json!({ "users": users }))).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::RegisterUserRequest>,
) -> axum::response::Response {
    // Unlike a path segment, a bad role here is a malformed request body.
    let role = match body.role.parse() {
        Ok(r) => r,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_role",
                format!("unknown role identifier: {}", body.role),
            );
        }
    };
    let user_id = match body.user_id.as_deref() {
        Some(raw) => match dto::parse_user_id(raw) {
            Ok(id) => id,
            Err(resp) => return resp,
        },
        None => UserId::new(),
    };

    let record = UserRecord {
        user_id,
        role,
        display_name: body.display_name,
    };

    match services.admin.register_user(ctx.principal(), record).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id = match dto::parse_user_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.admin.delete_user(ctx.principal(), user_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}
