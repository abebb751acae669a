use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tillgate_access::AdminError;

pub fn admin_error_to_response(err: AdminError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        AdminError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message)
        }
        AdminError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", message),
        AdminError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        AdminError::InvalidPermission(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_permission", message)
        }
        AdminError::ConflictingOverride(_) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "conflicting_override",
            message,
        ),
        AdminError::StoreUnavailable(_) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "store_unavailable",
            message,
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
