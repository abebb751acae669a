use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use tillgate_access::{Decision, DenyReason};

use crate::app::dto;
use crate::app::services::AppServices;
use crate::context::AuthContext;

pub fn router() -> Router {
    Router::new().route("/check", get(check))
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub permission: String,
}

/// Point query against the engine: may the caller do this, right now?
///
/// Always 200 for a well-formed request; the decision is data, not a
/// transport failure.
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<CheckQuery>,
) -> axum::response::Response {
    let permission = match dto::parse_permission(&query.permission) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let body = match services.guard.authorize(ctx.principal(), permission).await {
        Decision::Allow => serde_json::json!({
            "permission": permission.as_str(),
            "decision": "allow",
        }),
        Decision::Deny(reason) => serde_json::json!({
            "permission": permission.as_str(),
            "decision": "deny",
            "reason": deny_reason_code(reason),
        }),
    };

    Json(body).into_response()
}

fn deny_reason_code(reason: DenyReason) -> &'static str {
    match reason {
        DenyReason::Unauthenticated => "unauthenticated",
        DenyReason::MissingPermission(_) => "missing_permission",
        DenyReason::PolicyUnavailable => "policy_unavailable",
    }
}
