use std::collections::BTreeSet;

use axum::http::StatusCode;
use serde::Deserialize;

use tillgate_access::{AdminError, Permission, Role};
use tillgate_core::UserId;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateRolePolicyRequest {
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOverridesRequest {
    pub granted: Vec<String>,
    pub revoked: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    /// Omit to mint a fresh id; supply one to adopt an id issued by the
    /// identity system.
    pub user_id: Option<String>,
    pub role: String,
    pub display_name: String,
}

// -------------------------
// Identifier parsing
// -------------------------

/// Unknown identifiers become `AdminError::InvalidPermission`, answered
/// through the same mapping as every other admin failure.
pub fn parse_permission(s: &str) -> Result<Permission, axum::response::Response> {
    s.parse().map_err(|_| {
        errors::admin_error_to_response(AdminError::InvalidPermission(s.to_string()))
    })
}

pub fn parse_permission_set(
    raw: &[String],
) -> Result<BTreeSet<Permission>, axum::response::Response> {
    raw.iter().map(|s| parse_permission(s)).collect()
}

/// A role name in a path addresses a resource; an unknown one is a
/// missing resource, not a malformed request.
pub fn parse_role_path(s: &str) -> Result<Role, axum::response::Response> {
    s.parse().map_err(|_| {
        errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("unknown role: {s}"),
        )
    })
}

pub fn parse_user_id(s: &str) -> Result<UserId, axum::response::Response> {
    s.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id"))
}
