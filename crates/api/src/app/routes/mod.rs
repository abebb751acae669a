use axum::{Router, routing::get};

pub mod access;
pub mod overrides;
pub mod roles;
pub mod system;
pub mod users;

/// Router for all endpoints behind the auth middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/access", access::router())
        .nest("/admin", admin_router())
}

/// Administration surface: catalogs, role policies, staff, overrides.
fn admin_router() -> Router {
    Router::new()
        .merge(roles::router())
        .merge(users::router())
        .merge(overrides::router())
}
