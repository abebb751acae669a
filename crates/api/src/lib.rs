//! HTTP API: bearer-token middleware, access checks, guarded admin routes.

pub mod app;
pub mod auth;
pub mod context;
pub mod middleware;
