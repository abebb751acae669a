//! `tillgate-access` — the permission resolution engine.
//!
//! Pure domain: catalogs, policy and override semantics, resolution and
//! enforcement. Intentionally decoupled from HTTP and storage; stores are
//! traits implemented elsewhere.

pub mod admin;
pub mod catalog;
pub mod guard;
pub mod overrides;
pub mod policy;
pub mod principal;
pub mod resolver;

pub use admin::{
    AdminApi, AdminError, DirectoryError, OverrideView, PermissionInfo, RoleInfo, UserDirectory,
    UserRecord,
};
pub use catalog::{CatalogError, Permission, PermissionCategory, Role};
pub use guard::{AccessGuard, Decision, DenyReason};
pub use overrides::{Override, OverrideError, UserOverrideStore, UserOverrides};
pub use policy::{PolicyError, RolePolicyStore, default_permissions};
pub use principal::Principal;
pub use resolver::{ResolveError, Resolver, effective_set};
