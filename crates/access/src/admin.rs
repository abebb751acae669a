//! Administration: role policies, user overrides, staff records.
//!
//! [`AdminApi`] is the mutation surface behind the back-office permission
//! screens. It guards itself with the same engine it administers, so the
//! ability to edit permissions is itself a permission. Every write
//! invalidates the resolver cache before returning; the next check anywhere
//! in the process sees the new policy.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tillgate_core::UserId;

use crate::catalog::{Permission, PermissionCategory, Role};
use crate::guard::{AccessGuard, Decision, DenyReason};
use crate::overrides::{OverrideError, UserOverrideStore, UserOverrides};
use crate::policy::{PolicyError, RolePolicyStore};
use crate::principal::Principal;
use crate::resolver::{ResolveError, Resolver};

// ─────────────────────────────────────────────────────────────────────────────
// User directory boundary
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// A staff member as the directory knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub role: Role,
    pub display_name: String,
}

/// Identity lookup boundary.
///
/// User identity is owned outside the engine; this is the minimal surface
/// the administration screens need: existence, role, a name to display.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup(&self, user_id: UserId) -> Result<Option<UserRecord>, DirectoryError>;

    async fn upsert(&self, record: UserRecord) -> Result<(), DirectoryError>;

    /// Remove a user. Returns whether a record existed.
    async fn remove(&self, user_id: UserId) -> Result<bool, DirectoryError>;

    async fn list(&self) -> Result<Vec<UserRecord>, DirectoryError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Error taxonomy
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid permission: {0}")]
    InvalidPermission(String),

    /// Bulk override edit listed a permission on both sides. Nothing was
    /// persisted.
    #[error("permission(s) both granted and revoked: {}", crate::overrides::wire_list(.0))]
    ConflictingOverride(Vec<Permission>),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<PolicyError> for AdminError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::RoleNotEditable(role) => {
                AdminError::Forbidden(format!("role {role} is not editable"))
            }
            PolicyError::Unavailable(msg) => AdminError::StoreUnavailable(msg),
        }
    }
}

impl From<OverrideError> for AdminError {
    fn from(err: OverrideError) -> Self {
        match err {
            OverrideError::Conflicting(permissions) => {
                AdminError::ConflictingOverride(permissions)
            }
            OverrideError::Unavailable(msg) => AdminError::StoreUnavailable(msg),
        }
    }
}

impl From<DirectoryError> for AdminError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Unavailable(msg) => AdminError::StoreUnavailable(msg),
        }
    }
}

impl From<ResolveError> for AdminError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Policy(e) => e.into(),
            ResolveError::Overrides(e) => e.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View models
// ─────────────────────────────────────────────────────────────────────────────

/// Catalog entry for role pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub role: Role,
    pub editable: bool,
}

/// Catalog entry for permission pickers, grouped client-side by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub permission: Permission,
    pub category: PermissionCategory,
}

/// Everything the per-user permission screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideView {
    pub user_id: UserId,
    pub role: Role,
    pub display_name: String,
    pub granted: BTreeSet<Permission>,
    pub revoked: BTreeSet<Permission>,
    pub effective: BTreeSet<Permission>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Administration service
// ─────────────────────────────────────────────────────────────────────────────

/// Self-guarded administration service.
pub struct AdminApi {
    policies: Arc<dyn RolePolicyStore>,
    overrides: Arc<dyn UserOverrideStore>,
    directory: Arc<dyn UserDirectory>,
    resolver: Arc<Resolver>,
    guard: AccessGuard,
}

impl AdminApi {
    pub fn new(
        policies: Arc<dyn RolePolicyStore>,
        overrides: Arc<dyn UserOverrideStore>,
        directory: Arc<dyn UserDirectory>,
        resolver: Arc<Resolver>,
    ) -> Self {
        let guard = AccessGuard::new(resolver.clone());
        Self {
            policies,
            overrides,
            directory,
            resolver,
            guard,
        }
    }

    async fn require(
        &self,
        actor: Option<&Principal>,
        permission: Permission,
    ) -> Result<(), AdminError> {
        match self.guard.authorize(actor, permission).await {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthenticated) => Err(AdminError::Unauthenticated),
            Decision::Deny(DenyReason::MissingPermission(p)) => {
                Err(AdminError::Forbidden(format!("requires {p}")))
            }
            Decision::Deny(DenyReason::PolicyUnavailable) => Err(AdminError::StoreUnavailable(
                "authorization policy unavailable".into(),
            )),
        }
    }

    async fn lookup_required(&self, user_id: UserId) -> Result<UserRecord, AdminError> {
        self.directory
            .lookup(user_id)
            .await?
            .ok_or_else(|| AdminError::NotFound(format!("user {user_id}")))
    }

    async fn override_view(&self, record: &UserRecord) -> Result<OverrideView, AdminError> {
        let overrides = self.overrides.overrides(record.user_id).await?;
        let effective = self
            .resolver
            .resolve_all(record.role, record.user_id)
            .await?;
        Ok(OverrideView {
            user_id: record.user_id,
            role: record.role,
            display_name: record.display_name.clone(),
            granted: overrides.granted(),
            revoked: overrides.revoked(),
            effective,
        })
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    pub async fn list_roles(&self, actor: Option<&Principal>) -> Result<Vec<RoleInfo>, AdminError> {
        self.require(actor, Permission::ManageBusinessSettings)
            .await?;
        Ok(Role::ALL
            .into_iter()
            .map(|role| RoleInfo {
                role,
                editable: role.is_editable(),
            })
            .collect())
    }

    pub async fn list_permissions(
        &self,
        actor: Option<&Principal>,
    ) -> Result<Vec<PermissionInfo>, AdminError> {
        self.require(actor, Permission::ManageBusinessSettings)
            .await?;
        Ok(Permission::ALL
            .into_iter()
            .map(|permission| PermissionInfo {
                permission,
                category: permission.category(),
            })
            .collect())
    }

    // ── Role policies ────────────────────────────────────────────────────

    pub async fn view_role_policy(
        &self,
        actor: Option<&Principal>,
        role: Role,
    ) -> Result<BTreeSet<Permission>, AdminError> {
        self.require(actor, Permission::ManageBusinessSettings)
            .await?;
        Ok(self.policies.role_permissions(role).await?)
    }

    /// Replace a role's permission set. Whole-set semantics, immediate
    /// effect for every user of the role.
    pub async fn update_role_policy(
        &self,
        actor: Option<&Principal>,
        role: Role,
        permissions: BTreeSet<Permission>,
    ) -> Result<(), AdminError> {
        self.require(actor, Permission::ManageBusinessSettings)
            .await?;
        self.policies
            .set_role_permissions(role, permissions.clone())
            .await?;
        self.resolver.invalidate_role(role);
        tracing::info!(role = %role, count = permissions.len(), "role policy replaced");
        Ok(())
    }

    // ── User overrides ───────────────────────────────────────────────────

    pub async fn view_user_overrides(
        &self,
        actor: Option<&Principal>,
        user_id: UserId,
    ) -> Result<OverrideView, AdminError> {
        self.require(actor, Permission::ManageUserPermissions)
            .await?;
        let record = self.lookup_required(user_id).await?;
        self.override_view(&record).await
    }

    /// Replace a user's overrides from the two-set wire form.
    ///
    /// Rejects overlap before anything is persisted; on rejection the
    /// stored record is untouched.
    pub async fn update_user_overrides(
        &self,
        actor: Option<&Principal>,
        user_id: UserId,
        granted: BTreeSet<Permission>,
        revoked: BTreeSet<Permission>,
    ) -> Result<OverrideView, AdminError> {
        self.require(actor, Permission::ManageUserPermissions)
            .await?;
        let record = self.lookup_required(user_id).await?;
        let overrides = UserOverrides::from_sets(granted, revoked)?;
        self.overrides.replace(user_id, overrides).await?;
        self.resolver.invalidate_user(user_id);
        tracing::info!(user = %user_id, "user overrides replaced");
        self.override_view(&record).await
    }

    pub async fn grant_override(
        &self,
        actor: Option<&Principal>,
        user_id: UserId,
        permission: Permission,
    ) -> Result<OverrideView, AdminError> {
        self.require(actor, Permission::ManageUserPermissions)
            .await?;
        let record = self.lookup_required(user_id).await?;
        self.overrides.grant(user_id, permission).await?;
        self.resolver.invalidate_user(user_id);
        tracing::info!(user = %user_id, permission = %permission, "override granted");
        self.override_view(&record).await
    }

    pub async fn revoke_override(
        &self,
        actor: Option<&Principal>,
        user_id: UserId,
        permission: Permission,
    ) -> Result<OverrideView, AdminError> {
        self.require(actor, Permission::ManageUserPermissions)
            .await?;
        let record = self.lookup_required(user_id).await?;
        self.overrides.revoke(user_id, permission).await?;
        self.resolver.invalidate_user(user_id);
        tracing::info!(user = %user_id, permission = %permission, "override revoked");
        self.override_view(&record).await
    }

    pub async fn clear_override(
        &self,
        actor: Option<&Principal>,
        user_id: UserId,
        permission: Permission,
    ) -> Result<OverrideView, AdminError> {
        self.require(actor, Permission::ManageUserPermissions)
            .await?;
        let record = self.lookup_required(user_id).await?;
        self.overrides.clear(user_id, permission).await?;
        self.resolver.invalidate_user(user_id);
        tracing::info!(user = %user_id, permission = %permission, "override cleared");
        self.override_view(&record).await
    }

    /// Drop a user's whole override record.
    pub async fn clear_user_overrides(
        &self,
        actor: Option<&Principal>,
        user_id: UserId,
    ) -> Result<OverrideView, AdminError> {
        self.require(actor, Permission::ManageUserPermissions)
            .await?;
        let record = self.lookup_required(user_id).await?;
        self.overrides.remove_user(user_id).await?;
        self.resolver.invalidate_user(user_id);
        tracing::info!(user = %user_id, "user overrides cleared");
        self.override_view(&record).await
    }

    // ── Staff directory ──────────────────────────────────────────────────

    pub async fn list_users(
        &self,
        actor: Option<&Principal>,
    ) -> Result<Vec<UserRecord>, AdminError> {
        self.require(actor, Permission::ManageStaff).await?;
        Ok(self.directory.list().await?)
    }

    /// Create or update a staff record. A role change invalidates the
    /// user's cached resolution.
    pub async fn register_user(
        &self,
        actor: Option<&Principal>,
        record: UserRecord,
    ) -> Result<UserRecord, AdminError> {
        self.require(actor, Permission::ManageStaff).await?;
        self.directory.upsert(record.clone()).await?;
        self.resolver.invalidate_user(record.user_id);
        tracing::info!(user = %record.user_id, role = %record.role, "staff record upserted");
        Ok(record)
    }

    /// Delete a user and cascade: the override record goes with them, so a
    /// later user under a recycled id starts clean.
    pub async fn delete_user(
        &self,
        actor: Option<&Principal>,
        user_id: UserId,
    ) -> Result<(), AdminError> {
        self.require(actor, Permission::ManageStaff).await?;
        if !self.directory.remove(user_id).await? {
            return Err(AdminError::NotFound(format!("user {user_id}")));
        }
        self.overrides.remove_user(user_id).await?;
        self.resolver.invalidate_user(user_id);
        tracing::info!(user = %user_id, "user deleted, overrides cascaded");
        Ok(())
    }
}
