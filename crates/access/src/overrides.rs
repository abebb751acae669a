//! Per-user permission overrides.
//!
//! Each (user, permission) pair carries at most one verdict: granted on top
//! of the role, or revoked from it. Absence means the role decides. Holding
//! a single tagged value per permission makes a grant/revoke conflict
//! unrepresentable; the two-set wire form is derived and only validated when
//! it arrives from outside ([`UserOverrides::from_sets`]).

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tillgate_core::UserId;

use crate::catalog::Permission;

pub(crate) fn wire_list(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OverrideError {
    /// A bulk edit listed the same permission as granted and revoked.
    #[error("permission(s) both granted and revoked: {}", wire_list(.0))]
    Conflicting(Vec<Permission>),

    #[error("override store unavailable: {0}")]
    Unavailable(String),
}

/// Verdict attached to a single permission for a single user.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Override {
    /// Permission held even though the role's base set lacks it.
    Grant,
    /// Permission withheld even though the role's base set has it.
    Revoke,
}

/// A user's full override record.
///
/// Empty is the common case; users only get a record once an administrator
/// tailors them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverrides {
    entries: BTreeMap<Permission, Override>,
}

impl UserOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the two-set wire form, rejecting overlap.
    ///
    /// On rejection nothing is constructed; callers keep their previous
    /// state untouched.
    pub fn from_sets(
        granted: BTreeSet<Permission>,
        revoked: BTreeSet<Permission>,
    ) -> Result<Self, OverrideError> {
        let conflicts: Vec<Permission> = granted.intersection(&revoked).copied().collect();
        if !conflicts.is_empty() {
            return Err(OverrideError::Conflicting(conflicts));
        }
        let mut entries = BTreeMap::new();
        for permission in granted {
            entries.insert(permission, Override::Grant);
        }
        for permission in revoked {
            entries.insert(permission, Override::Revoke);
        }
        Ok(Self { entries })
    }

    /// The verdict for one permission; `None` means inherit from the role.
    pub fn state(&self, permission: Permission) -> Option<Override> {
        self.entries.get(&permission).copied()
    }

    /// Grant on top of the role. Replaces a standing revoke. Idempotent.
    pub fn grant(&mut self, permission: Permission) {
        self.entries.insert(permission, Override::Grant);
    }

    /// Revoke from the role. Replaces a standing grant. Idempotent.
    pub fn revoke(&mut self, permission: Permission) {
        self.entries.insert(permission, Override::Revoke);
    }

    /// Back to inheriting from the role. Idempotent.
    pub fn clear(&mut self, permission: Permission) {
        self.entries.remove(&permission);
    }

    /// Permissions granted on top of the role, in catalog order.
    pub fn granted(&self) -> BTreeSet<Permission> {
        self.side(Override::Grant)
    }

    /// Permissions revoked from the role, in catalog order.
    pub fn revoked(&self) -> BTreeSet<Permission> {
        self.side(Override::Revoke)
    }

    fn side(&self, verdict: Override) -> BTreeSet<Permission> {
        self.entries
            .iter()
            .filter(|(_, v)| **v == verdict)
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Permission, Override)> + '_ {
        self.entries.iter().map(|(p, v)| (*p, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Persistence boundary for user overrides.
///
/// The single-permission mutators must be atomic per backend: a concurrent
/// reader sees the record before or after the edit, never a state where a
/// permission sits on both sides.
#[async_trait]
pub trait UserOverrideStore: Send + Sync {
    /// Load a user's record, if one exists.
    async fn load(&self, user_id: UserId) -> Result<Option<UserOverrides>, OverrideError>;

    /// Replace a user's whole record. The record is disjoint by construction.
    async fn replace(
        &self,
        user_id: UserId,
        overrides: UserOverrides,
    ) -> Result<(), OverrideError>;

    /// Set one permission to granted.
    async fn grant(&self, user_id: UserId, permission: Permission) -> Result<(), OverrideError>;

    /// Set one permission to revoked.
    async fn revoke(&self, user_id: UserId, permission: Permission)
    -> Result<(), OverrideError>;

    /// Return one permission to inherited.
    async fn clear(&self, user_id: UserId, permission: Permission) -> Result<(), OverrideError>;

    /// Drop the user's record entirely (user deletion cascade).
    async fn remove_user(&self, user_id: UserId) -> Result<(), OverrideError>;

    /// A user's record with absence normalized to the empty record.
    async fn overrides(&self, user_id: UserId) -> Result<UserOverrides, OverrideError> {
        Ok(self.load(user_id).await?.unwrap_or_default())
    }
}
