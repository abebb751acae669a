//! Permission resolution.
//!
//! [`effective_set`] is the whole algorithm: `(base ∪ granted) − revoked`.
//! [`Resolver`] wraps it with store access, the superuser short-circuit and
//! a per-(role, user) cache that administration writes invalidate
//! synchronously.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use thiserror::Error;

use tillgate_core::UserId;

use crate::catalog::{Permission, Role};
use crate::overrides::{Override, OverrideError, UserOverrideStore, UserOverrides};
use crate::policy::{PolicyError, RolePolicyStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("role policy load failed: {0}")]
    Policy(#[from] PolicyError),

    #[error("override load failed: {0}")]
    Overrides(#[from] OverrideError),
}

/// Compute the permissions a user effectively holds.
///
/// Revokes win over everything: a permission that is both in the base set
/// and granted still disappears when revoked. Grants only add membership;
/// they never remove it.
pub fn effective_set(
    base: &BTreeSet<Permission>,
    overrides: &UserOverrides,
) -> BTreeSet<Permission> {
    let mut effective = base.clone();
    for (permission, verdict) in overrides.iter() {
        match verdict {
            Override::Grant => {
                effective.insert(permission);
            }
            Override::Revoke => {
                effective.remove(&permission);
            }
        }
    }
    effective
}

type CacheKey = (Role, UserId);

/// Store-backed resolver with a synchronously-invalidated cache.
///
/// Cache fills race administration writes; the epoch counter closes that
/// window. A fill snapshots the epoch before touching the stores and is
/// discarded if any invalidation bumped it meanwhile. A discarded fill just
/// recomputes; a stale entry would keep authorizing against dead policy.
pub struct Resolver {
    policies: Arc<dyn RolePolicyStore>,
    overrides: Arc<dyn UserOverrideStore>,
    cache: RwLock<HashMap<CacheKey, BTreeSet<Permission>>>,
    epoch: AtomicU64,
}

impl Resolver {
    pub fn new(policies: Arc<dyn RolePolicyStore>, overrides: Arc<dyn UserOverrideStore>) -> Self {
        Self {
            policies,
            overrides,
            cache: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Everything the user effectively holds.
    ///
    /// Superuser roles return the full universe without consulting stores
    /// or cache; overrides do not apply to them.
    pub async fn resolve_all(
        &self,
        role: Role,
        user_id: UserId,
    ) -> Result<BTreeSet<Permission>, ResolveError> {
        if !role.is_editable() {
            return Ok(Permission::universe());
        }

        if let Some(hit) = self.cached(role, user_id) {
            return Ok(hit);
        }

        let epoch = self.epoch.load(Ordering::Acquire);
        let base = self.policies.role_permissions(role).await?;
        let overrides = self.overrides.overrides(user_id).await?;
        let effective = effective_set(&base, &overrides);

        let mut cache = self.write_cache();
        if self.epoch.load(Ordering::Acquire) == epoch {
            cache.insert((role, user_id), effective.clone());
        }
        drop(cache);

        tracing::debug!(role = %role, user = %user_id, count = effective.len(), "resolved permissions");
        Ok(effective)
    }

    /// Membership test against [`Self::resolve_all`].
    pub async fn resolve(
        &self,
        role: Role,
        user_id: UserId,
        permission: Permission,
    ) -> Result<bool, ResolveError> {
        Ok(self.resolve_all(role, user_id).await?.contains(&permission))
    }

    /// Drop cached entries for one user. Bumps the epoch first so an
    /// in-flight fill for that user cannot land afterwards.
    pub fn invalidate_user(&self, user_id: UserId) {
        self.epoch.fetch_add(1, Ordering::Release);
        self.write_cache().retain(|(_, cached), _| *cached != user_id);
        tracing::debug!(user = %user_id, "permission cache invalidated for user");
    }

    /// Drop cached entries for every user of one role.
    pub fn invalidate_role(&self, role: Role) {
        self.epoch.fetch_add(1, Ordering::Release);
        self.write_cache().retain(|(cached, _), _| *cached != role);
        tracing::debug!(role = %role, "permission cache invalidated for role");
    }

    fn cached(&self, role: Role, user_id: UserId) -> Option<BTreeSet<Permission>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(role, user_id))
            .cloned()
    }

    // The cache holds no multi-step invariants, so a poisoned lock is
    // recoverable: take the guard and keep going.
    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, BTreeSet<Permission>>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
