//! Role policy store: the editable Role → permission-set relation.
//!
//! The store holds entries for **editable roles only**. Superuser roles
//! resolve to the full universe and are rejected on write; an editable role
//! with no entry resolves to the empty set (fail safe, not open). Both rules
//! live in the provided trait methods so every backend enforces them
//! identically.

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{Permission, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Write attempted against a superuser role.
    #[error("role {0} is not editable")]
    RoleNotEditable(Role),

    #[error("role policy store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for role policies.
///
/// Implementations provide raw `load`/`store` for editable roles; the
/// resolution-facing contract is the provided [`role_permissions`] and
/// [`set_role_permissions`] methods.
///
/// [`role_permissions`]: RolePolicyStore::role_permissions
/// [`set_role_permissions`]: RolePolicyStore::set_role_permissions
#[async_trait]
pub trait RolePolicyStore: Send + Sync {
    /// Load the stored set for an editable role, if any.
    async fn load(&self, role: Role) -> Result<Option<BTreeSet<Permission>>, PolicyError>;

    /// Replace the stored set for an editable role. Whole-set semantics;
    /// backends must never merge.
    async fn store(
        &self,
        role: Role,
        permissions: BTreeSet<Permission>,
    ) -> Result<(), PolicyError>;

    /// Base permission set for a role as resolution sees it.
    async fn role_permissions(&self, role: Role) -> Result<BTreeSet<Permission>, PolicyError> {
        if !role.is_editable() {
            return Ok(Permission::universe());
        }
        Ok(self.load(role).await?.unwrap_or_default())
    }

    /// Replace a role's permission set, rejecting superuser roles.
    async fn set_role_permissions(
        &self,
        role: Role,
        permissions: BTreeSet<Permission>,
    ) -> Result<(), PolicyError> {
        if !role.is_editable() {
            return Err(PolicyError::RoleNotEditable(role));
        }
        self.store(role, permissions).await
    }
}

/// Permission set a role ships with before any administration edit.
///
/// Owner-level capabilities (user-permission administration, business
/// settings) stay opt-in for managers; they can be granted per role or per
/// user later.
pub fn default_permissions(role: Role) -> BTreeSet<Permission> {
    use Permission::*;

    match role {
        Role::SuperAdmin | Role::BusinessOwner => Permission::universe(),
        Role::BusinessManager => {
            let mut set = Permission::universe();
            set.remove(&ManageUserPermissions);
            set.remove(&ManageBusinessSettings);
            set
        }
        Role::ShopManager => [
            ViewProducts,
            ViewStock,
            ManageStock,
            TransferStock,
            ViewSuppliers,
            ViewSales,
            CreateSales,
            ViewExpenses,
            ManageExpenses,
            ViewPaymentMethods,
            ViewReports,
            ViewStaff,
        ]
        .into_iter()
        .collect(),
        Role::SalesRep => [
            ViewProducts,
            ViewStock,
            ViewSales,
            CreateSales,
            ViewPaymentMethods,
        ]
        .into_iter()
        .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::RwLock;

    use super::*;

    /// Minimal backend: raw load/store only, contract comes from the trait.
    #[derive(Default)]
    struct MapStore {
        inner: RwLock<HashMap<Role, BTreeSet<Permission>>>,
    }

    #[async_trait]
    impl RolePolicyStore for MapStore {
        async fn load(&self, role: Role) -> Result<Option<BTreeSet<Permission>>, PolicyError> {
            Ok(self.inner.read().unwrap().get(&role).cloned())
        }

        async fn store(
            &self,
            role: Role,
            permissions: BTreeSet<Permission>,
        ) -> Result<(), PolicyError> {
            self.inner.write().unwrap().insert(role, permissions);
            Ok(())
        }
    }

    #[tokio::test]
    async fn superuser_roles_resolve_to_the_full_universe() {
        let store = MapStore::default();
        let owner = store.role_permissions(Role::BusinessOwner).await.unwrap();
        assert_eq!(owner, Permission::universe());
        let admin = store.role_permissions(Role::SuperAdmin).await.unwrap();
        assert_eq!(admin, Permission::universe());
    }

    #[tokio::test]
    async fn missing_editable_role_resolves_to_the_empty_set() {
        let store = MapStore::default();
        let set = store.role_permissions(Role::SalesRep).await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn superuser_roles_reject_writes() {
        let store = MapStore::default();
        let err = store
            .set_role_permissions(Role::BusinessOwner, Permission::universe())
            .await
            .unwrap_err();
        assert_eq!(err, PolicyError::RoleNotEditable(Role::BusinessOwner));
        assert!(store.inner.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn updates_replace_the_whole_set() {
        let store = MapStore::default();
        store
            .set_role_permissions(
                Role::SalesRep,
                [Permission::ViewSales, Permission::CreateSales]
                    .into_iter()
                    .collect(),
            )
            .await
            .unwrap();
        store
            .set_role_permissions(
                Role::SalesRep,
                [Permission::ViewReports].into_iter().collect(),
            )
            .await
            .unwrap();

        let set = store.role_permissions(Role::SalesRep).await.unwrap();
        assert_eq!(set, [Permission::ViewReports].into_iter().collect());
    }

    #[test]
    fn default_sets_match_the_shipped_policy() {
        let manager = default_permissions(Role::BusinessManager);
        assert!(!manager.contains(&Permission::ManageUserPermissions));
        assert!(!manager.contains(&Permission::ManageBusinessSettings));
        assert_eq!(manager.len(), Permission::ALL.len() - 2);

        let shop = default_permissions(Role::ShopManager);
        assert!(shop.contains(&Permission::ManageStock));
        assert!(!shop.contains(&Permission::VoidSales));
        assert!(!shop.contains(&Permission::ManageStaff));

        let rep = default_permissions(Role::SalesRep);
        assert!(rep.contains(&Permission::CreateSales));
        assert!(!rep.contains(&Permission::ManageStock));
        assert_eq!(rep.len(), 5);

        assert_eq!(
            default_permissions(Role::BusinessOwner),
            Permission::universe()
        );
    }
}
