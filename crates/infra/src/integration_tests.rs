//! Integration tests for the assembled access stack.
//!
//! Wires the real in-memory adapters into the resolver, guard, and admin
//! API, then drives administration edits and access checks end to end.
//!
//! Verifies:
//! - Seeded role defaults drive guard decisions
//! - Override edits flip decisions on the next check, without re-login
//! - Role policy edits reach every user of the role at once
//! - Standing overrides keep applying on top of a replaced role policy
//! - Superuser principals ignore stored overrides and store outages
//! - A policy store outage denies regular principals (fail closed)

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use async_trait::async_trait;

    use tillgate_access::admin::{AdminApi, UserDirectory, UserRecord};
    use tillgate_access::catalog::{Permission, Role};
    use tillgate_access::guard::{AccessGuard, Decision, DenyReason};
    use tillgate_access::overrides::UserOverrideStore;
    use tillgate_access::policy::{PolicyError, RolePolicyStore};
    use tillgate_access::principal::Principal;
    use tillgate_access::resolver::Resolver;
    use tillgate_core::{BusinessId, UserId};

    use crate::directory::InMemoryUserDirectory;
    use crate::override_store::InMemoryUserOverrideStore;
    use crate::policy_store::InMemoryRolePolicyStore;

    struct Stack {
        admin: AdminApi,
        guard: AccessGuard,
        overrides: Arc<InMemoryUserOverrideStore>,
        business_id: BusinessId,
        owner: Principal,
    }

    impl Stack {
        fn principal(&self, role: Role) -> Principal {
            Principal {
                user_id: UserId::new(),
                role,
                business_id: self.business_id,
            }
        }

        /// Register a staff member and hand back their principal.
        async fn register(&self, name: &str, role: Role) -> Principal {
            let principal = self.principal(role);
            self.admin
                .register_user(
                    Some(&self.owner),
                    UserRecord {
                        user_id: principal.user_id,
                        role,
                        display_name: name.to_string(),
                    },
                )
                .await
                .unwrap();
            principal
        }
    }

    fn setup() -> Stack {
        let policies: Arc<dyn RolePolicyStore> =
            Arc::new(InMemoryRolePolicyStore::with_defaults());
        let overrides = Arc::new(InMemoryUserOverrideStore::new());
        let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new());
        let resolver = Arc::new(Resolver::new(policies.clone(), overrides.clone()));
        let guard = AccessGuard::new(resolver.clone());
        let admin = AdminApi::new(policies, overrides.clone(), directory, resolver);

        let business_id = BusinessId::new();
        let owner = Principal {
            user_id: UserId::new(),
            role: Role::BusinessOwner,
            business_id,
        };
        Stack {
            admin,
            guard,
            overrides,
            business_id,
            owner,
        }
    }

    #[tokio::test]
    async fn seeded_defaults_drive_guard_decisions() {
        let stack = setup();
        let shop_manager = stack.register("Morgan", Role::ShopManager).await;
        let rep = stack.register("Dana", Role::SalesRep).await;

        assert!(stack
            .guard
            .authorize(Some(&shop_manager), Permission::ManageStock)
            .await
            .is_allow());
        assert_eq!(
            stack
                .guard
                .authorize(Some(&shop_manager), Permission::VoidSales)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::VoidSales))
        );

        assert!(stack
            .guard
            .authorize(Some(&rep), Permission::CreateSales)
            .await
            .is_allow());
        assert_eq!(
            stack
                .guard
                .authorize(Some(&rep), Permission::ManageStock)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::ManageStock))
        );
    }

    #[tokio::test]
    async fn revoking_a_base_permission_locks_the_user_out() {
        let stack = setup();
        let shop_manager = stack.register("Morgan", Role::ShopManager).await;

        assert!(stack
            .guard
            .authorize(Some(&shop_manager), Permission::ManageStock)
            .await
            .is_allow());

        stack
            .admin
            .revoke_override(
                Some(&stack.owner),
                shop_manager.user_id,
                Permission::ManageStock,
            )
            .await
            .unwrap();
        assert_eq!(
            stack
                .guard
                .authorize(Some(&shop_manager), Permission::ManageStock)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::ManageStock))
        );

        stack
            .admin
            .clear_override(
                Some(&stack.owner),
                shop_manager.user_id,
                Permission::ManageStock,
            )
            .await
            .unwrap();
        assert!(stack
            .guard
            .authorize(Some(&shop_manager), Permission::ManageStock)
            .await
            .is_allow());
    }

    #[tokio::test]
    async fn granting_beyond_the_role_unlocks_only_that_user() {
        let stack = setup();
        let dana = stack.register("Dana", Role::SalesRep).await;
        let robin = stack.register("Robin", Role::SalesRep).await;

        stack
            .admin
            .grant_override(Some(&stack.owner), dana.user_id, Permission::VoidSales)
            .await
            .unwrap();

        assert!(stack
            .guard
            .authorize(Some(&dana), Permission::VoidSales)
            .await
            .is_allow());
        assert_eq!(
            stack
                .guard
                .authorize(Some(&robin), Permission::VoidSales)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::VoidSales))
        );
    }

    #[tokio::test]
    async fn role_edits_reach_every_user_of_the_role() {
        let stack = setup();
        let dana = stack.register("Dana", Role::SalesRep).await;
        let robin = stack.register("Robin", Role::SalesRep).await;

        // Warm both cache entries first.
        assert!(stack
            .guard
            .authorize(Some(&dana), Permission::CreateSales)
            .await
            .is_allow());
        assert!(stack
            .guard
            .authorize(Some(&robin), Permission::CreateSales)
            .await
            .is_allow());

        let read_only: BTreeSet<Permission> = [Permission::ViewSales].into_iter().collect();
        stack
            .admin
            .update_role_policy(Some(&stack.owner), Role::SalesRep, read_only)
            .await
            .unwrap();

        for rep in [&dana, &robin] {
            assert_eq!(
                stack
                    .guard
                    .authorize(Some(rep), Permission::CreateSales)
                    .await,
                Decision::Deny(DenyReason::MissingPermission(Permission::CreateSales))
            );
            assert!(stack
                .guard
                .authorize(Some(rep), Permission::ViewSales)
                .await
                .is_allow());
        }
    }

    #[tokio::test]
    async fn standing_overrides_survive_role_policy_edits() {
        let stack = setup();
        let morgan = stack.register("Morgan", Role::ShopManager).await;
        let robin = stack.register("Robin", Role::ShopManager).await;

        // Morgan carries one grant beyond the base and one revoke within it.
        stack
            .admin
            .grant_override(Some(&stack.owner), morgan.user_id, Permission::ManageShops)
            .await
            .unwrap();
        stack
            .admin
            .revoke_override(Some(&stack.owner), morgan.user_id, Permission::ViewStock)
            .await
            .unwrap();

        // Warm both cache entries before the role edit.
        assert!(stack
            .guard
            .authorize(Some(&morgan), Permission::ManageShops)
            .await
            .is_allow());
        assert!(stack
            .guard
            .authorize(Some(&robin), Permission::ViewStock)
            .await
            .is_allow());

        let new_base: BTreeSet<Permission> =
            [Permission::ViewStock, Permission::ViewSales, Permission::ViewReports]
                .into_iter()
                .collect();
        stack
            .admin
            .update_role_policy(Some(&stack.owner), Role::ShopManager, new_base)
            .await
            .unwrap();

        // Morgan's overrides ride on top of the replaced base.
        assert!(stack
            .guard
            .authorize(Some(&morgan), Permission::ManageShops)
            .await
            .is_allow());
        assert_eq!(
            stack
                .guard
                .authorize(Some(&morgan), Permission::ViewStock)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::ViewStock))
        );
        assert!(stack
            .guard
            .authorize(Some(&morgan), Permission::ViewReports)
            .await
            .is_allow());
        assert_eq!(
            stack
                .guard
                .authorize(Some(&morgan), Permission::ManageStock)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::ManageStock))
        );

        // Robin has no overrides and tracks the new base exactly.
        assert!(stack
            .guard
            .authorize(Some(&robin), Permission::ViewStock)
            .await
            .is_allow());
        assert!(stack
            .guard
            .authorize(Some(&robin), Permission::ViewSales)
            .await
            .is_allow());
        assert_eq!(
            stack
                .guard
                .authorize(Some(&robin), Permission::ManageShops)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::ManageShops))
        );
        assert_eq!(
            stack
                .guard
                .authorize(Some(&robin), Permission::ManageStock)
                .await,
            Decision::Deny(DenyReason::MissingPermission(Permission::ManageStock))
        );
    }

    #[tokio::test]
    async fn superusers_ignore_stored_overrides() {
        let stack = setup();

        // Even a revoke record written behind the admin API's back.
        stack
            .overrides
            .revoke(stack.owner.user_id, Permission::ManageBusinessSettings)
            .await
            .unwrap();

        assert!(stack
            .guard
            .authorize(Some(&stack.owner), Permission::ManageBusinessSettings)
            .await
            .is_allow());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Outage behavior
    // ─────────────────────────────────────────────────────────────────────

    struct UnreachablePolicies;

    #[async_trait]
    impl RolePolicyStore for UnreachablePolicies {
        async fn load(&self, _role: Role) -> Result<Option<BTreeSet<Permission>>, PolicyError> {
            Err(PolicyError::Unavailable("connection refused".into()))
        }

        async fn store(
            &self,
            _role: Role,
            _permissions: BTreeSet<Permission>,
        ) -> Result<(), PolicyError> {
            Err(PolicyError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn policy_outage_fails_closed_for_regular_principals_only() {
        let overrides = Arc::new(InMemoryUserOverrideStore::new());
        let resolver = Arc::new(Resolver::new(Arc::new(UnreachablePolicies), overrides));
        let guard = AccessGuard::new(resolver);

        let business_id = BusinessId::new();
        let rep = Principal {
            user_id: UserId::new(),
            role: Role::SalesRep,
            business_id,
        };
        let owner = Principal {
            user_id: UserId::new(),
            role: Role::BusinessOwner,
            business_id,
        };

        assert_eq!(
            guard.authorize(Some(&rep), Permission::ViewSales).await,
            Decision::Deny(DenyReason::PolicyUnavailable)
        );
        assert!(guard
            .authorize(Some(&owner), Permission::ViewSales)
            .await
            .is_allow());

        // Anonymous callers are turned away before the store is consulted.
        assert_eq!(
            guard.authorize(None, Permission::ViewSales).await,
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }
}
