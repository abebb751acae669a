use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tillgate_access::catalog::Permission;
use tillgate_access::overrides::{OverrideError, UserOverrideStore, UserOverrides};
use tillgate_core::UserId;

/// In-memory user override store.
///
/// Intended for tests/dev. Each mutator runs inside one write-lock critical
/// section, which is what makes the single-permission operations atomic:
/// readers see the record before or after, never mid-move.
#[derive(Debug, Default)]
pub struct InMemoryUserOverrideStore {
    records: RwLock<HashMap<UserId, UserOverrides>>,
}

impl InMemoryUserOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }
}

type Guard<'a> = std::sync::RwLockWriteGuard<'a, HashMap<UserId, UserOverrides>>;

impl InMemoryUserOverrideStore {
    fn write(&self) -> Result<Guard<'_>, OverrideError> {
        self.records
            .write()
            .map_err(|_| OverrideError::Unavailable("lock poisoned".to_string()))
    }

    // Empty records are dropped so that "no record" and "empty record" stay
    // one state.
    fn mutate(
        &self,
        user_id: UserId,
        apply: impl FnOnce(&mut UserOverrides),
    ) -> Result<(), OverrideError> {
        let mut records = self.write()?;
        let record = records.entry(user_id).or_default();
        apply(record);
        if record.is_empty() {
            records.remove(&user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserOverrideStore for InMemoryUserOverrideStore {
    async fn load(&self, user_id: UserId) -> Result<Option<UserOverrides>, OverrideError> {
        let records = self
            .records
            .read()
            .map_err(|_| OverrideError::Unavailable("lock poisoned".to_string()))?;
        Ok(records.get(&user_id).cloned())
    }

    async fn replace(
        &self,
        user_id: UserId,
        overrides: UserOverrides,
    ) -> Result<(), OverrideError> {
        let mut records = self.write()?;
        if overrides.is_empty() {
            records.remove(&user_id);
        } else {
            records.insert(user_id, overrides);
        }
        Ok(())
    }

    async fn grant(&self, user_id: UserId, permission: Permission) -> Result<(), OverrideError> {
        self.mutate(user_id, |record| record.grant(permission))
    }

    async fn revoke(
        &self,
        user_id: UserId,
        permission: Permission,
    ) -> Result<(), OverrideError> {
        self.mutate(user_id, |record| record.revoke(permission))
    }

    async fn clear(&self, user_id: UserId, permission: Permission) -> Result<(), OverrideError> {
        self.mutate(user_id, |record| record.clear(permission))
    }

    async fn remove_user(&self, user_id: UserId) -> Result<(), OverrideError> {
        self.write()?.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillgate_access::overrides::Override;

    #[tokio::test]
    async fn unknown_users_have_no_record() {
        let store = InMemoryUserOverrideStore::new();
        assert!(store.load(UserId::new()).await.unwrap().is_none());
        // Provided trait method normalizes to the empty record.
        assert!(store.overrides(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn grant_then_revoke_moves_sides_atomically() {
        let store = InMemoryUserOverrideStore::new();
        let user = UserId::new();

        store.grant(user, Permission::VoidSales).await.unwrap();
        store.revoke(user, Permission::VoidSales).await.unwrap();

        let record = store.overrides(user).await.unwrap();
        assert_eq!(record.state(Permission::VoidSales), Some(Override::Revoke));
        assert!(record.granted().is_empty());
    }

    #[tokio::test]
    async fn clearing_the_last_entry_drops_the_record() {
        let store = InMemoryUserOverrideStore::new();
        let user = UserId::new();

        store.grant(user, Permission::ViewReports).await.unwrap();
        store.clear(user, Permission::ViewReports).await.unwrap();

        assert!(store.load(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_with_empty_is_removal() {
        let store = InMemoryUserOverrideStore::new();
        let user = UserId::new();

        store.grant(user, Permission::ViewReports).await.unwrap();
        store.replace(user, UserOverrides::new()).await.unwrap();

        assert!(store.load(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_user_forgets_everything() {
        let store = InMemoryUserOverrideStore::new();
        let user = UserId::new();

        store.grant(user, Permission::VoidSales).await.unwrap();
        store.revoke(user, Permission::ViewSales).await.unwrap();
        store.remove_user(user).await.unwrap();

        assert!(store.load(user).await.unwrap().is_none());
    }
}
