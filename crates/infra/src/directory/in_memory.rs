use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tillgate_access::admin::{DirectoryError, UserDirectory, UserRecord};
use tillgate_core::UserId;

/// In-memory staff directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    records: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup(&self, user_id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        Ok(records.get(&user_id).cloned())
    }

    async fn upsert(&self, record: UserRecord) -> Result<(), DirectoryError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        records.insert(record.user_id, record);
        Ok(())
    }

    async fn remove(&self, user_id: UserId) -> Result<bool, DirectoryError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        Ok(records.remove(&user_id).is_some())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let records = self
            .records
            .read()
            .map_err(|_| DirectoryError::Unavailable("lock poisoned".to_string()))?;
        let mut users: Vec<UserRecord> = records.values().cloned().collect();
        users.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(users)
    }
}
