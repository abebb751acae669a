use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use tillgate_access::catalog::{Permission, Role};
use tillgate_access::policy::{PolicyError, RolePolicyStore, default_permissions};

/// In-memory role policy store.
///
/// Intended for tests/dev. A single write lock serializes whole-set
/// replacements, so readers never observe a partially applied set.
#[derive(Debug, Default)]
pub struct InMemoryRolePolicyStore {
    policies: RwLock<HashMap<Role, BTreeSet<Permission>>>,
}

impl InMemoryRolePolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the shipped defaults for every editable role.
    pub fn with_defaults() -> Self {
        let mut policies = HashMap::new();
        for role in Role::ALL {
            if role.is_editable() {
                policies.insert(role, default_permissions(role));
            }
        }
        Self {
            policies: RwLock::new(policies),
        }
    }
}

#[async_trait]
impl RolePolicyStore for InMemoryRolePolicyStore {
    async fn load(&self, role: Role) -> Result<Option<BTreeSet<Permission>>, PolicyError> {
        let policies = self
            .policies
            .read()
            .map_err(|_| PolicyError::Unavailable("lock poisoned".to_string()))?;
        Ok(policies.get(&role).cloned())
    }

    async fn store(
        &self,
        role: Role,
        permissions: BTreeSet<Permission>,
    ) -> Result<(), PolicyError> {
        let mut policies = self
            .policies
            .write()
            .map_err(|_| PolicyError::Unavailable("lock poisoned".to_string()))?;
        policies.insert(role, permissions);
        Ok(())
    }
}
