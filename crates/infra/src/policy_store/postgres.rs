//! Postgres-backed role policy store.
//!
//! One row per editable role, the permission set as a `TEXT[]` of wire
//! identifiers. Writes are single-statement upserts, so a concurrent reader
//! sees the old set or the new set, never a mix. Identifiers from a build
//! this binary does not know (rows written by a newer release) are skipped
//! on read with a warning rather than failing resolution.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use tillgate_access::catalog::{Permission, Role};
use tillgate_access::policy::{PolicyError, RolePolicyStore, default_permissions};

/// Postgres-backed role policy store.
///
/// Uses the SQLx connection pool, which is thread-safe and shareable.
#[derive(Debug, Clone)]
pub struct PostgresRolePolicyStore {
    pool: Arc<PgPool>,
}

impl PostgresRolePolicyStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), PolicyError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS role_policies (
                role        TEXT PRIMARY KEY,
                permissions TEXT[] NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error("ensure_schema", e))?;
        Ok(())
    }

    /// Insert the shipped defaults for every editable role that has no row
    /// yet. Idempotent; existing policies are never touched.
    #[instrument(skip(self), err)]
    pub async fn seed_defaults(&self) -> Result<(), PolicyError> {
        for role in Role::ALL {
            if !role.is_editable() {
                continue;
            }
            let wire: Vec<String> = default_permissions(role)
                .into_iter()
                .map(|p| p.as_str().to_string())
                .collect();
            let result = sqlx::query(
                r#"
                INSERT INTO role_policies (role, permissions)
                VALUES ($1, $2)
                ON CONFLICT (role) DO NOTHING
                "#,
            )
            .bind(role.as_str())
            .bind(&wire)
            .execute(&*self.pool)
            .await
            .map_err(|e| store_error("seed_defaults", e))?;

            if result.rows_affected() > 0 {
                tracing::info!(role = %role, "seeded default role policy");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RolePolicyStore for PostgresRolePolicyStore {
    #[instrument(skip(self), fields(role = %role), err)]
    async fn load(&self, role: Role) -> Result<Option<BTreeSet<Permission>>, PolicyError> {
        let row = sqlx::query("SELECT permissions FROM role_policies WHERE role = $1")
            .bind(role.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| store_error("load_role_policy", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: Vec<String> = row
            .try_get("permissions")
            .map_err(|e| store_error("load_role_policy", e))?;
        Ok(Some(parse_permissions(&raw, role.as_str())))
    }

    #[instrument(skip(self, permissions), fields(role = %role, count = permissions.len()), err)]
    async fn store(
        &self,
        role: Role,
        permissions: BTreeSet<Permission>,
    ) -> Result<(), PolicyError> {
        let wire: Vec<String> = permissions
            .into_iter()
            .map(|p| p.as_str().to_string())
            .collect();
        sqlx::query(
            r#"
            INSERT INTO role_policies (role, permissions, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (role)
            DO UPDATE SET permissions = EXCLUDED.permissions, updated_at = NOW()
            "#,
        )
        .bind(role.as_str())
        .bind(&wire)
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error("store_role_policy", e))?;
        Ok(())
    }
}

fn parse_permissions(raw: &[String], context: &str) -> BTreeSet<Permission> {
    let mut set = BTreeSet::new();
    for ident in raw {
        match Permission::from_str(ident) {
            Ok(permission) => {
                set.insert(permission);
            }
            Err(_) => {
                tracing::warn!(identifier = %ident, context = %context, "skipping unknown permission identifier in stored policy");
            }
        }
    }
    set
}

fn store_error(operation: &str, err: sqlx::Error) -> PolicyError {
    PolicyError::Unavailable(format!("{operation}: {err}"))
}
