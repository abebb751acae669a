//! Postgres-backed user override store.
//!
//! One row per user with granted/revoked as `TEXT[]` columns. Every
//! single-permission mutation is one SQL statement built from
//! `array_remove`/`array_append`, so the permission hops sides atomically;
//! the disjointness of the two columns survives any interleaving. Unknown
//! identifiers in stored rows are skipped on read with a warning.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use tillgate_access::catalog::Permission;
use tillgate_access::overrides::{OverrideError, UserOverrideStore, UserOverrides};
use tillgate_core::UserId;

/// Postgres-backed user override store.
#[derive(Debug, Clone)]
pub struct PostgresUserOverrideStore {
    pool: Arc<PgPool>,
}

impl PostgresUserOverrideStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), OverrideError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_overrides (
                user_id    UUID PRIMARY KEY,
                granted    TEXT[] NOT NULL DEFAULT '{}',
                revoked    TEXT[] NOT NULL DEFAULT '{}',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserOverrideStore for PostgresUserOverrideStore {
    #[instrument(skip(self), fields(user = %user_id), err)]
    async fn load(&self, user_id: UserId) -> Result<Option<UserOverrides>, OverrideError> {
        let row = sqlx::query("SELECT granted, revoked FROM user_overrides WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| store_error("load_overrides", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let granted_raw: Vec<String> = row
            .try_get("granted")
            .map_err(|e| store_error("load_overrides", e))?;
        let revoked_raw: Vec<String> = row
            .try_get("revoked")
            .map_err(|e| store_error("load_overrides", e))?;

        let granted = parse_permissions(&granted_raw, user_id);
        let revoked = parse_permissions(&revoked_raw, user_id);

        // Single-statement writes keep the columns disjoint; overlap means
        // the row was edited outside this store.
        UserOverrides::from_sets(granted, revoked).map(Some).map_err(|_| {
            OverrideError::Unavailable(format!("corrupt override record for user {user_id}"))
        })
    }

    #[instrument(skip(self, overrides), fields(user = %user_id, count = overrides.len()), err)]
    async fn replace(
        &self,
        user_id: UserId,
        overrides: UserOverrides,
    ) -> Result<(), OverrideError> {
        if overrides.is_empty() {
            return self.remove_user(user_id).await;
        }

        let granted: Vec<String> = overrides
            .granted()
            .into_iter()
            .map(|p| p.as_str().to_string())
            .collect();
        let revoked: Vec<String> = overrides
            .revoked()
            .into_iter()
            .map(|p| p.as_str().to_string())
            .collect();

        sqlx::query(
            r#"
            INSERT INTO user_overrides (user_id, granted, revoked, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                granted = EXCLUDED.granted,
                revoked = EXCLUDED.revoked,
                updated_at = NOW()
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(&granted)
        .bind(&revoked)
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error("replace_overrides", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user = %user_id, permission = %permission), err)]
    async fn grant(&self, user_id: UserId, permission: Permission) -> Result<(), OverrideError> {
        sqlx::query(
            r#"
            INSERT INTO user_overrides (user_id, granted, revoked, updated_at)
            VALUES ($1, ARRAY[$2]::text[], '{}'::text[], NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                granted = array_append(array_remove(user_overrides.granted, $2), $2),
                revoked = array_remove(user_overrides.revoked, $2),
                updated_at = NOW()
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error("grant_override", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user = %user_id, permission = %permission), err)]
    async fn revoke(
        &self,
        user_id: UserId,
        permission: Permission,
    ) -> Result<(), OverrideError> {
        sqlx::query(
            r#"
            INSERT INTO user_overrides (user_id, granted, revoked, updated_at)
            VALUES ($1, '{}'::text[], ARRAY[$2]::text[], NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                granted = array_remove(user_overrides.granted, $2),
                revoked = array_append(array_remove(user_overrides.revoked, $2), $2),
                updated_at = NOW()
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error("revoke_override", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user = %user_id, permission = %permission), err)]
    async fn clear(&self, user_id: UserId, permission: Permission) -> Result<(), OverrideError> {
        sqlx::query(
            r#"
            UPDATE user_overrides
            SET granted = array_remove(granted, $2),
                revoked = array_remove(revoked, $2),
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error("clear_override", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user = %user_id), err)]
    async fn remove_user(&self, user_id: UserId) -> Result<(), OverrideError> {
        sqlx::query("DELETE FROM user_overrides WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| store_error("remove_user_overrides", e))?;
        Ok(())
    }
}

fn parse_permissions(
    raw: &[String],
    user_id: UserId,
) -> std::collections::BTreeSet<Permission> {
    let mut set = std::collections::BTreeSet::new();
    for ident in raw {
        match Permission::from_str(ident) {
            Ok(permission) => {
                set.insert(permission);
            }
            Err(_) => {
                tracing::warn!(identifier = %ident, user = %user_id, "skipping unknown permission identifier in stored overrides");
            }
        }
    }
    set
}

fn store_error(operation: &str, err: sqlx::Error) -> OverrideError {
    OverrideError::Unavailable(format!("{operation}: {err}"))
}
