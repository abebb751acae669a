//! Store selection and engine assembly.
//!
//! One deployment switch: `USE_PERSISTENT_STORES=true` keeps policies and
//! overrides in Postgres. Anything else runs on seeded in-memory stores,
//! which is what local development and the test suite use.

use std::sync::Arc;

use sqlx::PgPool;

use tillgate_access::{
    AccessGuard, AdminApi, Resolver, RolePolicyStore, UserDirectory, UserOverrideStore,
};
use tillgate_infra::{
    InMemoryRolePolicyStore, InMemoryUserDirectory, InMemoryUserOverrideStore,
    PostgresRolePolicyStore, PostgresUserOverrideStore,
};

/// Everything the handlers need, already wired.
pub struct AppServices {
    pub admin: AdminApi,
    pub guard: AccessGuard,
    pub resolver: Arc<Resolver>,
}

pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    if use_persistent {
        build_persistent_services().await
    } else {
        build_in_memory_services()
    }
}

fn build_in_memory_services() -> AppServices {
    tracing::info!("starting with in-memory stores (seeded role defaults)");
    let policies: Arc<dyn RolePolicyStore> = Arc::new(InMemoryRolePolicyStore::with_defaults());
    let overrides: Arc<dyn UserOverrideStore> = Arc::new(InMemoryUserOverrideStore::new());
    assemble(policies, overrides)
}

async fn build_persistent_services() -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");
    tracing::info!("starting with Postgres-backed stores");

    let policy_store = PostgresRolePolicyStore::new(pool.clone());
    policy_store
        .ensure_schema()
        .await
        .expect("failed to prepare role policy schema");
    policy_store
        .seed_defaults()
        .await
        .expect("failed to seed role policy defaults");

    let override_store = PostgresUserOverrideStore::new(pool);
    override_store
        .ensure_schema()
        .await
        .expect("failed to prepare user override schema");

    assemble(Arc::new(policy_store), Arc::new(override_store))
}

fn assemble(
    policies: Arc<dyn RolePolicyStore>,
    overrides: Arc<dyn UserOverrideStore>,
) -> AppServices {
    // Staff records are an in-memory read model for now; deployments with
    // a real identity system bind it behind `UserDirectory`.
    let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new());
    let resolver = Arc::new(Resolver::new(policies.clone(), overrides.clone()));
    let guard = AccessGuard::new(resolver.clone());
    let admin = AdminApi::new(policies, overrides, directory, resolver.clone());

    AppServices {
        admin,
        guard,
        resolver,
    }
}
