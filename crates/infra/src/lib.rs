//! Infrastructure layer: storage adapters for the access-control domain.
//!
//! Each store trait from `tillgate-access` gets two adapters here: an
//! in-memory one for tests and single-process deployments, and a Postgres
//! one for durable installs. Both sides honor the same contracts, so the
//! resolver and admin API never know which backend is wired in.

pub mod directory;
pub mod override_store;
pub mod policy_store;

pub use directory::InMemoryUserDirectory;
pub use override_store::{InMemoryUserOverrideStore, PostgresUserOverrideStore};
pub use policy_store::{InMemoryRolePolicyStore, PostgresRolePolicyStore};

#[cfg(test)]
mod integration_tests;
