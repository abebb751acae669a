//! Role policy store implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRolePolicyStore;
pub use postgres::PostgresRolePolicyStore;
