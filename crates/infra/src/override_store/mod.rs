//! User override store implementations.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserOverrideStore;
pub use postgres::PostgresUserOverrideStore;
