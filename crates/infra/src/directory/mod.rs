//! User directory implementations.
//!
//! Identity is owned by whatever system fronts this engine; deployments
//! bind their identity service behind [`tillgate_access::UserDirectory`].
//! Only the in-memory directory ships here.

pub mod in_memory;

pub use in_memory::InMemoryUserDirectory;
