//! `tillgate-core` — identifier primitives shared across the workspace.
//!
//! This crate is **pure** (no infrastructure concerns): just the strongly
//! typed IDs that flow between the access domain, the stores and the API.

pub mod id;

pub use id::{BusinessId, UserId};
