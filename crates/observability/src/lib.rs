//! Shared tracing/logging setup for tillgate binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

/// Initialize process-wide observability.
///
/// Safe to call multiple times; subsequent calls become no-ops. Access
/// decisions and administration writes are emitted as structured events,
/// so the subscriber is wired for JSON output.
pub fn init() {
    tracing::init();
}
