//! Scanner error taxonomy.

use deadscan_core::ProbeError;
use thiserror::Error;

/// Errors internal to one scan run.
///
/// Per-route and per-element failures are caught by the traversal
/// controller and turned into report entries; only the final aggregate
/// assertion on the finished report fails the run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A route failed to load. Recorded and non-fatal to the run.
    #[error("route load failed: {0}")]
    RouteLoad(String),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The session bootstrap could not establish the requested auth state.
    #[error("session bootstrap failed: {0}")]
    Bootstrap(String),
}
