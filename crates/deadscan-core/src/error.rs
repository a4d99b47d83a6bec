//! Error surface of the page-probe seam.

use thiserror::Error;

/// Errors surfaced by a [`crate::PageProbe`] implementation.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A previously-snapshotted element no longer resolves to a live node.
    ///
    /// Not a finding: the scanner skips the element and re-discovers it on
    /// the next pass if it is still present.
    #[error("stale element: {0}")]
    Stale(String),

    /// Navigation to a URL failed or timed out.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The underlying browser transport failed.
    #[error("browser error: {0}")]
    Browser(String),

    /// A page-side query returned something unparseable.
    #[error("invalid page response: {0}")]
    InvalidResponse(String),
}
