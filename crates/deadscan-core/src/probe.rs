//! The seam between the scanner and a live page.

use async_trait::async_trait;

use crate::element::{DiscoveredElement, StateAttrs};
use crate::error::ProbeError;
use crate::signals::{OverlaySignature, SignalSnapshot};

/// A popup/new-window page target observed since the last drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupInfo {
    pub target_id: String,
    pub url: String,
}

/// Read-and-poke surface of one live page.
///
/// The scanner only ever talks to a page through this trait, so the whole
/// audit pipeline runs unchanged against a fake in tests. Implementations
/// are driven by a single logical thread of control; no call overlaps
/// another within one run.
#[async_trait]
pub trait PageProbe: Send + Sync {
    /// Current page URL.
    async fn current_url(&self) -> Result<String, ProbeError>;

    /// Navigate to `url` and wait for the document to load.
    async fn goto(&self, url: &str) -> Result<(), ProbeError>;

    /// Instrumented signal counters for the current page load.
    async fn signals(&self) -> Result<SignalSnapshot, ProbeError>;

    /// Count of currently-visible modal/overlay-like nodes.
    async fn overlay_signature(&self) -> Result<OverlaySignature, ProbeError>;

    /// Visible interactive elements intersecting the viewport, in document
    /// order (stable within a single DOM state).
    async fn visible_elements(&self) -> Result<Vec<DiscoveredElement>, ProbeError>;

    /// Re-read the mutable-state attributes of the element at `selector`.
    /// `Ok(None)` means the element no longer resolves.
    async fn element_state(&self, selector: &str) -> Result<Option<StateAttrs>, ProbeError>;

    /// Best-effort activation: a trial in-page click (surfaces synchronous
    /// validation errors) followed by a trusted input click at the element
    /// center. In-page click failures are swallowed; a selector that no
    /// longer resolves surfaces as [`ProbeError::Stale`].
    async fn activate(&self, selector: &str) -> Result<(), ProbeError>;

    /// Page targets opened since the last drain.
    async fn drain_popups(&self) -> Result<Vec<PopupInfo>, ProbeError>;

    /// Close a popup target previously returned by
    /// [`PageProbe::drain_popups`].
    async fn close_popup(&self, target_id: &str) -> Result<(), ProbeError>;

    /// Best-effort dismissal of any open overlay (escape gesture).
    async fn dismiss_overlays(&self) -> Result<(), ProbeError>;
}
