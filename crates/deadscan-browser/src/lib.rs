//! Browser substrate for the deadscan auditor.
//!
//! Drives Chrome over the DevTools Protocol: a WebSocket CDP client with
//! popup-target tracking, a page session for navigation and trusted input,
//! the injected signal instrumentation, and the pure snapshot services the
//! scanner polls. [`CdpProbe`] ties all of it together behind the
//! `PageProbe` seam.

pub mod cdp;
pub mod instrument;
pub mod launcher;
pub mod probe;
pub mod snapshot;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use instrument::SignalRegistry;
pub use launcher::{Browser, BrowserConfig, BrowserError};
pub use probe::CdpProbe;
