//! Shared data model and seams for the deadscan UI interaction auditor.
//!
//! Everything in this crate is browser-free: plain data types plus the
//! [`PageProbe`] trait the scanner drives, so the whole audit pipeline can
//! run against a fake page in tests.

pub mod config;
pub mod element;
pub mod error;
pub mod outcome;
pub mod poll;
pub mod probe;
pub mod report;
pub mod route;
pub mod signals;

pub use config::{ParseModeError, ScanConfig, ScanMode};
pub use element::{DiscoveredElement, ElementSnapshot, GlobalKey, KeyIdentity, StateAttrs};
pub use error::ProbeError;
pub use outcome::ActionOutcome;
pub use poll::poll_until;
pub use probe::{PageProbe, PopupInfo};
pub use report::{
    AuditFailure, DeadClick, InteractionRecord, MissingIdentifier, ReportBuilder, RouteError,
    RouteSummary, RunReport,
};
pub use route::{Route, RouteCatalog};
pub use signals::{OverlaySignature, SignalDelta, SignalSnapshot};
