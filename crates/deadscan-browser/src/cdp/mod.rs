//! Chrome DevTools Protocol client (WebSocket transport).

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo, TargetInfo};
pub use session::PageSession;
