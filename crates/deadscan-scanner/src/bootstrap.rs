//! Session bootstrap seam.

use async_trait::async_trait;
use url::Url;

use deadscan_core::{PageProbe, ScanMode};

use crate::error::ScanError;

/// External collaborator that leaves the page authenticated (or explicitly
/// signed out) for the requested mode.
///
/// Called once before traversal begins, and again opportunistically when a
/// click appears to have de-authenticated the session.
#[async_trait]
pub trait SessionBootstrap: Send + Sync {
    async fn ensure(&self, mode: ScanMode, probe: &dyn PageProbe) -> Result<(), ScanError>;
}

/// Bootstrap for applications audited without any session state.
pub struct NoopBootstrap;

#[async_trait]
impl SessionBootstrap for NoopBootstrap {
    async fn ensure(&self, _mode: ScanMode, _probe: &dyn PageProbe) -> Result<(), ScanError> {
        Ok(())
    }
}

/// Heuristic: does `url` look like the app bounced the session to a
/// sign-in page?
pub fn looks_deauthenticated(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => url.to_ascii_lowercase(),
    };
    ["/login", "/signin", "/sign-in", "/auth/"]
        .iter()
        .any(|marker| path.starts_with(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_paths_are_recognized() {
        assert!(looks_deauthenticated("https://app.test/login"));
        assert!(looks_deauthenticated("https://app.test/sign-in?next=%2Fpractice"));
        assert!(looks_deauthenticated("https://app.test/auth/callback"));
    }

    #[test]
    fn ordinary_routes_are_not() {
        assert!(!looks_deauthenticated("https://app.test/practice"));
        assert!(!looks_deauthenticated("https://app.test/lessons/login-history"));
    }
}
