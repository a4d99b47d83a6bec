//! `PageProbe` implementation over a live CDP page.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use deadscan_core::{
    DiscoveredElement, OverlaySignature, PageProbe, PopupInfo, ProbeError, SignalSnapshot,
    StateAttrs,
};

use crate::cdp::{CdpClient, CdpError, PageSession};
use crate::instrument::SignalRegistry;
use crate::launcher::BrowserError;
use crate::snapshot;

impl From<CdpError> for ProbeError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::NavigationFailed(msg) => ProbeError::Navigation(msg),
            CdpError::Timeout(msg) => ProbeError::Navigation(msg),
            CdpError::ElementNotFound(selector) => ProbeError::Stale(selector),
            CdpError::InvalidResponse(msg) | CdpError::JavaScript(msg) => {
                ProbeError::InvalidResponse(msg)
            }
            other => ProbeError::Browser(other.to_string()),
        }
    }
}

/// One instrumented page driven by the auditor.
///
/// Owns the signal registry for its page and tracks its own target id so
/// the popup ledger never mistakes the auditor's page for a popup.
pub struct CdpProbe {
    client: Arc<CdpClient>,
    session: PageSession,
    registry: SignalRegistry,
    own_target: String,
}

impl CdpProbe {
    /// Open a fresh page and install instrumentation before any navigation.
    pub async fn open(client: Arc<CdpClient>) -> Result<Self, BrowserError> {
        let session = client.new_page(None).await?;
        let own_target = session.target_id().to_string();

        let mut registry = SignalRegistry::new();
        registry.install(&session).await?;

        // Prime the ledger: targets that existed before this probe must
        // never read as popups.
        let _ = client.drain_created_pages(&own_target);

        Ok(Self {
            client,
            session,
            registry,
            own_target,
        })
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }
}

#[async_trait]
impl PageProbe for CdpProbe {
    async fn current_url(&self) -> Result<String, ProbeError> {
        Ok(self.session.current_url().await?)
    }

    async fn goto(&self, url: &str) -> Result<(), ProbeError> {
        self.session
            .navigate(url)
            .await
            .map_err(|e| ProbeError::Navigation(e.to_string()))
    }

    async fn signals(&self) -> Result<SignalSnapshot, ProbeError> {
        Ok(self.registry.read(&self.session).await?)
    }

    async fn overlay_signature(&self) -> Result<OverlaySignature, ProbeError> {
        Ok(snapshot::overlay_signature(&self.session).await?)
    }

    async fn visible_elements(&self) -> Result<Vec<DiscoveredElement>, ProbeError> {
        Ok(snapshot::visible_interactive_elements(&self.session).await?)
    }

    async fn element_state(&self, selector: &str) -> Result<Option<StateAttrs>, ProbeError> {
        Ok(snapshot::element_state(&self.session, selector).await?)
    }

    async fn activate(&self, selector: &str) -> Result<(), ProbeError> {
        // Trial in-page click: surfaces synchronous validation errors and
        // confirms the element still resolves.
        match self
            .session
            .evaluate(&snapshot::trial_click_js(selector))
            .await
        {
            Ok(Value::Bool(false)) => return Err(ProbeError::Stale(selector.to_string())),
            Ok(_) => {}
            Err(e) => debug!("Trial click failed for {}: {}", selector, e),
        }

        // Trusted click at the element center. Failures are swallowed: a
        // truly dead element is detected by the polling that follows, never
        // by an activation throw.
        match self.session.click_selector(selector).await {
            Ok(true) => {}
            Ok(false) => debug!("Element {} lost layout before trusted click", selector),
            Err(e) => debug!("Trusted click failed for {}: {}", selector, e),
        }

        Ok(())
    }

    async fn drain_popups(&self) -> Result<Vec<PopupInfo>, ProbeError> {
        Ok(self
            .client
            .drain_created_pages(&self.own_target)
            .into_iter()
            .map(|t| PopupInfo {
                target_id: t.target_id,
                url: t.url,
            })
            .collect())
    }

    async fn close_popup(&self, target_id: &str) -> Result<(), ProbeError> {
        Ok(self.client.close_target(target_id).await?)
    }

    async fn dismiss_overlays(&self) -> Result<(), ProbeError> {
        if let Err(e) = self.session.press_key("Escape").await {
            debug!("Escape dismissal failed: {}", e);
        }
        Ok(())
    }
}
