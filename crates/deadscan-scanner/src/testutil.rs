//! Scripted `PageProbe` fake shared by classifier and traversal tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use deadscan_core::{
    DiscoveredElement, ElementSnapshot, OverlaySignature, PageProbe, PopupInfo, ProbeError,
    SignalSnapshot, StateAttrs,
};

#[derive(Default)]
pub struct FakeState {
    pub url: String,
    pub overlay: OverlaySignature,
    pub signals: SignalSnapshot,
    /// Elements visible per page URL.
    pub elements_by_url: HashMap<String, Vec<DiscoveredElement>>,
    /// Live element state per selector; a missing entry reads as stale.
    pub states: HashMap<String, StateAttrs>,
    /// Popups waiting to be drained.
    pub pending_popups: Vec<PopupInfo>,
    /// Ambient DOM churn added on every signal read (background timers).
    pub ambient_per_read: u64,
    pub activations: Vec<String>,
    pub gotos: Vec<String>,
    pub failing_urls: HashSet<String>,
    pub closed_popups: Vec<String>,
    pub dismissals: usize,
}

type Effect = dyn Fn(&mut FakeState, &str) + Send + Sync;

/// A page whose reaction to activation is scripted per test.
pub struct FakeProbe {
    pub state: Mutex<FakeState>,
    effect: Box<Effect>,
}

impl FakeProbe {
    pub fn new(url: &str) -> Self {
        Self::with_effect(url, |_, _| {})
    }

    pub fn with_effect(
        url: &str,
        effect: impl Fn(&mut FakeState, &str) + Send + Sync + 'static,
    ) -> Self {
        let state = FakeState {
            url: url.to_string(),
            ..FakeState::default()
        };
        Self {
            state: Mutex::new(state),
            effect: Box::new(effect),
        }
    }

    /// Make `element` visible on `url` and register its live state.
    pub fn add_element(&self, url: &str, element: DiscoveredElement) {
        let mut state = self.state.lock();
        state
            .states
            .insert(element.selector.clone(), element.state.clone());
        state
            .elements_by_url
            .entry(url.to_string())
            .or_default()
            .push(element);
    }
}

#[async_trait]
impl PageProbe for FakeProbe {
    async fn current_url(&self) -> Result<String, ProbeError> {
        Ok(self.state.lock().url.clone())
    }

    async fn goto(&self, url: &str) -> Result<(), ProbeError> {
        let mut state = self.state.lock();
        if state.failing_urls.contains(url) {
            return Err(ProbeError::Navigation(format!("cannot load {url}")));
        }
        state.url = url.to_string();
        state.gotos.push(url.to_string());
        Ok(())
    }

    async fn signals(&self) -> Result<SignalSnapshot, ProbeError> {
        let mut state = self.state.lock();
        state.signals.dom_mutations += state.ambient_per_read;
        Ok(state.signals)
    }

    async fn overlay_signature(&self) -> Result<OverlaySignature, ProbeError> {
        Ok(self.state.lock().overlay)
    }

    async fn visible_elements(&self) -> Result<Vec<DiscoveredElement>, ProbeError> {
        let state = self.state.lock();
        Ok(state
            .elements_by_url
            .get(&state.url)
            .cloned()
            .unwrap_or_default())
    }

    async fn element_state(&self, selector: &str) -> Result<Option<StateAttrs>, ProbeError> {
        Ok(self.state.lock().states.get(selector).cloned())
    }

    async fn activate(&self, selector: &str) -> Result<(), ProbeError> {
        let mut state = self.state.lock();
        state.activations.push(selector.to_string());
        (self.effect)(&mut state, selector);
        Ok(())
    }

    async fn drain_popups(&self) -> Result<Vec<PopupInfo>, ProbeError> {
        Ok(std::mem::take(&mut self.state.lock().pending_popups))
    }

    async fn close_popup(&self, target_id: &str) -> Result<(), ProbeError> {
        self.state.lock().closed_popups.push(target_id.to_string());
        Ok(())
    }

    async fn dismiss_overlays(&self) -> Result<(), ProbeError> {
        let mut state = self.state.lock();
        state.overlay.open_dialogs = 0;
        state.dismissals += 1;
        Ok(())
    }
}

/// A plain, identifier-less control (a decorative button).
pub fn anonymous_button(selector: &str, label: &str) -> DiscoveredElement {
    DiscoveredElement {
        snapshot: ElementSnapshot {
            stable_id: None,
            scan_group: None,
            tag_name: "button".into(),
            role: None,
            href: None,
            label: label.into(),
            disabled: false,
        },
        selector: selector.into(),
        state: StateAttrs::default(),
        input_type: Some("button".into()),
        disabled_reason: None,
    }
}

/// A control carrying a scan group, eligible for the cross-route cache.
pub fn grouped_button(selector: &str, scan_group: &str, label: &str) -> DiscoveredElement {
    let mut element = anonymous_button(selector, label);
    element.snapshot.scan_group = Some(scan_group.into());
    element
}

/// A same-origin anchor.
pub fn anchor(selector: &str, href: &str, label: &str) -> DiscoveredElement {
    DiscoveredElement {
        snapshot: ElementSnapshot {
            stable_id: None,
            scan_group: None,
            tag_name: "a".into(),
            role: None,
            href: Some(href.into()),
            label: label.into(),
            disabled: false,
        },
        selector: selector.into(),
        state: StateAttrs::default(),
        input_type: None,
        disabled_reason: None,
    }
}
