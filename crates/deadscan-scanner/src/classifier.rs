//! Action classification: trigger a control and decide what it did.
//!
//! The detection channels are a fixed, priority-ordered list evaluated
//! against an [`Observation`] at each poll step — navigation and modal
//! channels run before the noisier DOM-churn heuristic, so the common
//! outcomes can never be shadowed by ambient page activity.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use deadscan_core::{
    poll_until, ActionOutcome, DiscoveredElement, OverlaySignature, PageProbe, PopupInfo,
    ProbeError, ScanConfig, SignalSnapshot, StateAttrs,
};

/// Everything observable at one poll step.
#[derive(Debug, Clone)]
pub struct Observation {
    /// Popup targets opened since the previous drain.
    pub popups: Vec<PopupInfo>,
    pub url: String,
    pub overlay: OverlaySignature,
    pub signals: SignalSnapshot,
    /// `None` when the element no longer resolves.
    pub state: Option<StateAttrs>,
    /// DOM-mutation growth since the previous poll step.
    pub dom_delta: u64,
}

/// Immutable context captured before the click.
#[derive(Debug, Clone)]
pub struct BeforeState {
    pub url: String,
    pub overlay: OverlaySignature,
    /// Signal counters after the settle interval; click-caused growth is
    /// measured from here.
    pub signals: SignalSnapshot,
    pub state: StateAttrs,
    /// Ambient DOM-mutation growth over one settle interval with no click
    /// performed.
    pub baseline_dom_delta: u64,
}

/// Per-element inputs the channels need beyond the observation itself.
#[derive(Debug, Clone, Copy)]
pub struct ChannelInputs {
    /// A DOM delta must exceed this to count as a caused effect.
    pub churn_threshold: u64,
    pub submit_typed: bool,
}

type Channel = fn(&Observation, &BeforeState, &ChannelInputs) -> Option<ActionOutcome>;

/// Priority order is the contract; do not reorder.
const CHANNELS: &[(&str, Channel)] = &[
    ("popup", popup_channel),
    ("url-change", url_change_channel),
    ("overlay", overlay_channel),
    ("media", media_channel),
    ("clipboard", clipboard_channel),
    ("dom-churn", churn_channel),
];

fn popup_channel(
    obs: &Observation,
    _before: &BeforeState,
    _inputs: &ChannelInputs,
) -> Option<ActionOutcome> {
    obs.popups.first().map(|popup| ActionOutcome::Navigate {
        destination: popup.url.clone(),
    })
}

fn url_change_channel(
    obs: &Observation,
    before: &BeforeState,
    _inputs: &ChannelInputs,
) -> Option<ActionOutcome> {
    (obs.url != before.url).then(|| ActionOutcome::Navigate {
        destination: obs.url.clone(),
    })
}

fn overlay_channel(
    obs: &Observation,
    before: &BeforeState,
    _inputs: &ChannelInputs,
) -> Option<ActionOutcome> {
    (obs.overlay.open_dialogs > before.overlay.open_dialogs).then_some(ActionOutcome::OpenModal)
}

fn media_channel(
    obs: &Observation,
    before: &BeforeState,
    _inputs: &ChannelInputs,
) -> Option<ActionOutcome> {
    obs.signals
        .delta(&before.signals)
        .media_played()
        .then_some(ActionOutcome::PlayAudio)
}

/// Copy actions are modeled as toggles, not navigation.
fn clipboard_channel(
    obs: &Observation,
    before: &BeforeState,
    _inputs: &ChannelInputs,
) -> Option<ActionOutcome> {
    obs.signals
        .delta(&before.signals)
        .clipboard_written()
        .then_some(ActionOutcome::Toggle)
}

fn churn_channel(
    obs: &Observation,
    before: &BeforeState,
    inputs: &ChannelInputs,
) -> Option<ActionOutcome> {
    let own_changed = obs.state.as_ref().is_some_and(|s| *s != before.state);
    if own_changed || obs.dom_delta > inputs.churn_threshold {
        Some(if inputs.submit_typed {
            ActionOutcome::Submit
        } else {
            ActionOutcome::Toggle
        })
    } else {
        None
    }
}

/// Resolve one observation against the fixed channel order,
/// short-circuiting on the first match.
pub fn resolve(
    obs: &Observation,
    before: &BeforeState,
    inputs: &ChannelInputs,
) -> Option<(&'static str, ActionOutcome)> {
    CHANNELS
        .iter()
        .find_map(|(name, channel)| channel(obs, before, inputs).map(|outcome| (*name, outcome)))
}

/// A classification plus its evidence.
#[derive(Debug, Clone)]
pub struct Classification {
    pub outcome: ActionOutcome,
    /// Set when the effect was a popup rather than a same-tab navigation.
    pub popup_url: Option<String>,
}

/// Classifies one element at a time against a live (or fake) page.
pub struct Classifier {
    config: ScanConfig,
}

impl Classifier {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Classify `element`. Total: always produces exactly one outcome. The
    /// only error surfaced to the caller is [`ProbeError::Stale`] from the
    /// pre-click reads (the element vanished between discovery and
    /// classification) and hard transport failures on those same reads;
    /// everything after the click degrades to `Dead` rather than erroring.
    pub async fn classify(
        &self,
        probe: &dyn PageProbe,
        element: &DiscoveredElement,
    ) -> Result<Classification, ProbeError> {
        if element.snapshot.disabled {
            let reason = element
                .disabled_reason
                .clone()
                .unwrap_or_else(|| "disabled attribute".to_string());
            return Ok(Classification {
                outcome: ActionOutcome::Disabled { reason },
                popup_url: None,
            });
        }

        let selector = element.selector.as_str();

        let url = probe.current_url().await?;
        let overlay = probe.overlay_signature().await?;
        let first_signals = probe.signals().await?;
        let Some(state) = probe.element_state(selector).await? else {
            return Err(ProbeError::Stale(selector.to_string()));
        };

        // Ambient noise baseline: DOM-mutation growth over one settle
        // interval with no click yet performed.
        tokio::time::sleep(self.config.settle_delay).await;
        let settled = probe.signals().await?;
        let baseline = settled.delta(&first_signals).dom_mutations;

        let before = BeforeState {
            url,
            overlay,
            signals: settled,
            state,
            baseline_dom_delta: baseline,
        };
        let inputs = ChannelInputs {
            churn_threshold: self.config.churn_threshold(baseline),
            submit_typed: element.is_submit_typed(),
        };

        // Only popups opened after the click may count as its effect.
        let _ = probe.drain_popups().await;

        if let Err(e) = probe.activate(selector).await {
            match e {
                ProbeError::Stale(s) => return Err(ProbeError::Stale(s)),
                // Activation failures never decide deadness; polling does.
                other => debug!("Activation of {} failed: {}", selector, other),
            }
        }

        // Rolling anchor for DOM churn: each step measures growth since the
        // previous step, so accumulating ambient churn never outruns the
        // per-interval baseline.
        let prev_dom = AtomicU64::new(settled.dom_mutations);
        let prev_dom_ref = &prev_dom;
        let before_ref = &before;
        let inputs_ref = &inputs;

        let decided = poll_until(&self.config.poll_delays, move || async move {
            let obs = observe(probe, selector, prev_dom_ref).await?;
            resolve(&obs, before_ref, inputs_ref)
                .map(|(channel, outcome)| (channel, outcome, obs.popups))
        })
        .await;

        if let Some((channel, outcome, popups)) = decided {
            debug!(
                channel,
                "Classified {} as {}",
                selector,
                outcome.action_name()
            );
            let popup_url = if channel == "popup" {
                outcome.destination().map(str::to_string)
            } else {
                None
            };
            for popup in &popups {
                if let Err(e) = probe.close_popup(&popup.target_id).await {
                    debug!("Failed to close popup {}: {}", popup.target_id, e);
                }
            }
            return Ok(Classification { outcome, popup_url });
        }

        // One late re-check: a slow popup may land after the poll budget.
        if let Ok(popups) = probe.drain_popups().await {
            if let Some(first) = popups.first() {
                let destination = first.url.clone();
                for popup in &popups {
                    let _ = probe.close_popup(&popup.target_id).await;
                }
                return Ok(Classification {
                    outcome: ActionOutcome::Navigate {
                        destination: destination.clone(),
                    },
                    popup_url: Some(destination),
                });
            }
        }

        debug!("No effect detected for {}", selector);
        Ok(Classification {
            outcome: ActionOutcome::Dead,
            popup_url: None,
        })
    }
}

/// Gather one observation. Any read failure yields `None` — a step that
/// cannot observe decides nothing, and an element that stays unobservable
/// for the whole budget conservatively classifies `Dead`.
async fn observe(
    probe: &dyn PageProbe,
    selector: &str,
    prev_dom: &AtomicU64,
) -> Option<Observation> {
    let popups = probe.drain_popups().await.ok()?;
    let url = probe.current_url().await.ok()?;
    let overlay = probe.overlay_signature().await.ok()?;
    let signals = probe.signals().await.ok()?;
    let state = probe.element_state(selector).await.ok().flatten();
    let dom_delta = signals
        .dom_mutations
        .saturating_sub(prev_dom.swap(signals.dom_mutations, Ordering::SeqCst));
    Some(Observation {
        popups,
        url,
        overlay,
        signals,
        state,
        dom_delta,
    })
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
