//! Signal instrumentation injected into every page load.
//!
//! Non-DOM side effects (media playback, speech synthesis, clipboard
//! writes) leave no trace in a DOM snapshot, so the auditor wraps the
//! relevant APIs with counting shims before any navigation. The wrappers
//! always delegate to the original implementation: instrumentation is
//! observational, never behavior-changing.

use deadscan_core::SignalSnapshot;
use serde_json::Value;

use crate::cdp::{CdpError, PageSession};

/// Page-global object holding the counters.
const SIGNALS_OBJECT: &str = "__deadscanSignals";

/// The injected probe. Idempotent: a second evaluation in the same document
/// is a no-op, so installing both as an init script and directly into the
/// current document is safe.
const SIGNAL_PROBE_JS: &str = r#"(() => {
  if (window.__deadscanSignals) { return; }
  const signals = {
    domMutations: 0,
    audioPlayCalls: 0,
    speechSpeakCalls: 0,
    clipboardWrites: 0,
  };
  window.__deadscanSignals = signals;

  const play = HTMLMediaElement.prototype.play;
  HTMLMediaElement.prototype.play = function (...args) {
    signals.audioPlayCalls += 1;
    return play.apply(this, args);
  };

  if (window.speechSynthesis) {
    const speak = window.speechSynthesis.speak.bind(window.speechSynthesis);
    window.speechSynthesis.speak = (utterance) => {
      signals.speechSpeakCalls += 1;
      return speak(utterance);
    };
  }

  if (navigator.clipboard && navigator.clipboard.writeText) {
    const writeText = navigator.clipboard.writeText.bind(navigator.clipboard);
    navigator.clipboard.writeText = (text) => {
      signals.clipboardWrites += 1;
      return writeText(text);
    };
  }

  const observe = () => {
    const observer = new MutationObserver((records) => {
      signals.domMutations += records.length;
    });
    observer.observe(document.documentElement, {
      childList: true,
      subtree: true,
      attributes: true,
      characterData: true,
    });
  };
  if (document.documentElement) {
    observe();
  } else {
    document.addEventListener('DOMContentLoaded', observe);
  }
})();"#;

/// Run-scoped signal instrumentation.
///
/// One value per page, owned by the probe for the duration of a run. The
/// counters reset on every full page (re)load; readers compensate by only
/// comparing snapshots taken within one load.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    installed: bool,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the probe: as an init script for every future document, and
    /// directly into the current one. Must run before the first navigation.
    pub async fn install(&mut self, session: &PageSession) -> Result<(), CdpError> {
        session.add_init_script(SIGNAL_PROBE_JS).await?;
        session.evaluate(SIGNAL_PROBE_JS).await?;
        self.installed = true;
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Pure read of the current counters. An uninstrumented document (e.g.
    /// about:blank before the first navigation) reads as all zeros.
    pub async fn read(&self, session: &PageSession) -> Result<SignalSnapshot, CdpError> {
        let value = session
            .evaluate(&format!("window.{} || null", SIGNALS_OBJECT))
            .await?;
        if value == Value::Null {
            return Ok(SignalSnapshot::default());
        }
        serde_json::from_value(value).map_err(CdpError::Serialization)
    }
}
