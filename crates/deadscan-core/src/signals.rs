//! Page-lifetime signal counters and the overlay signature.

use serde::{Deserialize, Serialize};

/// Monotonic counters since instrumentation was installed for the current
/// page load.
///
/// Snapshots are only ever compared by delta, never by absolute value: the
/// counters reset to zero on every full page (re)load, so both snapshots of
/// a comparison must come from the same load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSnapshot {
    #[serde(default)]
    pub dom_mutations: u64,
    #[serde(default)]
    pub audio_play_calls: u64,
    #[serde(default)]
    pub speech_speak_calls: u64,
    #[serde(default)]
    pub clipboard_writes: u64,
}

impl SignalSnapshot {
    /// Counter growth since `earlier`. Saturating: a mid-comparison page
    /// reload resets the counters, which must read as zero growth rather
    /// than underflow.
    pub fn delta(&self, earlier: &SignalSnapshot) -> SignalDelta {
        SignalDelta {
            dom_mutations: self.dom_mutations.saturating_sub(earlier.dom_mutations),
            audio_play_calls: self.audio_play_calls.saturating_sub(earlier.audio_play_calls),
            speech_speak_calls: self
                .speech_speak_calls
                .saturating_sub(earlier.speech_speak_calls),
            clipboard_writes: self.clipboard_writes.saturating_sub(earlier.clipboard_writes),
        }
    }
}

/// Growth between two [`SignalSnapshot`]s of the same page load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalDelta {
    pub dom_mutations: u64,
    pub audio_play_calls: u64,
    pub speech_speak_calls: u64,
    pub clipboard_writes: u64,
}

impl SignalDelta {
    pub fn media_played(&self) -> bool {
        self.audio_play_calls > 0 || self.speech_speak_calls > 0
    }

    pub fn clipboard_written(&self) -> bool {
        self.clipboard_writes > 0
    }
}

/// Coarse count of currently-open modal/overlay-like UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySignature {
    #[serde(default)]
    pub open_dialogs: u64,
}
