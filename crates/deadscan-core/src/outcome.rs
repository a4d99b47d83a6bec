//! Classified effect of activating a control.

use serde::{Deserialize, Serialize};

/// The classified effect of activating one control on one route.
///
/// Classification is total: every processed element produces exactly one of
/// these, and the value is immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionOutcome {
    /// The page (or a popup it opened) navigated somewhere.
    Navigate { destination: String },
    /// A modal/overlay opened.
    OpenModal,
    /// A submit-typed control caused DOM or attribute change.
    Submit,
    /// The element (or the page) changed state in place. Clipboard copies
    /// are modeled as toggles, not navigation.
    Toggle,
    /// Media playback or speech synthesis started.
    PlayAudio,
    /// The control is disabled; no click was attempted.
    Disabled { reason: String },
    /// No detectable effect within the polling budget.
    Dead,
}

impl ActionOutcome {
    /// Report-facing action name.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::OpenModal => "open-modal",
            Self::Submit => "submit",
            Self::Toggle => "toggle",
            Self::PlayAudio => "play-audio",
            Self::Disabled { .. } => "disabled",
            Self::Dead => "dead",
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Whether the outcome may seed the cross-route verification cache.
    pub fn is_cacheable(&self) -> bool {
        !self.is_dead()
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Navigate { destination } => Some(destination),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names() {
        let nav = ActionOutcome::Navigate {
            destination: "/next".into(),
        };
        assert_eq!(nav.action_name(), "navigate");
        assert_eq!(nav.destination(), Some("/next"));
        assert_eq!(ActionOutcome::OpenModal.action_name(), "open-modal");
        assert_eq!(ActionOutcome::Dead.action_name(), "dead");
    }

    #[test]
    fn only_dead_is_uncacheable() {
        assert!(!ActionOutcome::Dead.is_cacheable());
        assert!(ActionOutcome::Toggle.is_cacheable());
        assert!(ActionOutcome::Disabled {
            reason: "disabled attribute".into()
        }
        .is_cacheable());
    }

    #[test]
    fn serializes_tagged() {
        let json = serde_json::to_value(ActionOutcome::Navigate {
            destination: "/a".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "navigate");
        assert_eq!(json["destination"], "/a");
    }
}
