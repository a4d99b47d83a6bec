//! Element snapshots and the cross-route equivalence key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One visible interactive control at the moment of discovery.
///
/// Created fresh on every snapshot, never mutated, discarded after
/// classification. This is the shape that reaches the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    /// Stable test identifier, when the control carries one.
    #[serde(default)]
    pub stable_id: Option<String>,
    /// Author-supplied logical-equivalence tag ("this is *the* translate
    /// button regardless of route").
    #[serde(default)]
    pub scan_group: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Mutable-state attributes captured before a click and re-read afterwards
/// to detect state toggles on the element itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAttrs {
    #[serde(default)]
    pub expanded: Option<String>,
    #[serde(default)]
    pub pressed: Option<String>,
    #[serde(default)]
    pub checked: Option<String>,
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub selected: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

/// A discovered element as the snapshot service hands it to the scanner:
/// the report-facing snapshot plus what the scanner needs to re-resolve and
/// re-read the element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredElement {
    #[serde(flatten)]
    pub snapshot: ElementSnapshot,
    /// CSS selector the probe can re-resolve the element by.
    pub selector: String,
    #[serde(default)]
    pub state: StateAttrs,
    /// `type` attribute, used to recognize submit-typed controls.
    #[serde(default)]
    pub input_type: Option<String>,
    /// Which mechanism disabled the element, when `disabled` is set.
    #[serde(default)]
    pub disabled_reason: Option<String>,
}

impl DiscoveredElement {
    /// Submit-typed means an explicit `type=submit`, or a `<button>` with no
    /// explicit type (the HTML default inside a form).
    pub fn is_submit_typed(&self) -> bool {
        match self.input_type.as_deref() {
            Some("submit") => true,
            None => self.snapshot.tag_name == "button",
            _ => false,
        }
    }

    pub fn global_key(&self) -> GlobalKey {
        GlobalKey::of(&self.snapshot)
    }
}

/// Identity component of a [`GlobalKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyIdentity {
    ScanGroup(String),
    StableId(String),
    /// Neither tag was present; the accessible label stands in as a weak
    /// identity. Anonymous keys never enter the cross-route cache.
    Anonymous(String),
}

/// Cross-route equivalence key.
///
/// Invariant: two elements sharing a key are assumed behaviorally
/// identical, so the verification cache stores one outcome per key. The key
/// is a structured record; the canonical string form exists only at the
/// storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalKey {
    pub identity: KeyIdentity,
    pub tag_name: String,
    pub role: Option<String>,
    pub href: Option<String>,
    pub disabled: bool,
}

impl GlobalKey {
    pub fn of(snapshot: &ElementSnapshot) -> Self {
        let identity = if let Some(group) = &snapshot.scan_group {
            KeyIdentity::ScanGroup(group.clone())
        } else if let Some(id) = &snapshot.stable_id {
            KeyIdentity::StableId(id.clone())
        } else {
            KeyIdentity::Anonymous(snapshot.label.clone())
        };
        Self {
            identity,
            tag_name: snapshot.tag_name.clone(),
            role: snapshot.role.clone(),
            href: snapshot.href.clone(),
            disabled: snapshot.disabled,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.identity, KeyIdentity::Anonymous(_))
    }

    /// Canonical storage form. Components are escaped so a `|` inside a
    /// label or href cannot collide with the separator.
    pub fn canonical(&self) -> String {
        fn esc(s: &str) -> String {
            s.replace('\\', "\\\\").replace('|', "\\|")
        }
        let identity = match &self.identity {
            KeyIdentity::ScanGroup(group) => format!("group:{}", esc(group)),
            KeyIdentity::StableId(id) => format!("id:{}", esc(id)),
            KeyIdentity::Anonymous(label) => format!("anon:{}", esc(label)),
        };
        format!(
            "{}|{}|{}|{}|{}",
            identity,
            esc(&self.tag_name),
            self.role.as_deref().map(esc).unwrap_or_default(),
            self.href.as_deref().map(esc).unwrap_or_default(),
            if self.disabled { "disabled" } else { "enabled" }
        )
    }
}

impl fmt::Display for GlobalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ElementSnapshot {
        ElementSnapshot {
            stable_id: Some("start-btn".into()),
            scan_group: Some("start-practice".into()),
            tag_name: "button".into(),
            role: None,
            href: None,
            label: "Start".into(),
            disabled: false,
        }
    }

    #[test]
    fn scan_group_wins_over_stable_id() {
        let key = GlobalKey::of(&snapshot());
        assert_eq!(key.identity, KeyIdentity::ScanGroup("start-practice".into()));
    }

    #[test]
    fn falls_back_to_stable_id_then_label() {
        let mut snap = snapshot();
        snap.scan_group = None;
        assert_eq!(
            GlobalKey::of(&snap).identity,
            KeyIdentity::StableId("start-btn".into())
        );
        snap.stable_id = None;
        let key = GlobalKey::of(&snap);
        assert_eq!(key.identity, KeyIdentity::Anonymous("Start".into()));
        assert!(key.is_anonymous());
    }

    #[test]
    fn canonical_escapes_separators() {
        let mut snap = snapshot();
        snap.scan_group = Some("a|b".into());
        let canonical = GlobalKey::of(&snap).canonical();
        assert!(canonical.starts_with("group:a\\|b|"));

        let mut other = snapshot();
        other.scan_group = Some("a".into());
        other.tag_name = "b|button".into();
        assert_ne!(canonical, GlobalKey::of(&other).canonical());
    }

    #[test]
    fn submit_typing() {
        let el = DiscoveredElement {
            snapshot: snapshot(),
            selector: "#x".into(),
            state: StateAttrs::default(),
            input_type: None,
            disabled_reason: None,
        };
        assert!(el.is_submit_typed());

        let mut toggle = el.clone();
        toggle.input_type = Some("button".into());
        assert!(!toggle.is_submit_typed());

        let mut input = el;
        input.snapshot.tag_name = "input".into();
        input.input_type = Some("submit".into());
        assert!(input.is_submit_typed());
    }
}
