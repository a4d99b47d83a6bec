//! Run report model and builder.
//!
//! The report JSON is a bit-stable contract consumed by dashboards and CI
//! gates; field names here are load-bearing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ScanMode;
use crate::element::ElementSnapshot;
use crate::outcome::ActionOutcome;

/// One processed (route, element) pair. Cache hits still emit a record,
/// tagged `reused`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub route: String,
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_group: Option<String>,
    pub tag_name: String,
    pub label: String,
    pub action: String,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup_url: Option<String>,
    #[serde(default)]
    pub reused: bool,
}

impl InteractionRecord {
    pub fn from_outcome(
        route: &str,
        selector: &str,
        snapshot: &ElementSnapshot,
        outcome: &ActionOutcome,
        reused: bool,
    ) -> Self {
        Self {
            route: route.to_string(),
            selector: selector.to_string(),
            stable_id: snapshot.stable_id.clone(),
            scan_group: snapshot.scan_group.clone(),
            tag_name: snapshot.tag_name.clone(),
            label: snapshot.label.clone(),
            action: outcome.action_name().to_string(),
            outcome: if outcome.is_dead() { "dead" } else { "pass" }.to_string(),
            navigation_to: outcome.destination().map(str::to_string),
            popup_url: None,
            reused,
        }
    }
}

/// A visible, enabled control whose activation produced no detectable
/// effect. Never retracted once emitted in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadClick {
    pub route: String,
    pub selector: String,
    pub label: String,
    /// Ordered, human-readable reproduction steps.
    pub repro: Vec<String>,
}

impl DeadClick {
    pub fn new(route: &str, selector: &str, label: &str) -> Self {
        let described = if label.is_empty() { selector } else { label };
        Self {
            route: route.to_string(),
            selector: selector.to_string(),
            label: label.to_string(),
            repro: vec![
                format!("Navigate to {route}"),
                format!("Click \"{described}\" ({selector})"),
                "Observe: no navigation, dialog, state change, media, or clipboard effect"
                    .to_string(),
            ],
        }
    }

    /// Dead verdict for an anchor whose target failed the out-of-band
    /// existence check.
    pub fn broken_link(route: &str, selector: &str, label: &str, status: Option<u16>) -> Self {
        let mut dead = Self::new(route, selector, label);
        dead.repro[2] = match status {
            Some(status) => format!("Observe: link target responds with HTTP {status}"),
            None => "Observe: link target is unreachable".to_string(),
        };
        dead
    }
}

/// A route that failed to load. Traversal continues to the next route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteError {
    pub route: String,
    pub error: String,
}

/// Companion finding: an interactive element carrying neither a stable test
/// id nor a scan group, so it cannot be deduplicated across routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingIdentifier {
    pub route: String,
    pub selector: String,
    pub tag_name: String,
    pub label: String,
}

/// Per-route coverage summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub id: String,
    pub path: String,
    pub interactions: usize,
    pub dead_clicks: usize,
}

/// The run artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub mode: ScanMode,
    pub generated_at: DateTime<Utc>,
    pub total_routes: usize,
    pub routes: Vec<RouteSummary>,
    pub total_interactions: usize,
    pub route_error_count: usize,
    pub dead_click_count: usize,
    pub route_errors: Vec<RouteError>,
    pub interactions: Vec<InteractionRecord>,
    pub dead_clicks: Vec<DeadClick>,
    #[serde(default)]
    pub missing_identifiers: Vec<MissingIdentifier>,
}

impl RunReport {
    /// The single end-of-run assertion: fails when any route failed to load
    /// or any dead click was found. The report itself is always complete
    /// before this is consulted, so a failing run stays diagnosable.
    pub fn ensure_clean(&self) -> Result<(), AuditFailure> {
        if self.dead_clicks.is_empty() && self.route_errors.is_empty() {
            Ok(())
        } else {
            Err(AuditFailure {
                dead_clicks: self.dead_clicks.len(),
                route_errors: self.route_errors.len(),
            })
        }
    }
}

/// Aggregate failure raised once, at the very end of a run.
#[derive(Debug, Error)]
#[error("audit failed: {dead_clicks} dead click(s), {route_errors} route error(s)")]
pub struct AuditFailure {
    pub dead_clicks: usize,
    pub route_errors: usize,
}

/// Accumulates records for one run and flushes them once at the end.
///
/// Exclusively owned by the traversal controller for the duration of a run;
/// nothing else appends.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    interactions: Vec<InteractionRecord>,
    dead_clicks: Vec<DeadClick>,
    route_errors: Vec<RouteError>,
    missing_identifiers: Vec<MissingIdentifier>,
    routes: Vec<RouteSummary>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_interaction(&mut self, record: InteractionRecord) {
        self.interactions.push(record);
    }

    pub fn record_dead_click(&mut self, dead: DeadClick) {
        self.dead_clicks.push(dead);
    }

    pub fn record_route_error(&mut self, route: &str, error: String) {
        self.route_errors.push(RouteError {
            route: route.to_string(),
            error,
        });
    }

    pub fn record_missing_identifier(&mut self, finding: MissingIdentifier) {
        self.missing_identifiers.push(finding);
    }

    pub fn record_route_summary(&mut self, summary: RouteSummary) {
        self.routes.push(summary);
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn dead_click_count(&self) -> usize {
        self.dead_clicks.len()
    }

    pub fn finish(self, mode: ScanMode, total_routes: usize) -> RunReport {
        RunReport {
            mode,
            generated_at: Utc::now(),
            total_routes,
            total_interactions: self.interactions.len(),
            route_error_count: self.route_errors.len(),
            dead_click_count: self.dead_clicks.len(),
            routes: self.routes,
            route_errors: self.route_errors,
            interactions: self.interactions,
            dead_clicks: self.dead_clicks,
            missing_identifiers: self.missing_identifiers,
        }
    }
}
