//! Scan configuration and environment knobs.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which session state the run audits. Signed-out and signed-in audits run
/// as separate, fully isolated processes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    #[default]
    SignedOut,
    SignedIn,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignedOut => "signed-out",
            Self::SignedIn => "signed-in",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown scan mode: {0} (expected signed-out or signed-in)")]
pub struct ParseModeError(String);

impl FromStr for ScanMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signed-out" => Ok(Self::SignedOut),
            "signed-in" => Ok(Self::SignedIn),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// Tunable limits for one scan run.
///
/// Defaults favor full coverage with generous but bounded limits; every
/// knob can also come from the environment.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum routes traversed in one run.
    pub max_routes: usize,
    /// Per-route safety limit on classified elements. Protects against
    /// infinite/auto-generating UIs.
    pub max_elements_per_route: usize,
    /// Poll schedule for outcome detection after a click.
    pub poll_delays: Vec<Duration>,
    /// Idle interval used to measure the ambient DOM-mutation baseline
    /// before any click.
    pub settle_delay: Duration,
    /// Margin over the ambient baseline before DOM churn counts as a caused
    /// effect. Empirically tuned per target application.
    pub noise_margin: u64,
    pub verbose: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_routes: 200,
            max_elements_per_route: 120,
            poll_delays: vec![
                Duration::from_millis(60),
                Duration::from_millis(120),
                Duration::from_millis(180),
            ],
            settle_delay: Duration::from_millis(80),
            noise_margin: 2,
            verbose: false,
        }
    }
}

impl ScanConfig {
    /// Defaults with `DEADSCAN_MAX_ROUTES`, `DEADSCAN_MAX_ELEMENTS` and
    /// `DEADSCAN_VERBOSE` applied on top.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_with(|name| std::env::var(name).ok());
        config
    }

    /// Apply environment knobs via a lookup function (injectable for tests).
    pub fn apply_env_with(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(n) = get("DEADSCAN_MAX_ROUTES").and_then(|v| v.parse().ok()) {
            self.max_routes = n;
        }
        if let Some(n) = get("DEADSCAN_MAX_ELEMENTS").and_then(|v| v.parse().ok()) {
            self.max_elements_per_route = n;
        }
        if let Some(v) = get("DEADSCAN_VERBOSE") {
            self.verbose = matches!(v.as_str(), "1" | "true" | "yes");
        }
    }

    /// DOM-churn threshold for a given ambient baseline: a delta must
    /// exceed `max(noise_margin, baseline + noise_margin)` to count as a
    /// caused effect.
    pub fn churn_threshold(&self, baseline: u64) -> u64 {
        self.noise_margin.max(baseline + self.noise_margin)
    }
}
