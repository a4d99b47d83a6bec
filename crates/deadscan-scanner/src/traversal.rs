//! Route traversal controller: the per-route scan loop.
//!
//! State machine per route: Load -> DiscoverBatch -> ClassifyOne ->
//! Restore, until a discovery pass yields nothing new or the per-route
//! safety limit trips. One element is classified per discovery pass: a
//! causal click likely mutated the DOM, so indexing further into a stale
//! batch would chase ghosts.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use deadscan_core::{
    ActionOutcome, DeadClick, DiscoveredElement, InteractionRecord, MissingIdentifier, PageProbe,
    ProbeError, ReportBuilder, Route, RouteCatalog, RouteSummary, RunReport, ScanConfig, ScanMode,
};

use crate::bootstrap::{looks_deauthenticated, SessionBootstrap};
use crate::cache::VerificationCache;
use crate::classifier::Classifier;
use crate::error::ScanError;
use crate::preverify::{LinkPreVerifier, LinkVerdict};

/// Drives one scan run: one page, one route and one element at a time.
///
/// Owns the verification cache and the report builder for the duration of
/// the run; both are single-threaded by construction, so no locking.
pub struct RouteTraversal {
    probe: Arc<dyn PageProbe>,
    classifier: Classifier,
    preverifier: LinkPreVerifier,
    cache: VerificationCache,
    bootstrap: Arc<dyn SessionBootstrap>,
    config: ScanConfig,
    base_url: Url,
    mode: ScanMode,
}

impl RouteTraversal {
    pub fn new(
        probe: Arc<dyn PageProbe>,
        base_url: Url,
        mode: ScanMode,
        config: ScanConfig,
        bootstrap: Arc<dyn SessionBootstrap>,
    ) -> Self {
        Self {
            probe,
            classifier: Classifier::new(config.clone()),
            preverifier: LinkPreVerifier::new(),
            cache: VerificationCache::new(),
            bootstrap,
            config,
            base_url,
            mode,
        }
    }

    /// Run the full audit across the catalog.
    ///
    /// Route failures and dead clicks are collected, never thrown; the
    /// caller decides the run's fate with `RunReport::ensure_clean`.
    pub async fn run(mut self, catalog: &RouteCatalog) -> Result<RunReport, ScanError> {
        self.bootstrap
            .ensure(self.mode, self.probe.as_ref())
            .await?;

        let mut builder = ReportBuilder::new();
        let routes: Vec<Route> = catalog
            .routes()
            .iter()
            .take(self.config.max_routes)
            .cloned()
            .collect();
        if catalog.len() > routes.len() {
            warn!(
                "Route cap reached: scanning {} of {} routes",
                routes.len(),
                catalog.len()
            );
        }

        for route in &routes {
            let interactions_before = builder.interaction_count();
            let dead_before = builder.dead_click_count();

            if let Err(e) = self.scan_route(route, &mut builder).await {
                warn!("Route {} failed: {}", route.id, e);
                builder.record_route_error(&route.path, e.to_string());
            }

            let interactions = builder.interaction_count() - interactions_before;
            let dead_clicks = builder.dead_click_count() - dead_before;
            builder.record_route_summary(RouteSummary {
                id: route.id.clone(),
                path: route.path.clone(),
                interactions,
                dead_clicks,
            });
        }

        Ok(builder.finish(self.mode, routes.len()))
    }

    fn route_url(&self, route: &Route) -> Result<Url, ScanError> {
        self.base_url
            .join(&route.path)
            .map_err(|e| ScanError::RouteLoad(format!("{}: {}", route.path, e)))
    }

    async fn scan_route(
        &mut self,
        route: &Route,
        builder: &mut ReportBuilder,
    ) -> Result<(), ScanError> {
        let url = self.route_url(route)?;
        self.probe
            .goto(url.as_str())
            .await
            .map_err(|e| ScanError::RouteLoad(e.to_string()))?;
        info!("Scanning route {} ({})", route.id, url);

        let mut visited: HashSet<String> = HashSet::new();
        let mut flagged_missing: HashSet<String> = HashSet::new();
        let mut classified = 0usize;

        loop {
            if classified >= self.config.max_elements_per_route {
                warn!(
                    "Route {}: per-route element limit reached ({})",
                    route.id, classified
                );
                break;
            }

            let batch = self.probe.visible_elements().await?;

            for element in &batch {
                let snap = &element.snapshot;
                if snap.stable_id.is_none()
                    && snap.scan_group.is_none()
                    && flagged_missing.insert(element.selector.clone())
                {
                    builder.record_missing_identifier(MissingIdentifier {
                        route: route.path.clone(),
                        selector: element.selector.clone(),
                        tag_name: snap.tag_name.clone(),
                        label: snap.label.clone(),
                    });
                }
            }

            let Some(element) = batch
                .into_iter()
                .find(|el| !visited.contains(&Self::visit_key(el)))
            else {
                break;
            };
            visited.insert(Self::visit_key(&element));
            classified += 1;

            self.process_element(route, &element, builder).await?;
        }

        debug!("Route {} done: {} elements classified", route.id, classified);
        Ok(())
    }

    /// Per-route dedup key: the canonical GlobalKey, extended with the
    /// selector for anonymous elements (their label is too weak an identity
    /// to collapse distinct controls).
    fn visit_key(element: &DiscoveredElement) -> String {
        let key = element.global_key();
        if key.is_anonymous() {
            format!("{}@{}", key.canonical(), element.selector)
        } else {
            key.canonical()
        }
    }

    async fn process_element(
        &mut self,
        route: &Route,
        element: &DiscoveredElement,
        builder: &mut ReportBuilder,
    ) -> Result<(), ScanError> {
        let key = element.global_key();

        // A control verified on an earlier route answers from the cache
        // without touching the live DOM.
        if let Some(outcome) = self.cache.get(&key) {
            debug!("Cache hit for {}: {}", key, outcome.action_name());
            builder.record_interaction(InteractionRecord::from_outcome(
                &route.path,
                &element.selector,
                &element.snapshot,
                outcome,
                true,
            ));
            return Ok(());
        }

        // Plain same-origin anchors are answered out of band.
        if let Some(verdict) = self.preverify(element).await {
            match verdict {
                LinkVerdict::Healthy { destination } | LinkVerdict::External { destination } => {
                    let outcome = ActionOutcome::Navigate { destination };
                    builder.record_interaction(InteractionRecord::from_outcome(
                        &route.path,
                        &element.selector,
                        &element.snapshot,
                        &outcome,
                        false,
                    ));
                    self.cache.put(key, outcome);
                }
                LinkVerdict::Broken { status, .. } => {
                    builder.record_interaction(InteractionRecord::from_outcome(
                        &route.path,
                        &element.selector,
                        &element.snapshot,
                        &ActionOutcome::Dead,
                        false,
                    ));
                    builder.record_dead_click(DeadClick::broken_link(
                        &route.path,
                        &element.selector,
                        &element.snapshot.label,
                        status,
                    ));
                }
            }
            return Ok(());
        }

        let classification = match self
            .classifier
            .classify(self.probe.as_ref(), element)
            .await
        {
            Ok(classification) => classification,
            Err(ProbeError::Stale(selector)) => {
                // Not an error and not a dead click: re-discovered on the
                // next pass if still present.
                debug!("Element {} went stale, skipping", selector);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let outcome = classification.outcome;
        let mut record = InteractionRecord::from_outcome(
            &route.path,
            &element.selector,
            &element.snapshot,
            &outcome,
            false,
        );
        record.popup_url = classification.popup_url;
        builder.record_interaction(record);

        if outcome.is_dead() {
            info!("Dead click on {}: {}", route.path, element.selector);
            builder.record_dead_click(DeadClick::new(
                &route.path,
                &element.selector,
                &element.snapshot.label,
            ));
        } else {
            self.cache.put(key, outcome.clone());
        }

        self.restore(route, &outcome).await
    }

    async fn preverify(&self, element: &DiscoveredElement) -> Option<LinkVerdict> {
        let page_url = self.probe.current_url().await.ok()?;
        self.preverifier.verdict(element, &page_url).await
    }

    /// Put the page back into the route's expected state after a causal
    /// click: dismiss overlays, re-auth if the click signed us out, and
    /// return to the route.
    async fn restore(&self, route: &Route, outcome: &ActionOutcome) -> Result<(), ScanError> {
        if matches!(outcome, ActionOutcome::OpenModal) {
            let _ = self.probe.dismiss_overlays().await;
        }

        let expected = self.route_url(route)?;
        let current = self.probe.current_url().await?;

        if looks_deauthenticated(&current) {
            info!("Session appears de-authenticated, re-running bootstrap");
            if let Err(e) = self.bootstrap.ensure(self.mode, self.probe.as_ref()).await {
                warn!("Opportunistic re-auth failed: {}", e);
            }
        }

        if !Self::same_location(&current, expected.as_str())
            && self.probe.goto(expected.as_str()).await.is_err()
        {
            // One fresh load from scratch before giving up the route.
            self.probe
                .goto(expected.as_str())
                .await
                .map_err(|e| ScanError::RouteLoad(e.to_string()))?;
        }
        Ok(())
    }

    /// Same origin and path; query/fragment differences do not count as
    /// having left the route.
    fn same_location(current: &str, expected: &str) -> bool {
        match (Url::parse(current), Url::parse(expected)) {
            (Ok(a), Ok(b)) => a.origin() == b.origin() && a.path() == b.path(),
            _ => current == expected,
        }
    }
}

#[cfg(test)]
#[path = "traversal_tests.rs"]
mod tests;
