//! Runtime route discovery: crawl one listing page for a representative
//! deep link and hand it back as a synthetic route.
//!
//! Static catalogs cannot name content-addressed detail pages (a specific
//! lesson, a specific article). This pre-pass finds one real instance so
//! the traversal covers a representative detail page too.

use tracing::{debug, info};
use url::Url;

use deadscan_core::{PageProbe, Route, RouteCatalog};

use crate::error::ScanError;

/// Where to look for a representative detail link.
#[derive(Debug, Clone)]
pub struct DiscoveryRule {
    /// Catalog id of the listing route to crawl.
    pub source_route_id: String,
    /// Same-origin path prefix a candidate link must match
    /// (e.g. "/lesson/").
    pub path_prefix: String,
    /// Id and label for the synthetic route.
    pub synthetic_id: String,
    pub synthetic_label: String,
}

/// Load the listing route and return the first matching deep link as a
/// synthetic [`Route`], or `None` when nothing matches.
pub async fn discover_route(
    probe: &dyn PageProbe,
    base_url: &Url,
    catalog: &RouteCatalog,
    rule: &DiscoveryRule,
) -> Result<Option<Route>, ScanError> {
    let Some(source) = catalog.find(&rule.source_route_id) else {
        debug!("Discovery source route {} not in catalog", rule.source_route_id);
        return Ok(None);
    };

    let listing_url = base_url
        .join(&source.path)
        .map_err(|e| ScanError::RouteLoad(format!("{}: {}", source.path, e)))?;
    probe
        .goto(listing_url.as_str())
        .await
        .map_err(|e| ScanError::RouteLoad(e.to_string()))?;

    for element in probe.visible_elements().await? {
        let Some(href) = element.snapshot.href.as_deref() else {
            continue;
        };
        let Ok(resolved) = listing_url.join(href) else {
            continue;
        };
        if resolved.origin() != base_url.origin() {
            continue;
        }
        if !resolved.path().starts_with(&rule.path_prefix) {
            continue;
        }

        let path = match resolved.query() {
            Some(query) => format!("{}?{}", resolved.path(), query),
            None => resolved.path().to_string(),
        };
        info!("Discovered representative route: {}", path);
        return Ok(Some(Route {
            id: rule.synthetic_id.clone(),
            label: rule.synthetic_label.clone(),
            path,
        }));
    }

    Ok(None)
}
