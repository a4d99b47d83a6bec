//! Route catalog input.

use serde::{Deserialize, Serialize};

/// A navigable location in the application under audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub label: String,
    pub path: String,
}

/// Ordered list of routes for one traversal pass.
///
/// Read-only input apart from [`RouteCatalog::push_discovered`], which
/// appends synthetic routes found at runtime (e.g. a representative detail
/// page crawled off a listing route).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteCatalog {
    routes: Vec<Route>,
}

impl RouteCatalog {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Parse a catalog from its JSON form: an ordered array of
    /// `{ id, label, path }` objects.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append a runtime-discovered route, skipping paths already present.
    pub fn push_discovered(&mut self, route: Route) {
        if !self.routes.iter().any(|r| r.path == route.path) {
            self.routes.push(route);
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn find(&self, id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_json() {
        let json = r#"[
            {"id": "home", "label": "Home", "path": "/"},
            {"id": "practice", "label": "Practice", "path": "/practice"}
        ]"#;
        let catalog = RouteCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.routes()[1].path, "/practice");
    }

    #[test]
    fn push_discovered_skips_known_paths() {
        let mut catalog = RouteCatalog::new(vec![Route {
            id: "home".into(),
            label: "Home".into(),
            path: "/".into(),
        }]);
        catalog.push_discovered(Route {
            id: "lesson".into(),
            label: "Lesson".into(),
            path: "/lesson/1".into(),
        });
        catalog.push_discovered(Route {
            id: "lesson-again".into(),
            label: "Lesson".into(),
            path: "/lesson/1".into(),
        });
        assert_eq!(catalog.len(), 2);
    }
}
