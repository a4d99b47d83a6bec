use std::sync::Arc;

use super::*;
use deadscan_core::Route;

use crate::bootstrap::NoopBootstrap;
use crate::testutil::{anonymous_button, grouped_button, FakeProbe};

const BASE: &str = "https://app.test";

fn route(id: &str, path: &str) -> Route {
    Route {
        id: id.into(),
        label: id.into(),
        path: path.into(),
    }
}

fn traversal(probe: Arc<FakeProbe>, config: ScanConfig) -> RouteTraversal {
    RouteTraversal::new(
        probe,
        Url::parse(BASE).unwrap(),
        ScanMode::SignedOut,
        config,
        Arc::new(NoopBootstrap),
    )
}

#[tokio::test(start_paused = true)]
async fn shared_control_is_verified_once_across_routes() {
    // The same "Start" control (same scan group) appears on two routes and
    // navigates to a session URL. The second route must answer from the
    // cache with no second real click.
    let probe = Arc::new(FakeProbe::with_effect(BASE, |state, selector| {
        if selector == "[data-scan-group=\"start-practice\"]" {
            state.url = "https://app.test/practice/session?id=1".into();
        }
    }));
    let start = grouped_button("[data-scan-group=\"start-practice\"]", "start-practice", "Start");
    probe.add_element("https://app.test/practice", start.clone());
    probe.add_element("https://app.test/library", start);

    let catalog = RouteCatalog::new(vec![
        route("practice", "/practice"),
        route("library", "/library"),
    ]);
    let report = traversal(probe.clone(), ScanConfig::default())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(probe.state.lock().activations.len(), 1, "one real click");
    assert_eq!(report.total_interactions, 2);

    let first = &report.interactions[0];
    assert_eq!(first.action, "navigate");
    assert_eq!(first.outcome, "pass");
    assert!(first
        .navigation_to
        .as_deref()
        .unwrap()
        .starts_with("https://app.test/practice/session"));
    assert!(!first.reused);

    let second = &report.interactions[1];
    assert_eq!(second.route, "/library");
    assert_eq!(second.outcome, "pass");
    assert!(second.reused);

    assert!(report.ensure_clean().is_ok());
}

#[tokio::test(start_paused = true)]
async fn navigation_outcome_restores_the_route() {
    let probe = Arc::new(FakeProbe::with_effect(BASE, |state, _| {
        state.url = "https://app.test/elsewhere".into();
    }));
    probe.add_element(
        "https://app.test/practice",
        grouped_button("#go", "go", "Go"),
    );

    let catalog = RouteCatalog::new(vec![route("practice", "/practice")]);
    let report = traversal(probe.clone(), ScanConfig::default())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(report.dead_click_count, 0);
    // Load, then return after the causal click.
    let gotos = probe.state.lock().gotos.clone();
    assert_eq!(
        gotos,
        vec![
            "https://app.test/practice".to_string(),
            "https://app.test/practice".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn decorative_button_is_reported_dead_with_repro() {
    let probe = Arc::new(FakeProbe::new(BASE));
    probe.add_element(
        "https://app.test/about",
        anonymous_button("#decor", "Decorative"),
    );

    let catalog = RouteCatalog::new(vec![route("about", "/about")]);
    let report = traversal(probe.clone(), ScanConfig::default())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(report.dead_click_count, 1);
    let dead = &report.dead_clicks[0];
    assert_eq!(dead.route, "/about");
    assert_eq!(dead.selector, "#decor");
    assert_eq!(dead.repro.len(), 3);
    assert!(dead.repro[0].contains("/about"));
    assert!(dead.repro[2].starts_with("Observe"));

    // Identifier-less control also surfaces in the companion scan.
    assert_eq!(report.missing_identifiers.len(), 1);
    assert_eq!(report.missing_identifiers[0].selector, "#decor");

    assert!(report.ensure_clean().is_err());
}

#[tokio::test(start_paused = true)]
async fn route_load_failure_does_not_stop_the_run() {
    let probe = Arc::new(FakeProbe::with_effect(BASE, |state, _| {
        state.signals.dom_mutations += 50;
    }));
    probe
        .state
        .lock()
        .failing_urls
        .insert("https://app.test/broken".into());
    probe.add_element(
        "https://app.test/home",
        grouped_button("#a", "a", "A"),
    );
    probe.add_element(
        "https://app.test/news",
        grouped_button("#b", "b", "B"),
    );

    let catalog = RouteCatalog::new(vec![
        route("home", "/home"),
        route("broken", "/broken"),
        route("news", "/news"),
    ]);
    let report = traversal(probe.clone(), ScanConfig::default())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(report.total_routes, 3);
    assert_eq!(report.route_error_count, 1);
    assert_eq!(report.route_errors[0].route, "/broken");
    // Routes after the failure were still scanned.
    assert_eq!(report.total_interactions, 2);
    assert!(report
        .interactions
        .iter()
        .any(|record| record.route == "/news"));
    // A load failure is a route error, never a dead click.
    assert_eq!(report.dead_click_count, 0);
    // Coverage summaries exist for every route, including the failed one.
    assert_eq!(report.routes.len(), 3);
    assert_eq!(report.routes[1].interactions, 0);
}

#[tokio::test(start_paused = true)]
async fn per_route_safety_limit_bounds_classification() {
    let probe = Arc::new(FakeProbe::new(BASE));
    for i in 0..10 {
        probe.add_element(
            "https://app.test/feed",
            anonymous_button(&format!("#item-{i}"), &format!("Item {i}")),
        );
    }

    let config = ScanConfig {
        max_elements_per_route: 3,
        ..ScanConfig::default()
    };
    let catalog = RouteCatalog::new(vec![route("feed", "/feed")]);
    let report = traversal(probe.clone(), config).run(&catalog).await.unwrap();

    assert_eq!(report.total_interactions, 3);
    assert_eq!(probe.state.lock().activations.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn max_routes_caps_the_traversal() {
    let probe = Arc::new(FakeProbe::new(BASE));
    let config = ScanConfig {
        max_routes: 1,
        ..ScanConfig::default()
    };
    let catalog = RouteCatalog::new(vec![route("a", "/a"), route("b", "/b")]);
    let report = traversal(probe.clone(), config).run(&catalog).await.unwrap();

    assert_eq!(report.total_routes, 1);
    assert_eq!(report.routes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn disabled_element_records_without_click() {
    let probe = Arc::new(FakeProbe::new(BASE));
    let mut locked = grouped_button("#locked", "locked", "Locked");
    locked.snapshot.disabled = true;
    locked.disabled_reason = Some("disabled attribute".into());
    probe.add_element("https://app.test/settings", locked);

    let catalog = RouteCatalog::new(vec![route("settings", "/settings")]);
    let report = traversal(probe.clone(), ScanConfig::default())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(report.total_interactions, 1);
    assert_eq!(report.interactions[0].action, "disabled");
    assert_eq!(report.interactions[0].outcome, "pass");
    assert!(probe.state.lock().activations.is_empty());
    assert!(report.ensure_clean().is_ok());
}

#[tokio::test(start_paused = true)]
async fn modal_outcome_is_dismissed_during_restore() {
    let probe = Arc::new(FakeProbe::with_effect(BASE, |state, _| {
        state.overlay.open_dialogs += 1;
    }));
    probe.add_element(
        "https://app.test/reader",
        grouped_button("#font", "font-menu", "Font"),
    );

    let catalog = RouteCatalog::new(vec![route("reader", "/reader")]);
    let report = traversal(probe.clone(), ScanConfig::default())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(report.interactions[0].action, "open-modal");
    let state = probe.state.lock();
    assert_eq!(state.dismissals, 1);
    assert_eq!(state.overlay.open_dialogs, 0);
}

#[tokio::test]
async fn link_pre_check_never_navigates_or_clicks() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lessons"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let home = format!("{}/home", server.uri());
    let probe = Arc::new(FakeProbe::new(&server.uri()));
    probe.add_element(&home, crate::testutil::anchor("#lessons", "/lessons", "Lessons"));
    probe.add_element(&home, crate::testutil::anchor("#gone", "/gone", "Old link"));

    let catalog = RouteCatalog::new(vec![route("home", "/home")]);
    let report = RouteTraversal::new(
        probe.clone(),
        Url::parse(&server.uri()).unwrap(),
        ScanMode::SignedOut,
        ScanConfig::default(),
        Arc::new(NoopBootstrap),
    )
    .run(&catalog)
    .await
    .unwrap();

    // Both anchors were answered out of band: no click, no navigation
    // beyond the initial route load.
    let state = probe.state.lock();
    assert!(state.activations.is_empty());
    assert_eq!(state.gotos, vec![home.clone()]);
    assert_eq!(state.url, home);
    drop(state);

    assert_eq!(report.total_interactions, 2);
    let healthy = &report.interactions[0];
    assert_eq!(healthy.action, "navigate");
    assert_eq!(healthy.outcome, "pass");
    assert_eq!(
        healthy.navigation_to.as_deref(),
        Some(format!("{}/lessons", server.uri()).as_str())
    );

    assert_eq!(report.dead_click_count, 1);
    assert!(report.dead_clicks[0].repro[2].contains("404"));
}

#[tokio::test(start_paused = true)]
async fn each_element_is_classified_once_per_route() {
    // A toggle that mutates its own attrs on every click: without the
    // visited set it would be re-discovered and re-clicked forever.
    let probe = Arc::new(FakeProbe::with_effect(BASE, |state, selector| {
        if let Some(attrs) = state.states.get_mut(selector) {
            let on = attrs.pressed.as_deref() == Some("true");
            attrs.pressed = Some(if on { "false" } else { "true" }.to_string());
        }
    }));
    probe.add_element(
        "https://app.test/player",
        grouped_button("#mute", "mute", "Mute"),
    );

    let catalog = RouteCatalog::new(vec![route("player", "/player")]);
    let report = traversal(probe.clone(), ScanConfig::default())
        .run(&catalog)
        .await
        .unwrap();

    assert_eq!(report.total_interactions, 1);
    assert_eq!(report.interactions[0].action, "toggle");
    assert_eq!(probe.state.lock().activations.len(), 1);
}
