//! Live-Chrome integration tests.
//!
//! These require Chrome on the system and are ignored by default.
//! Run with: cargo test -p deadscan-browser --test integration_test -- --ignored

use std::sync::Arc;

use deadscan_browser::{Browser, BrowserConfig, CdpProbe};
use deadscan_core::PageProbe;

fn test_config() -> BrowserConfig {
    BrowserConfig {
        debug_port: 9333, // avoid conflicts with a developer's Chrome
        headless: true,
        profile_dir: Some(std::env::temp_dir().join("deadscan-test-profile")),
        chrome_path: None,
    }
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn chrome_detection() {
    let chrome_path = Browser::find_chrome();
    assert!(chrome_path.is_some(), "Chrome should be installed");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn probe_navigates_and_snapshots() {
    let browser = Browser::launch(test_config()).await.expect("launch");
    let probe = CdpProbe::open(Arc::clone(browser.client()))
        .await
        .expect("open probe");

    probe.goto("https://example.com").await.expect("navigate");
    let url = probe.current_url().await.expect("url");
    assert!(url.contains("example.com"));

    // example.com has exactly one link; discovery should surface it.
    let elements = probe.visible_elements().await.expect("elements");
    assert!(!elements.is_empty());
    assert!(elements.iter().any(|e| e.snapshot.tag_name == "a"));

    // Instrumented counters read back and grow with DOM edits.
    let before = probe.signals().await.expect("signals");
    probe
        .session()
        .evaluate("document.body.appendChild(document.createElement('div'))")
        .await
        .expect("mutate");
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let after = probe.signals().await.expect("signals");
    assert!(after.delta(&before).dom_mutations > 0);

    browser.shutdown().await;
}
