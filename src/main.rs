//! deadscan - autonomous UI interaction auditor.
//!
//! Crawls a deployed application's routes over the Chrome DevTools
//! Protocol, triggers every visible interactive control, and fails the run
//! when any of them turns out to be a dead click.

mod cli;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use deadscan_browser::{Browser, BrowserConfig, CdpProbe};
use deadscan_core::{RouteCatalog, RunReport, ScanConfig, ScanMode};
use deadscan_scanner::{discover_route, DiscoveryRule, NoopBootstrap, RouteTraversal};

use cli::{Cli, Commands, ScanArgs};

/// Initialize tracing with console output. `DEADSCAN_LOG` overrides the
/// filter; `--verbose` raises the default to debug for the audit crates.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,deadscan=debug,deadscan_scanner=debug,deadscan_browser=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_env("DEADSCAN_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(args).await,
        Commands::Routes { catalog } => print_routes(&catalog),
    }
}

async fn run_scan(args: ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ScanConfig::from_env();
    if let Some(n) = args.max_routes {
        config.max_routes = n;
    }
    if let Some(n) = args.max_elements {
        config.max_elements_per_route = n;
    }
    if args.verbose {
        config.verbose = true;
    }

    init_tracing(config.verbose);
    info!("Starting deadscan v{}", env!("CARGO_PKG_VERSION"));

    let mode: ScanMode = args.mode.parse()?;
    let base_url = Url::parse(&args.base_url)?;

    let mut catalog = load_catalog(&args.catalog)?;
    info!(
        "Loaded {} routes from {}",
        catalog.len(),
        args.catalog.display()
    );

    let browser = Browser::launch(BrowserConfig {
        debug_port: args.chrome_port,
        headless: !args.headed,
        ..BrowserConfig::default()
    })
    .await?;
    let probe = Arc::new(CdpProbe::open(Arc::clone(browser.client())).await?);

    if let (Some(from), Some(prefix)) = (&args.discover_from, &args.discover_prefix) {
        let rule = DiscoveryRule {
            source_route_id: from.clone(),
            path_prefix: prefix.clone(),
            synthetic_id: "discovered-detail".into(),
            synthetic_label: "Discovered detail page".into(),
        };
        match discover_route(probe.as_ref(), &base_url, &catalog, &rule).await {
            Ok(Some(found)) => {
                info!("Appending discovered route {}", found.path);
                catalog.push_discovered(found);
            }
            Ok(None) => warn!("Discovery found no matching deep link"),
            Err(e) => warn!("Route discovery failed: {}", e),
        }
    }

    let traversal = RouteTraversal::new(
        probe,
        base_url,
        mode,
        config,
        Arc::new(NoopBootstrap),
    );
    let report = traversal.run(&catalog).await?;

    // The report is always written, even for a failing run, so failures
    // stay diagnosable without a re-run.
    write_report(&report, &args.output)?;
    info!("Report written to {}", args.output.display());
    info!(
        "Routes: {}  Interactions: {}  Dead clicks: {}  Route errors: {}",
        report.total_routes,
        report.total_interactions,
        report.dead_click_count,
        report.route_error_count
    );

    browser.shutdown().await;

    report.ensure_clean()?;
    info!("Audit clean");
    Ok(())
}

fn load_catalog(path: &Path) -> Result<RouteCatalog, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(RouteCatalog::from_json(&json)?)
}

fn write_report(report: &RunReport, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn print_routes(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load_catalog(path)?;
    println!("{:<20} {:<30} {}", "ID", "LABEL", "PATH");
    println!("{}", "-".repeat(70));
    for route in catalog.routes() {
        println!("{:<20} {:<30} {}", route.id, route.label, route.path);
    }
    Ok(())
}
