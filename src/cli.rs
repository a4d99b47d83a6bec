//! CLI definitions for deadscan.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// deadscan CLI.
#[derive(Parser)]
#[command(name = "deadscan")]
#[command(about = "Autonomous UI interaction auditor")]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Scan every catalog route for dead clicks and write the run report
    Scan(ScanArgs),

    /// Print the resolved route catalog and exit
    Routes {
        /// Path to the route catalog JSON
        #[arg(long)]
        catalog: PathBuf,
    },
}

#[derive(Args)]
pub(crate) struct ScanArgs {
    /// Base URL of the deployed application under audit
    #[arg(long)]
    pub base_url: String,

    /// Path to the route catalog JSON (ordered array of {id, label, path})
    #[arg(long)]
    pub catalog: PathBuf,

    /// Session mode to audit (signed-out or signed-in)
    #[arg(long, default_value = "signed-out")]
    pub mode: String,

    /// Report output path
    #[arg(long, default_value = "deadscan-report.json")]
    pub output: PathBuf,

    /// Maximum routes to scan
    #[arg(long)]
    pub max_routes: Option<usize>,

    /// Maximum elements classified per route
    #[arg(long)]
    pub max_elements: Option<usize>,

    /// Chrome remote-debugging port
    #[arg(long, default_value_t = 9222)]
    pub chrome_port: u16,

    /// Run Chrome with a visible window
    #[arg(long)]
    pub headed: bool,

    /// Crawl this catalog route for a representative deep link before
    /// scanning
    #[arg(long)]
    pub discover_from: Option<String>,

    /// Same-origin path prefix the discovered link must match
    #[arg(long, requires = "discover_from")]
    pub discover_prefix: Option<String>,

    /// Verbose logging
    #[arg(long)]
    pub verbose: bool,
}
