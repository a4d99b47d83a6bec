//! Chrome process management and connection bootstrap.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::cdp::{CdpClient, CdpError};

/// Browser launch/connect configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Remote debugging port.
    pub debug_port: u16,
    pub headless: bool,
    /// Profile directory; a temp-dir default keeps runs isolated.
    pub profile_dir: Option<PathBuf>,
    /// Explicit Chrome binary, overriding auto-detection.
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            headless: true,
            profile_dir: None,
            chrome_path: None,
        }
    }
}

impl BrowserConfig {
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }

    fn resolved_profile_dir(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("deadscan-profile"))
    }
}

/// Browser-level errors: everything that can go wrong before a page session
/// exists.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No Chrome/Chromium binary found on this system.
    #[error("Chrome not found. Install Chrome or pass an explicit binary path")]
    ChromeNotFound,

    /// Chrome failed to start or become reachable.
    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error(transparent)]
    Cdp(#[from] CdpError),
}

/// A connected browser: the CDP client plus the Chrome process when this
/// run launched it.
pub struct Browser {
    config: BrowserConfig,
    client: Arc<CdpClient>,
    chrome_process: Option<Child>,
}

impl Browser {
    /// Find a Chrome executable on this system.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths = [
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths = [
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    async fn is_chrome_running(endpoint: &str) -> bool {
        reqwest::get(&format!("{}/json/version", endpoint)).await.is_ok()
    }

    /// Connect to Chrome on the configured port, launching it first when
    /// nothing is listening.
    pub async fn launch(config: BrowserConfig) -> Result<Self, BrowserError> {
        let endpoint = config.endpoint();
        let mut chrome_process = None;

        if !Self::is_chrome_running(&endpoint).await {
            info!(
                "Chrome not running on port {}, launching...",
                config.debug_port
            );
            let child = Self::spawn_chrome(&config)?;
            chrome_process = Some(child);

            let mut attempts = 0;
            let max_attempts = 30;
            while attempts < max_attempts {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                if Self::is_chrome_running(&endpoint).await {
                    break;
                }
                attempts += 1;
            }
            if attempts >= max_attempts {
                return Err(BrowserError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
        } else {
            info!("Chrome already running on port {}", config.debug_port);
        }

        let client = CdpClient::connect(&endpoint).await?;
        info!("Connected to Chrome at {}", endpoint);

        Ok(Self {
            config,
            client: Arc::new(client),
            chrome_process,
        })
    }

    fn spawn_chrome(config: &BrowserConfig) -> Result<Child, BrowserError> {
        let chrome_path = config
            .chrome_path
            .clone()
            .or_else(Self::find_chrome)
            .ok_or(BrowserError::ChromeNotFound)?;
        let profile_dir = config.resolved_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let mut cmd = Command::new(&chrome_path);
        cmd.arg(format!("--remote-debugging-port={}", config.debug_port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--metrics-recording-only")
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if config.headless {
            cmd.arg("--headless=new");
        }

        let child = cmd
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    pub fn client(&self) -> &Arc<CdpClient> {
        &self.client
    }

    pub fn endpoint(&self) -> String {
        self.config.endpoint()
    }

    /// Close the connection and kill Chrome if this run launched it.
    pub async fn shutdown(mut self) {
        if let Some(mut child) = self.chrome_process.take() {
            info!("Shutting down Chrome...");
            let _ = child.kill().await;
        }
    }
}
