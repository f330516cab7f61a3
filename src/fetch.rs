//! Two-strategy page fetching.
//!
//! The cheap path is a plain HTTP GET with a realistic, rotated header set.
//! Many product pages render reviews client-side or refuse naive clients,
//! so any failure escalates to a full browser render (Playwright via a Node
//! subprocess). The browser session lives and dies with that subprocess,
//! and the render script closes the browser in a `finally` block, so the
//! session is released on every exit path. If both strategies fail the URL
//! is unreachable for this call.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use ureq::ResponseExt;

use crate::error::{Result, ScrapeError};

/// HTTP fast-path timeout in seconds
const HTTP_TIMEOUT_SECS: u64 = 15;

/// Browser navigation timeout in milliseconds
const BROWSER_NAV_TIMEOUT_MS: u64 = 30_000;

/// Settle delay range after DOM-ready, in milliseconds. Gives client-side
/// review widgets time to populate before the markup is captured.
const SETTLE_DELAY_MS: (u64, u64) = (3_000, 6_000);

/// Rotated user-agent pool for the HTTP fast path
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36 Edg/119.0.0.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0",
];

/// Shared HTTP agent for connection pooling
static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
        .build()
        .into()
});

/// A fetched, rendered document
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Final URL after redirects
    pub url: String,
    /// Raw (or browser-rendered) HTML
    pub html: String,
}

/// Page fetching seam. The adapter and orchestrator take this as a trait so
/// pagination and escalation behavior are testable without a network.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<PageContent>;
}

/// HTTP fast path with browser-render escalation
#[derive(Debug, Default)]
pub struct DefaultFetcher;

impl Fetcher for DefaultFetcher {
    fn fetch(&self, url: &str) -> Result<PageContent> {
        fetch_with_escalation(url, fetch_http, fetch_browser)
    }
}

/// Try the fast path; any failure escalates to the fallback. A fallback
/// failure surfaces as the URL being unreachable, not as the underlying
/// transport error.
fn fetch_with_escalation(
    url: &str,
    primary: impl Fn(&str) -> Result<PageContent>,
    fallback: impl Fn(&str) -> Result<PageContent>,
) -> Result<PageContent> {
    match primary(url) {
        Ok(content) => Ok(content),
        Err(e) => {
            eprintln!("  HTTP fetch failed ({}), escalating to browser render...", e);
            fallback(url).map_err(|_| ScrapeError::FetchUnreachable(url.to_string()))
        }
    }
}

/// Lightweight HTTP GET with a randomized realistic header set
pub fn fetch_http(url: &str) -> Result<PageContent> {
    let user_agent = USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0]);

    let response = HTTP_AGENT
        .get(url)
        .header("User-Agent", user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.5")
        .header("Connection", "keep-alive")
        .header("Upgrade-Insecure-Requests", "1")
        .call()?;

    let final_url = response.get_uri().to_string();
    let html = response.into_body().read_to_string()?;

    Ok(PageContent {
        url: final_url,
        html,
    })
}

/// Full browser render (Playwright via Node subprocess): navigate, wait for
/// DOM-ready, settle for a randomized delay, capture the markup.
pub fn fetch_browser(url: &str) -> Result<PageContent> {
    let script_path = render_script_path()?;
    if !script_path.exists() {
        ensure_render_script()?;
    }

    let settle_ms = rand::thread_rng().gen_range(SETTLE_DELAY_MS.0..=SETTLE_DELAY_MS.1);

    // Run from the data directory so Node can find a local node_modules
    let output = Command::new("node")
        .arg(&script_path)
        .arg(url)
        .arg(BROWSER_NAV_TIMEOUT_MS.to_string())
        .arg(settle_ms.to_string())
        .current_dir(data_dir()?)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // The script reports failures as JSON on stderr when it can
        if let Ok(err) = serde_json::from_str::<serde_json::Value>(&stderr) {
            let msg = err["error"].as_str().unwrap_or("unknown error");
            return Err(ScrapeError::BrowserError(msg.to_string()));
        }
        return Err(ScrapeError::BrowserError(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let result: serde_json::Value = serde_json::from_str(&stdout)?;

    Ok(PageContent {
        url: result["url"].as_str().unwrap_or(url).to_string(),
        html: result["html"].as_str().unwrap_or("").to_string(),
    })
}

fn data_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("", "", "reviewlens")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ScrapeError::ConfigError("could not find data directory".into()))
}

fn render_script_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("render.mjs"))
}

/// Materialize the bundled render script into the data directory
pub fn ensure_render_script() -> Result<()> {
    let script_path = render_script_path()?;
    if let Some(parent) = script_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&script_path, include_str!("../assets/render.mjs"))?;
    Ok(())
}

/// Status of the browser-render runtime
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserStatus {
    Ready,
    NodeMissing,
    PlaywrightMissing,
    BrowserMissing,
}

impl BrowserStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, BrowserStatus::Ready)
    }

    pub fn install_instructions(&self) -> &'static str {
        match self {
            BrowserStatus::Ready => "Browser runtime is ready",
            BrowserStatus::NodeMissing => "Install Node.js: https://nodejs.org/",
            BrowserStatus::PlaywrightMissing => "Run: npm install -g playwright",
            BrowserStatus::BrowserMissing => "Run: npx playwright install chromium",
        }
    }
}

/// Check whether escalated fetches can work on this machine
pub fn check_browser_runtime() -> BrowserStatus {
    let node_available = Command::new("node")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !node_available {
        return BrowserStatus::NodeMissing;
    }

    let playwright_available = Command::new("npx")
        .args(["playwright", "--version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    if !playwright_available {
        return BrowserStatus::PlaywrightMissing;
    }

    let home = std::env::var("HOME").unwrap_or_default();
    let browser_caches = [
        format!("{}/.cache/ms-playwright", home),
        format!("{}/Library/Caches/ms-playwright", home),
    ];
    for path in browser_caches {
        if std::path::Path::new(&path).exists() {
            return BrowserStatus::Ready;
        }
    }

    BrowserStatus::BrowserMissing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_recovers_from_primary_failure() {
        let result = fetch_with_escalation(
            "https://example.com/p/1",
            |url| Err(ScrapeError::FetchUnreachable(url.to_string())),
            |url| {
                Ok(PageContent {
                    url: url.to_string(),
                    html: "<html>rendered</html>".to_string(),
                })
            },
        );
        // The escalated document comes back with no error surfaced
        assert_eq!(result.unwrap().html, "<html>rendered</html>");
    }

    #[test]
    fn test_both_strategies_failing_is_unreachable() {
        let err = fetch_with_escalation(
            "https://example.com/p/1",
            |url| Err(ScrapeError::FetchUnreachable(url.to_string())),
            |_| Err(ScrapeError::BrowserError("launch failed".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, ScrapeError::FetchUnreachable(_)));
    }

    #[test]
    fn test_browser_status() {
        let status = BrowserStatus::BrowserMissing;
        assert!(!status.is_ready());
        assert!(status.install_instructions().contains("npx playwright"));
    }

    #[test]
    fn test_user_agent_pool_is_realistic() {
        assert!(USER_AGENTS.len() >= 3);
        assert!(USER_AGENTS.iter().all(|ua| ua.starts_with("Mozilla/5.0")));
    }

    #[test]
    fn test_settle_delay_range() {
        for _ in 0..20 {
            let ms = rand::thread_rng().gen_range(SETTLE_DELAY_MS.0..=SETTLE_DELAY_MS.1);
            assert!((3_000..=6_000).contains(&ms));
        }
    }
}
