//! Enumerated, validated configuration consumed by the client,
//! the raw data collector and the state orchestrator.
//!
//! Loading this from a file or environment is explicitly out of scope
//! — a hosting binary builds one of these and passes it in. It derives
//! `serde` regardless, since a hosting CLI is a stated future consumer and
//! the struct needs to be easy to embed in whatever format that binary
//! picks.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    pub host: String,
    pub port: u16,

    pub page_load_timeout: Duration,
    pub action_timeout: Duration,
    pub dom_fetch_timeout: Duration,

    pub screenshot_format: ScreenshotFormat,
    pub screenshot_quality: u8,

    pub min_confidence: f32,

    pub user_data_dir: Option<PathBuf>,

    /// Bounded exponential backoff parameters for the WebSocket transport
    ///. Not named in the distilled spec's configuration enumeration
    /// but required by its own retry prose; see SPEC_FULL.md.
    pub connect_retry_limit: u32,
    pub connect_retry_base_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            host: "localhost".to_string(),
            port: 9222,
            page_load_timeout: Duration::from_secs(30),
            action_timeout: Duration::from_secs(10),
            dom_fetch_timeout: Duration::from_secs(30),
            screenshot_format: ScreenshotFormat::Jpeg,
            screenshot_quality: 80,
            min_confidence: 0.3,
            user_data_dir: None,
            connect_retry_limit: 5,
            connect_retry_base_delay_ms: 250,
        }
    }
}

impl BrowserConfig {
    pub fn debugger_url_endpoint(&self) -> String {
        format!("http://{}:{}/json/version", self.host, self.port)
    }

    pub fn debugger_list_endpoint(&self) -> String {
        format!("http://{}:{}/json", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_thresholds() {
        let cfg = BrowserConfig::default();
        assert!(cfg.min_confidence > 0.0 && cfg.min_confidence < 1.0);
        assert_eq!(cfg.screenshot_format, ScreenshotFormat::Jpeg);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = BrowserConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: BrowserConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.port, cfg.port);
    }
}

