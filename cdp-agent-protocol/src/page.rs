//! `Page` domain: https://chromedevtools.github.io/devtools-protocol/tot/Page/

use std::borrow::Cow;

use cdp_agent_wire::{Command, Method};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub String);

impl From<String> for FrameId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: FrameId,
    #[serde(default)]
    pub parent_id: Option<FrameId>,
    pub url: String,
    #[serde(default)]
    pub security_origin: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnableParams {}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.enable".into()
    }
}

impl Command for EnableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigateParams {
    pub url: String,
}

impl NavigateParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Method for NavigateParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.navigate".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateReturns {
    pub frame_id: FrameId,
    #[serde(default)]
    pub error_text: Option<String>,
}

impl Command for NavigateParams {
    type Response = NavigateReturns;
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_cache: Option<bool>,
}

impl Method for ReloadParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.reload".into()
    }
}

impl Command for ReloadParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotParams {
    pub format: ScreenshotFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<Viewport>,
    pub capture_beyond_viewport: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Method for CaptureScreenshotParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.captureScreenshot".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureScreenshotReturns {
    /// Base64-encoded image bytes, exactly as the wire delivers them; the
    /// client decodes this once before returning raw bytes to its caller.
    pub data: String,
}

impl Command for CaptureScreenshotParams {
    type Response = CaptureScreenshotReturns;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetLayoutMetricsParams {}

impl Method for GetLayoutMetricsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.getLayoutMetrics".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutViewport {
    pub page_x: i64,
    pub page_y: i64,
    pub client_width: i64,
    pub client_height: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualViewport {
    pub client_width: f64,
    pub client_height: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLayoutMetricsReturns {
    pub css_layout_viewport: LayoutViewport,
    pub css_visual_viewport: VisualViewport,
}

impl Command for GetLayoutMetricsParams {
    type Response = GetLayoutMetricsReturns;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetNavigationHistoryParams {}

impl Method for GetNavigationHistoryParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.getNavigationHistory".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationEntry {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNavigationHistoryReturns {
    pub current_index: i64,
    pub entries: Vec<NavigationEntry>,
}

impl Command for GetNavigationHistoryParams {
    type Response = GetNavigationHistoryReturns;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateToHistoryEntryParams {
    pub entry_id: i64,
}

impl Method for NavigateToHistoryEntryParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.navigateToHistoryEntry".into()
    }
}

impl Command for NavigateToHistoryEntryParams {
    type Response = serde_json::Value;
}

// --- Events -----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameAttached {
    pub frame_id: FrameId,
    #[serde(default)]
    pub parent_frame_id: Option<FrameId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventFrameNavigated {
    pub frame: Frame,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameDetached {
    pub frame_id: FrameId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventLoadEventFired {
    #[serde(default)]
    pub timestamp: Option<f64>,
}
