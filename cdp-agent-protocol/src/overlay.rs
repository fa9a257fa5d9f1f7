//! `Overlay` domain (the small slice this client needs):
//! https://chromedevtools.github.io/devtools-protocol/tot/Overlay/

use std::borrow::Cow;

use cdp_agent_wire::{Command, Method};
use serde::Serialize;

use crate::dom::BackendNodeId;

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnableParams {}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Overlay.enable".into()
    }
}

impl Command for EnableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DisableParams {}

impl Method for DisableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Overlay.disable".into()
    }
}

impl Command for DisableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightConfig {
    pub content_color: RgbaColor,
    pub border_color: RgbaColor,
}

#[derive(Debug, Clone, Serialize)]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            content_color: RgbaColor { r: 111, g: 168, b: 220, a: 0.3 },
            border_color: RgbaColor { r: 34, g: 98, b: 168, a: 0.8 },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightNodeParams {
    pub backend_node_id: BackendNodeId,
    pub highlight_config: HighlightConfig,
}

impl HighlightNodeParams {
    pub fn new(backend_node_id: BackendNodeId) -> Self {
        Self {
            backend_node_id,
            highlight_config: HighlightConfig::default(),
        }
    }
}

impl Method for HighlightNodeParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Overlay.highlightNode".into()
    }
}

impl Command for HighlightNodeParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HideHighlightParams {}

impl Method for HideHighlightParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Overlay.hideHighlight".into()
    }
}

impl Command for HideHighlightParams {
    type Response = serde_json::Value;
}
