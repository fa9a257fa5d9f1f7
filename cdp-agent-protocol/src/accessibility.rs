//! `Accessibility` domain: https://chromedevtools.github.io/devtools-protocol/tot/Accessibility/

use std::borrow::Cow;

use cdp_agent_wire::{Command, Method};
use serde::{Deserialize, Serialize};

use crate::dom::{BackendNodeId, NodeId};

#[derive(Debug, Clone, Deserialize)]
pub struct AxValue {
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

impl AxValue {
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(|v| v.as_str())
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_ref().and_then(|v| v.as_bool())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AxProperty {
    pub name: String,
    pub value: AxValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxNode {
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub role: Option<AxValue>,
    #[serde(default)]
    pub name: Option<AxValue>,
    #[serde(default)]
    pub properties: Vec<AxProperty>,
    #[serde(default)]
    pub backend_dom_node_id: Option<BackendNodeId>,
    #[serde(default)]
    pub dom_node_id: Option<NodeId>,
}

impl AxNode {
    pub fn role_str(&self) -> Option<&str> {
        self.role.as_ref().and_then(|v| v.as_str())
    }

    pub fn name_str(&self) -> Option<&str> {
        self.name.as_ref().and_then(|v| v.as_str())
    }

    pub fn is_focusable(&self) -> bool {
        self.properties
            .iter()
            .find(|p| p.name == "focusable")
            .and_then(|p| p.value.as_bool())
            .unwrap_or(false)
    }

    pub fn is_disabled(&self) -> bool {
        self.properties
            .iter()
            .find(|p| p.name == "disabled")
            .and_then(|p| p.value.as_bool())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFullAxTreeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
}

impl Method for GetFullAxTreeParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Accessibility.getFullAXTree".into()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetFullAxTreeReturns {
    pub nodes: Vec<AxNode>,
}

impl Command for GetFullAxTreeParams {
    type Response = GetFullAxTreeReturns;
}
