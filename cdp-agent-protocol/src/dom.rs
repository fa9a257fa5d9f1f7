//! `DOM` domain: https://chromedevtools.github.io/devtools-protocol/tot/DOM/

use std::borrow::Cow;
use std::collections::HashMap;

use cdp_agent_wire::{Command, Method};
use serde::{Deserialize, Serialize};

use crate::runtime::RemoteObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendNodeId(pub i64);

/// A single node in the DOM tree returned by `DOM.getDocument`. The tree is
/// flattened by the merger's iterative walk rather than recursed into here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: NodeId,
    pub backend_node_id: BackendNodeId,
    pub node_type: i64,
    pub node_name: String,
    #[serde(default)]
    pub node_value: String,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub attributes: Option<Vec<String>>,
    #[serde(default)]
    pub frame_id: Option<String>,
    #[serde(default)]
    pub content_document: Option<Box<Node>>,
    #[serde(default)]
    pub shadow_roots: Vec<Node>,
}

impl Node {
    /// `DOM.getDocument` returns `attributes` as a flat `[name, value, name,
    /// value, ...]` array; this turns that into a map the merger can index.
    pub fn attribute_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(attrs) = &self.attributes {
            let mut iter = attrs.iter();
            while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
                map.insert(name.clone(), value.clone());
            }
        }
        map
    }

    pub fn is_element(&self) -> bool {
        self.node_type == 1
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetDocumentParams {
    pub depth: Option<i64>,
    pub pierce: bool,
}

impl Method for GetDocumentParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.getDocument".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetDocumentReturns {
    pub root: Node,
}

impl Command for GetDocumentParams {
    type Response = GetDocumentReturns;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeNodeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_node_id: Option<BackendNodeId>,
    pub depth: i64,
}

impl Method for DescribeNodeParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.describeNode".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DescribeNodeReturns {
    pub node: Node,
}

impl Command for DescribeNodeParams {
    type Response = DescribeNodeReturns;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveNodeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_node_id: Option<BackendNodeId>,
}

impl Method for ResolveNodeParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.resolveNode".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedObject {
    pub object_id: Option<RemoteObjectId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveNodeReturns {
    pub object: ResolvedObject,
}

impl Command for ResolveNodeParams {
    type Response = ResolveNodeReturns;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollIntoViewIfNeededParams {
    pub backend_node_id: BackendNodeId,
}

impl Method for ScrollIntoViewIfNeededParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.scrollIntoViewIfNeeded".into()
    }
}

impl Command for ScrollIntoViewIfNeededParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusParams {
    pub backend_node_id: BackendNodeId,
}

impl Method for FocusParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.focus".into()
    }
}

impl Command for FocusParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBoxModelParams {
    pub backend_node_id: BackendNodeId,
}

impl Method for GetBoxModelParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOM.getBoxModel".into()
    }
}

/// Quad as 8 numbers: `[x1, y1, x2, y2, x3, y3, x4, y4]`, device pixels.
pub type Quad = Vec<f64>;

#[derive(Debug, Clone, Deserialize)]
pub struct BoxModel {
    pub content: Quad,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetBoxModelReturns {
    pub model: BoxModel,
}

impl Command for GetBoxModelParams {
    type Response = GetBoxModelReturns;
}

impl BoxModel {
    /// The center point of the content quad, in device pixels.
    pub fn center(&self) -> (f64, f64) {
        if self.content.len() < 8 {
            return (0.0, 0.0);
        }
        let xs = [self.content[0], self.content[2], self.content[4], self.content[6]];
        let ys = [self.content[1], self.content[3], self.content[5], self.content[7]];
        let cx = xs.iter().sum::<f64>() / 4.0;
        let cy = ys.iter().sum::<f64>() / 4.0;
        (cx, cy)
    }
}
