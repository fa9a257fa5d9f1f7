//! `DOMSnapshot` domain: https://chromedevtools.github.io/devtools-protocol/tot/DOMSnapshot/
//!
//! The real protocol response is a columnar, string-table-deduplicated
//! structure (`documents[].nodes.*` parallel arrays indexed by a shared
//! `strings` table). We keep that shape here, since it's what a real
//! `DOMSnapshot.captureSnapshot` call returns, and do the "join the columns
//! back into a per-node view" step in the merger (`merger::index`) rather
//! than here — this module only decodes the wire format.

use std::borrow::Cow;

use cdp_agent_wire::{Command, Method};
use serde::{Deserialize, Serialize};

use crate::dom::BackendNodeId;

/// Fixed set of computed style names requested on every capture. Order here
/// is the order `ComputedStyle.properties` indexes into.
pub const COMPUTED_STYLES: &[&str] = &[
    "cursor",
    "pointer-events",
    "visibility",
    "display",
    "opacity",
    "user-select",
    "z-index",
    "position",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshotParams {
    pub computed_styles: Vec<String>,
    pub include_paint_order: bool,
    pub include_dom_rects: bool,
}

impl Default for CaptureSnapshotParams {
    fn default() -> Self {
        Self {
            computed_styles: COMPUTED_STYLES.iter().map(|s| s.to_string()).collect(),
            include_paint_order: true,
            include_dom_rects: true,
        }
    }
}

impl Method for CaptureSnapshotParams {
    fn identifier(&self) -> Cow<'static, str> {
        "DOMSnapshot.captureSnapshot".into()
    }
}

/// One property value in a node's computed style array; `name` indexes into
/// `strings`, as does `value`.
#[derive(Debug, Clone, Deserialize)]
pub struct NameValue {
    pub name: i64,
    pub value: i64,
}

/// Parallel-array node table for one document, as returned by the protocol.
/// Index `i` into every field describes the same node.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTreeSnapshot {
    #[serde(default)]
    pub backend_node_id: Vec<BackendNodeId>,
    #[serde(default)]
    pub node_type: Vec<i64>,
    #[serde(default)]
    pub node_name: Vec<i64>,
    #[serde(default)]
    pub node_value: Vec<i64>,
    #[serde(default)]
    pub parent_index: Vec<i64>,
    #[serde(default)]
    pub attributes: Vec<Vec<i64>>,
    #[serde(default)]
    pub text_value: Option<RareStringData>,
    #[serde(default)]
    pub input_value: Option<RareStringData>,
    #[serde(default)]
    pub is_clickable: Option<RareBooleanData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RareStringData {
    #[serde(default)]
    pub index: Vec<i64>,
    #[serde(default)]
    pub value: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RareBooleanData {
    #[serde(default)]
    pub index: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTreeSnapshot {
    /// Index into the owning document's `NodeTreeSnapshot` arrays.
    #[serde(default)]
    pub node_index: Vec<i64>,
    #[serde(default)]
    pub styles: Vec<Vec<i64>>,
    #[serde(default)]
    pub bounds: Vec<[f64; 4]>,
    #[serde(default)]
    pub text: Vec<i64>,
    #[serde(default)]
    pub paint_order: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentSnapshot {
    pub nodes: NodeTreeSnapshot,
    pub layout: LayoutTreeSnapshot,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureSnapshotReturns {
    pub documents: Vec<DocumentSnapshot>,
    pub strings: Vec<String>,
}

impl Command for CaptureSnapshotParams {
    type Response = CaptureSnapshotReturns;
}
