//! The multi-source merger — the heart of the core. Joins the DOM
//! tree, the DOMSnapshot columnar layout/style table and the accessibility
//! tree by `backend_node_id` into a ranked list of [`EnhancedNode`]s plus a
//! sibling [`SelectorMap`].
//!
//! Pure: same [`RawSnapshot`] in, same `(Vec<EnhancedNode>, SelectorMap)`
//! out. No transport, no session, no clock — only owned data in, owned
//! data out, which is what makes this trivially unit-testable with
//! synthetic fixtures.

use std::collections::HashMap;

use fnv::FnvHashMap;

use cdp_agent_protocol::dom::{BackendNodeId, Node};
use cdp_agent_protocol::target::SessionId;

use crate::collector::RawSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Area of the overlap between two rects, 0 if they don't intersect.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        (right - left).max(0.0) * (bottom - top).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Click,
    Input,
    Select,
    Toggle,
}

#[derive(Debug, Clone)]
pub struct EnhancedNode {
    pub backend_node_id: BackendNodeId,
    pub tag_name: String,
    pub attributes: HashMap<String, String>,
    pub text_content: String,
    pub bounds_css: Rect,
    pub click_point: (f64, f64),
    pub ax_role: Option<String>,
    pub ax_name: Option<String>,
    pub ax_focusable: bool,
    pub is_visible: bool,
    pub is_interactive: bool,
    pub is_clickable: bool,
    pub is_occluded: bool,
    pub action_type: ActionType,
    pub confidence: f32,
}

/// What the selector map stores per LLM-facing index. `session_id` is
/// carried as opaque data supplied by the orchestrator — the merger itself
/// never looks at it, it just needs somewhere to live so an action by
/// index can be routed back to the right session.
#[derive(Debug, Clone)]
pub struct SelectorEntry {
    pub backend_node_id: BackendNodeId,
    pub session_id: SessionId,
    pub bounds_css: Rect,
    pub click_point: (f64, f64),
    pub action_type: ActionType,
    pub tag: String,
    pub label: String,
}

/// 1-based index → [`SelectorEntry`]. Indices do not survive across
/// observations.
#[derive(Debug, Clone, Default)]
pub struct SelectorMap {
    entries: Vec<SelectorEntry>,
}

impl SelectorMap {
    /// Builds a map from already-ranked entries, e.g. the concatenation of
    /// several per-frame merges. Indices are assigned by position, 1-based.
    pub fn from_entries(entries: Vec<SelectorEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<&SelectorEntry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Consumes the map, handing back its entries in rank order — used by
    /// the orchestrator to concatenate several per-frame merges
    /// into one combined map before re-indexing.
    pub fn into_entries(self) -> Vec<SelectorEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SelectorEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

/// Joined per-node data from one `DOMSnapshot.captureSnapshot` document
///, keyed by backend node id.
struct SnapshotEntry {
    bounds_device: Rect,
    styles: HashMap<&'static str, String>,
    paint_order: i64,
    #[allow(dead_code)]
    text: Option<String>,
}

fn build_snapshot_index(
    snapshot: &cdp_agent_protocol::dom_snapshot::CaptureSnapshotReturns,
) -> FnvHashMap<BackendNodeId, SnapshotEntry> {
    use cdp_agent_protocol::dom_snapshot::COMPUTED_STYLES;

    let mut index = FnvHashMap::default();
    let strings = &snapshot.strings;
    let string_at = |i: i64| -> Option<String> {
        usize::try_from(i).ok().and_then(|i| strings.get(i)).cloned()
    };

    for doc in &snapshot.documents {
        for (layout_i, &node_i) in doc.layout.node_index.iter().enumerate() {
            let Some(backend_node_id) = usize::try_from(node_i)
                .ok()
                .and_then(|i| doc.nodes.backend_node_id.get(i))
                .copied()
            else {
                continue;
            };

            let bounds = doc.layout.bounds.get(layout_i).copied().unwrap_or([0.0; 4]);
            let bounds_device = Rect {
                x: bounds[0],
                y: bounds[1],
                width: bounds[2],
                height: bounds[3],
            };

            let mut styles = HashMap::new();
            if let Some(style_row) = doc.layout.styles.get(layout_i) {
                for (name, &value_idx) in COMPUTED_STYLES.iter().zip(style_row.iter()) {
                    if let Some(value) = string_at(value_idx) {
                        styles.insert(*name, value);
                    }
                }
            }

            let paint_order = doc.layout.paint_order.get(layout_i).copied().unwrap_or(0);
            let text = doc
                .layout
                .text
                .get(layout_i)
                .copied()
                .and_then(|i| string_at(i));

            index.insert(
                backend_node_id,
                SnapshotEntry {
                    bounds_device,
                    styles,
                    paint_order,
                    text,
                },
            );
        }
    }
    index
}

struct AxEntry {
    role: Option<String>,
    name: Option<String>,
    focusable: bool,
    disabled: bool,
}

fn build_ax_index(ax_nodes: &[cdp_agent_protocol::accessibility::AxNode]) -> FnvHashMap<BackendNodeId, AxEntry> {
    ax_nodes
        .iter()
        .filter(|n| !n.ignored)
        .filter_map(|n| {
            let backend_node_id = n.backend_dom_node_id?;
            Some((
                    backend_node_id,
                    AxEntry {
                        role: n.role_str().map(str::to_string),
                        name: n.name_str().map(str::to_string),
                        focusable: n.is_focusable(),
                        disabled: n.is_disabled(),
                    },
            ))
    })
        .collect()
}

const DEFINITELY_INTERACTIVE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea", "details", "summary"];
const DEFINITELY_INTERACTIVE_ROLES: &[&str] =
&["button", "link", "textbox", "combobox", "checkbox", "menuitem", "tab", "switch"];
const TEXT_INPUT_TYPES: &[&str] = &[
    "text", "email", "password", "search", "tel", "url", "number", "date", "datetime-local", "month", "week", "time",
];

fn classify_action(tag: &str, input_type: Option<&str>, role: Option<&str>) -> ActionType {
    if tag == "input" && matches!(input_type, Some("checkbox") | Some("radio")) {
        return ActionType::Toggle;
    }
    if matches!(role, Some("checkbox") | Some("switch") | Some("radio")) {
        return ActionType::Toggle;
    }
    if tag == "textarea" || role == Some("textbox") {
        return ActionType::Input;
    }
    if tag == "input" {
        let is_text_family = input_type.map_or(true, |t| TEXT_INPUT_TYPES.contains(&t));
        if is_text_family {
            return ActionType::Input;
        }
    }
    if tag == "select" || matches!(role, Some("listbox") | Some("combobox")) {
        return ActionType::Select;
    }
    ActionType::Click
}

/// Grid-hash spatial index so occlusion checks are O(N log N)
/// rather than O(N²) pairwise comparisons.
struct SpatialIndex {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialIndex {
    fn build(boxes: &[(Rect, i64, bool)], cell_size: f64) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, (rect, _, _)) in boxes.iter().enumerate() {
            for cell in Self::cells_for(rect, cell_size) {
                cells.entry(cell).or_default().push(i);
            }
        }
        Self { cell_size, cells }
    }

    fn cells_for(rect: &Rect, cell_size: f64) -> impl Iterator<Item = (i64, i64)> {
        let min_cx = (rect.x / cell_size).floor() as i64;
        let min_cy = (rect.y / cell_size).floor() as i64;
        let max_cx = ((rect.x + rect.width) / cell_size).floor() as i64;
        let max_cy = ((rect.y + rect.height) / cell_size).floor() as i64;
        (min_cx..=max_cx).flat_map(move |cx| (min_cy..=max_cy).map(move |cy| (cx, cy)))
    }

    fn candidates_overlapping(&self, rect: &Rect) -> Vec<usize> {
        let mut out: Vec<usize> = Self::cells_for(rect, self.cell_size)
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
            .copied()
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Runs the full merge algorithm for one document/session. `dpr` is
/// the device pixel ratio to divide device-pixel bounds by; this binding's
/// `Page.getLayoutMetrics` doesn't carry a dedicated `devicePixelRatio`
/// field (the real protocol doesn't either), so the visual viewport's
/// `scale` is used as a stand-in, matching how headless automation tools
/// commonly source it.
pub fn merge(dom_root: &Node, raw: &RawSnapshot, session_id: SessionId, min_confidence: f32) -> (Vec<EnhancedNode>, SelectorMap) {
    let snapshot_index = raw
        .snapshot
        .as_ref()
        .map(build_snapshot_index)
        .unwrap_or_default();
    let ax_index = raw
        .ax_nodes
        .as_deref()
        .map(build_ax_index)
        .unwrap_or_default();

    let dpr = raw.layout.css_visual_viewport.scale.max(0.01);
    let viewport = Rect {
        x: raw.layout.css_layout_viewport.page_x as f64,
        y: raw.layout.css_layout_viewport.page_y as f64,
        width: raw.layout.css_layout_viewport.client_width as f64,
        height: raw.layout.css_layout_viewport.client_height as f64,
    };

    // Step 2: iterative DOM walk, explicit stack — deep DOMs must not blow
    // the Rust call stack.
    let mut stack = vec![dom_root];
    let mut candidates: Vec<EnhancedNode> = Vec::new();
    let mut all_boxes: Vec<(BackendNodeId, Rect, i64, bool)> = Vec::new();

    while let Some(node) = stack.pop() {
        for shadow in node.shadow_roots.iter().rev() {
            stack.push(shadow);
        }
        if let Some(content_document) = &node.content_document {
            stack.push(content_document);
        }
        for child in node.children.iter().rev() {
            stack.push(child);
        }

        if !node.is_element() {
            continue;
        }
        let Some(snap) = snapshot_index.get(&node.backend_node_id) else {
            continue;
        };

        let pointer_events_none = snap.styles.get("pointer-events").map(String::as_str) == Some("none");
        let bounds_css = Rect {
            x: snap.bounds_device.x / dpr,
            y: snap.bounds_device.y / dpr,
            width: snap.bounds_device.width / dpr,
            height: snap.bounds_device.height / dpr,
        };
        all_boxes.push((node.backend_node_id, bounds_css, snap.paint_order, pointer_events_none));

        let tag_name = node.node_name.to_lowercase();
        let attributes = node.attribute_map();
        let ax = ax_index.get(&node.backend_node_id);

        // Step 4: visibility.
        let display = snap.styles.get("display").map(String::as_str);
        let visibility = snap.styles.get("visibility").map(String::as_str);
        let opacity: f64 = snap
            .styles
            .get("opacity")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0);
        let within_viewport = bounds_css.intersection_area(&viewport) > 0.0;
        let is_visible = bounds_css.area() > 0.0 && within_viewport && display != Some("none") && visibility != Some("hidden") && opacity > 0.0;

        // Step 5: interactivity.
        let ax_role = ax.and_then(|a| a.role.clone());
        let ax_name = ax.and_then(|a| a.name.clone());
        let ax_focusable = ax.map(|a| a.focusable && !a.disabled).unwrap_or(false);
        let cursor_pointer = snap.styles.get("cursor").map(String::as_str) == Some("pointer");
        let definitely_interactive = DEFINITELY_INTERACTIVE_TAGS.contains(&tag_name.as_str())
        || ax_role.as_deref().is_some_and(|r| DEFINITELY_INTERACTIVE_ROLES.contains(&r))
        || ax_focusable;
        let is_interactive = (definitely_interactive || cursor_pointer) && !pointer_events_none;

        let action_type = classify_action(&tag_name, attributes.get("type").map(String::as_str), ax_role.as_deref());
        let is_clickable = is_interactive && action_type == ActionType::Click;

        candidates.push(EnhancedNode {
                backend_node_id: node.backend_node_id,
                tag_name,
                attributes,
                text_content: node.node_value.clone(),
                bounds_css,
                click_point: bounds_css.center(),
                ax_role,
                ax_name,
                ax_focusable,
                is_visible,
                is_interactive,
                is_clickable,
                is_occluded: false,
                action_type,
                confidence: 0.0,
        });
    }

    // Step 6: occlusion, via a grid-hash spatial index over every element
    // box (not just interactive candidates — an occluding overlay may not
    // itself be interactive).
    let cell_size = (viewport.width.max(viewport.height) / 20.0).max(32.0);
    let spatial = SpatialIndex::build(
        &all_boxes.iter().map(|(_, r, p, pe)| (*r, *p, *pe)).collect::<Vec<_>>(),
        cell_size,
    );

    for candidate in candidates.iter_mut().filter(|c| c.is_visible && c.is_interactive) {
        let overlapping = spatial.candidates_overlapping(&candidate.bounds_css);
        let area = candidate.bounds_css.area();
        if area <= 0.0 {
            continue;
        }
        for idx in overlapping {
            let (backend_id, rect, paint_order, pointer_events_none) = all_boxes[idx];
            if backend_id == candidate.backend_node_id || pointer_events_none {
                continue;
            }
            // Paint order wins over z-index when they disagree: it already
            // reflects the browser's actual stacking resolution.
            if paint_order <= snapshot_paint_order(&snapshot_index, &candidate.backend_node_id) {
                continue;
            }
            let overlap_ratio = candidate.bounds_css.intersection_area(&rect) / area;
            if overlap_ratio > 0.9 {
                candidate.is_occluded = true;
                break;
            }
        }
    }

    // Step 8: confidence.
    for candidate in candidates.iter_mut() {
        let mut score: f32 = 0.0;
        if candidate.is_visible {
            score += 0.3;
        }
        if candidate.is_interactive {
            score += 0.3;
        }
        if candidate.ax_role.is_some() {
            score += 0.2;
        }
        if candidate.ax_name.as_deref().is_some_and(|n| !n.is_empty()) {
            score += 0.1;
        }
        if candidate.ax_focusable {
            score += 0.1;
        }
        if candidate.bounds_css.width < 5.0 || candidate.bounds_css.height < 5.0 {
            score -= 0.2;
        }
        if candidate.is_occluded {
            score -= 0.3;
        }
        candidate.confidence = score.clamp(0.0, 1.0);
    }

    let mut ranked: Vec<EnhancedNode> = candidates
        .into_iter()
        .filter(|c| c.confidence >= min_confidence)
        .collect();

    // Step 9: ranking — descending confidence, then top-then-left reading
    // order.
    ranked.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then(a.bounds_css.y.total_cmp(&b.bounds_css.y))
                .then(a.bounds_css.x.total_cmp(&b.bounds_css.x))
    });

    let entries = ranked
        .iter()
        .map(|n| SelectorEntry {
            backend_node_id: n.backend_node_id,
            session_id: session_id.clone(),
            bounds_css: n.bounds_css,
            click_point: n.click_point,
            action_type: n.action_type,
            tag: n.tag_name.clone(),
            label: n.ax_name.clone().unwrap_or_default(),
    })
        .collect();

    (ranked, SelectorMap { entries })
}

fn snapshot_paint_order(index: &FnvHashMap<BackendNodeId, SnapshotEntry>, id: &BackendNodeId) -> i64 {
    index.get(id).map(|e| e.paint_order).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdp_agent_protocol::accessibility::{AxNode, AxProperty, AxValue};
    use cdp_agent_protocol::dom::NodeId;
    use cdp_agent_protocol::dom_snapshot::{CaptureSnapshotReturns, DocumentSnapshot, LayoutTreeSnapshot, NodeTreeSnapshot};
    use cdp_agent_protocol::page::{GetLayoutMetricsReturns, LayoutViewport, VisualViewport};

    fn element(backend_id: i64, tag: &str, children: Vec<Node>) -> Node {
        Node {
            node_id: NodeId(backend_id),
            backend_node_id: BackendNodeId(backend_id),
            node_type: 1,
            node_name: tag.to_string(),
            node_value: String::new(),
            children,
            attributes: Some(vec![]),
            frame_id: None,
            content_document: None,
            shadow_roots: vec![],
        }
    }

    fn layout_metrics(width: i64, height: i64) -> GetLayoutMetricsReturns {
        GetLayoutMetricsReturns {
            css_layout_viewport: LayoutViewport {
                page_x: 0,
                page_y: 0,
                client_width: width,
                client_height: height,
            },
            css_visual_viewport: VisualViewport {
                client_width: width as f64,
                client_height: height as f64,
                scale: 1.0,
            },
        }
    }

    /// Builds a one-document snapshot with a single styled, bounded node.
    fn snapshot_with_node(backend_id: i64, bounds: [f64; 4], paint_order: i64, styles: &[(&str, &str)]) -> CaptureSnapshotReturns {
        use cdp_agent_protocol::dom_snapshot::COMPUTED_STYLES;

        let mut strings = Vec::new();
        let mut style_row = Vec::new();
        for name in COMPUTED_STYLES {
            let value = styles.iter().find(|(n, _)| n == name).map(|(_, v)| *v);
            match value {
                Some(v) => {
                    strings.push(v.to_string());
                    style_row.push((strings.len() - 1) as i64);
                }
                None => style_row.push(-1),
            }
        }

        CaptureSnapshotReturns {
            documents: vec![DocumentSnapshot {
                    nodes: NodeTreeSnapshot {
                        backend_node_id: vec![BackendNodeId(backend_id)],
                        ..Default::default()
                    },
                    layout: LayoutTreeSnapshot {
                        node_index: vec![0],
                        styles: vec![style_row],
                        bounds: vec![bounds],
                        text: vec![-1],
                        paint_order: vec![paint_order],
                    },
            }],
            strings,
        }
    }

    fn raw(dom_snapshot: CaptureSnapshotReturns, ax_nodes: Vec<AxNode>) -> RawSnapshot {
        RawSnapshot {
            dom: None,
            snapshot: Some(dom_snapshot),
            ax_nodes: Some(ax_nodes),
            layout: layout_metrics(1280, 800),
        }
    }

    // S1: a plain <button> with static geometry is visible, interactive,
    // classified as a click action, and survives the confidence filter.
    #[test]
    fn static_button_is_interactive_and_clickable() {
        let root = element(1, "button", vec![]);
        let snapshot = snapshot_with_node(1, [10.0, 10.0, 100.0, 30.0], 1, &[("display", "block")]);
        let input = raw(snapshot, vec![]);

        let (nodes, map) = merge(&root, &input, SessionId::from("S1"), 0.3);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_visible);
        assert!(nodes[0].is_interactive);
        assert_eq!(nodes[0].action_type, ActionType::Click);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(1).unwrap().tag, "button");
    }

    // S2: a plain <div> with `cursor: pointer` is classified interactive
    // purely from the computed style signal — no tag or AX role needed.
    #[test]
    fn cursor_pointer_div_is_interactive() {
        let root = element(2, "div", vec![]);
        let snapshot = snapshot_with_node(2, [0.0, 0.0, 50.0, 50.0], 1, &[("cursor", "pointer")]);
        let input = raw(snapshot, vec![]);

        let (nodes, _) = merge(&root, &input, SessionId::from("S1"), 0.0);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_interactive);
    }

    // S3: a button fully covered by a later-painted overlay div is flagged
    // occluded and its confidence drops below the default threshold.
    #[test]
    fn fully_covered_button_is_occluded_and_filtered() {
        let overlay = element(20, "div", vec![]);
        let button = element(10, "button", vec![]);
        let root = element(1, "body", vec![button, overlay]);

        let mut snapshot = snapshot_with_node(10, [0.0, 0.0, 100.0, 40.0], 1, &[]);
        let overlay_snapshot = snapshot_with_node(20, [0.0, 0.0, 200.0, 200.0], 5, &[]);
        snapshot.documents[0].nodes.backend_node_id.push(BackendNodeId(20));
        snapshot.documents[0].layout.node_index.push(1);
        snapshot.documents[0].layout.bounds.extend(overlay_snapshot.documents[0].layout.bounds.clone());
        snapshot.documents[0].layout.styles.extend(overlay_snapshot.documents[0].layout.styles.clone());
        snapshot.documents[0].layout.text.push(-1);
        snapshot.documents[0].layout.paint_order.push(5);

        let input = raw(snapshot, vec![]);
        let (nodes, _) = merge(&root, &input, SessionId::from("S1"), 0.0);
        let button_node = nodes.iter().find(|n| n.backend_node_id == BackendNodeId(10)).unwrap();
        assert!(button_node.is_occluded);
        assert!(button_node.confidence < 0.3);
    }

    // S3 variant: an overlay with `pointer-events: none` must not occlude
    // even though its bounds fully cover the button.
    #[test]
    fn pointer_events_none_overlay_does_not_occlude() {
        let overlay = element(20, "div", vec![]);
        let button = element(10, "button", vec![]);
        let root = element(1, "body", vec![button, overlay]);

        let mut snapshot = snapshot_with_node(10, [0.0, 0.0, 100.0, 40.0], 1, &[]);
        let overlay_snapshot = snapshot_with_node(20, [0.0, 0.0, 200.0, 200.0], 5, &[("pointer-events", "none")]);
        snapshot.documents[0].nodes.backend_node_id.push(BackendNodeId(20));
        snapshot.documents[0].layout.node_index.push(1);
        snapshot.documents[0].layout.bounds.extend(overlay_snapshot.documents[0].layout.bounds.clone());
        snapshot.documents[0].layout.styles.extend(overlay_snapshot.documents[0].layout.styles.clone());
        snapshot.documents[0].layout.text.push(-1);
        snapshot.documents[0].layout.paint_order.push(5);

        let input = raw(snapshot, vec![]);
        let (nodes, _) = merge(&root, &input, SessionId::from("S1"), 0.0);
        let button_node = nodes.iter().find(|n| n.backend_node_id == BackendNodeId(10)).unwrap();
        assert!(!button_node.is_occluded);
    }

    // S6: AX data missing entirely — the merger still produces a candidate
    // from DOM + DOMSnapshot alone, just with lower confidence (no AX role
    // bonus), rather than failing.
    #[test]
    fn missing_ax_tree_degrades_confidence_but_does_not_drop_node() {
        let root = element(1, "button", vec![]);
        let snapshot = snapshot_with_node(1, [10.0, 10.0, 100.0, 30.0], 1, &[]);
        let input = RawSnapshot {
            dom: None,
            snapshot: Some(snapshot),
            ax_nodes: None,
            layout: layout_metrics(1280, 800),
        };

        let (nodes, _) = merge(&root, &input, SessionId::from("S1"), 0.3);
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].ax_role.is_none());
        assert!(nodes[0].confidence >= 0.3);
    }

    #[test]
    fn ax_role_and_name_raise_confidence() {
        let root = element(1, "div", vec![]);
        let snapshot = snapshot_with_node(1, [10.0, 10.0, 100.0, 30.0], 1, &[("cursor", "pointer")]);
        let ax_node = AxNode {
            node_id: Some("ax1".to_string()),
            ignored: false,
            role: Some(AxValue {
                    value_type: "role".into(),
                    value: Some(serde_json::json!("button")),
            }),
            name: Some(AxValue {
                    value_type: "computedString".into(),
                    value: Some(serde_json::json!("Submit")),
            }),
            properties: vec![AxProperty {
                    name: "focusable".into(),
                    value: AxValue {
                        value_type: "boolean".into(),
                        value: Some(serde_json::json!(true)),
                    },
            }],
            backend_dom_node_id: Some(BackendNodeId(1)),
            dom_node_id: None,
        };
        let input = raw(snapshot, vec![ax_node]);

        let (nodes, _) = merge(&root, &input, SessionId::from("S1"), 0.0);
        assert_eq!(nodes[0].ax_role.as_deref(), Some("button"));
        assert!(nodes[0].ax_focusable);
        assert!(nodes[0].confidence > 0.8);
    }

    #[test]
    fn tiny_elements_are_penalized() {
        let root = element(1, "button", vec![]);
        let snapshot = snapshot_with_node(1, [0.0, 0.0, 2.0, 2.0], 1, &[]);
        let input = raw(snapshot, vec![]);

        let (nodes, _) = merge(&root, &input, SessionId::from("S1"), 0.0);
        assert!(nodes[0].confidence < 0.6);
    }

    #[test]
    fn selector_map_indices_are_one_based() {
        let root = element(1, "button", vec![]);
        let snapshot = snapshot_with_node(1, [0.0, 0.0, 40.0, 40.0], 1, &[]);
        let input = raw(snapshot, vec![]);

        let (_, map) = merge(&root, &input, SessionId::from("S1"), 0.0);
        assert!(map.get(0).is_none());
        assert!(map.get(1).is_some());
    }
}

