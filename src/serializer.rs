//! Serializer: renders a ranked [`EnhancedNode`] list as the
//! LLM-facing text inventory. Pure — a function of the merged list and a
//! frame-depth annotation the orchestrator supplies; it does not mutate
//! and it does not know about sessions or transports.

use crate::merger::EnhancedNode;

const TEXT_TRUNCATE_LEN: usize = 80;

/// One element plus the nesting depth of the frame it came from. The
/// orchestrator concatenates per-frame merges into this before handing the
/// list to [`serialize`] — the merger itself is frame-agnostic.
pub struct AnnotatedNode<'a> {
    pub index: usize,
    pub node: &'a EnhancedNode,
    pub frame_depth: usize,
}

/// Renders one line per element: `[<i>]<tag> role="<ax_role>"
/// name="<ax_name>" text="<truncated>" action=<action_type>`. Frame
/// boundaries are indicated by one-space indentation per depth level.
pub fn serialize(nodes: &[AnnotatedNode<'_>]) -> String {
    let mut out = String::new();
    for annotated in nodes {
        let indent = " ".repeat(annotated.frame_depth);
        let role = annotated.node.ax_role.as_deref().unwrap_or("");
        let name = annotated.node.ax_name.as_deref().unwrap_or("");
        let text = truncate(&annotated.node.text_content);
        let action = action_label(annotated.node.action_type);
        out.push_str(&format!(
                "{indent}[{index}]<{tag}> role=\"{role}\" name=\"{name}\" text=\"{text}\" action={action}\n",
                index = annotated.index,
                tag = annotated.node.tag_name,
        ));
    }
    out
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= TEXT_TRUNCATE_LEN {
        trimmed.to_string()
    } else {
        let mut truncated: String = trimmed.chars().take(TEXT_TRUNCATE_LEN).collect();
        truncated.push('\u{2026}');
        truncated
    }
}

fn action_label(action: crate::merger::ActionType) -> &'static str {
    use crate::merger::ActionType;
    match action {
        ActionType::Click => "click",
        ActionType::Input => "input",
        ActionType::Select => "select",
        ActionType::Toggle => "toggle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::{ActionType, Rect};
    use cdp_agent_protocol::dom::BackendNodeId;
    use std::collections::HashMap;

    fn node(tag: &str, text: &str) -> EnhancedNode {
        EnhancedNode {
            backend_node_id: BackendNodeId(1),
            tag_name: tag.to_string(),
            attributes: HashMap::new(),
            text_content: text.to_string(),
            bounds_css: Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
            click_point: (5.0, 5.0),
            ax_role: Some("button".to_string()),
            ax_name: Some("Go".to_string()),
            ax_focusable: true,
            is_visible: true,
            is_interactive: true,
            is_clickable: true,
            is_occluded: false,
            action_type: ActionType::Click,
            confidence: 0.9,
        }
    }

    #[test]
    fn renders_one_line_per_element_with_index_and_role() {
        let n = node("button", "Go");
        let annotated = vec![AnnotatedNode { index: 1, node: &n, frame_depth: 0 }];
        let text = serialize(&annotated);
        assert_eq!(text, "[1]<button> role=\"button\" name=\"Go\" text=\"Go\" action=click\n");
    }

    #[test]
    fn indents_by_frame_depth() {
        let n = node("input", "");
        let annotated = vec![AnnotatedNode { index: 2, node: &n, frame_depth: 1 }];
        let text = serialize(&annotated);
        assert!(text.starts_with(" [2]"));
    }

    #[test]
    fn truncates_long_text() {
        let long_text = "x".repeat(200);
        let n = node("div", &long_text);
        let annotated = vec![AnnotatedNode { index: 1, node: &n, frame_depth: 0 }];
        let text = serialize(&annotated);
        let quoted = text.split("text=\"").nth(1).unwrap().split('"').next().unwrap();
        assert_eq!(quoted.chars().count(), TEXT_TRUNCATE_LEN + 1);
    }
}

