//! Raw data collector: fetches DOM, DOMSnapshot, Accessibility tree
//! and layout metrics concurrently for one session, under a single overall
//! timeout, tolerating the independent failure of any one source.

use std::time::Duration;

use cdp_agent_protocol::target::{SessionId, TargetId};
use cdp_agent_protocol::{accessibility, dom, dom_snapshot, page};

use crate::client::Client;
use crate::error::{CdpError, Result};

/// What the merger consumes. Any of the three tree sources may be
/// `None` if its fetch failed — the merger degrades gracefully (S6) rather
/// than failing the whole snapshot for one missing source. Layout metrics
/// are required: without a viewport there is no way to convert DOMSnapshot
/// bounds or compute visibility at all.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub dom: Option<dom::Node>,
    pub snapshot: Option<dom_snapshot::CaptureSnapshotReturns>,
    pub ax_nodes: Option<Vec<accessibility::AxNode>>,
    pub layout: page::GetLayoutMetricsReturns,
}

/// Collects one `RawSnapshot` for `session_id`/`target_id`, racing the three
/// tree fetches concurrently and bounding the whole collection by
/// `overall_timeout`. Layout metrics are fetched alongside them but
/// are load-bearing — their failure fails the whole collection.
pub async fn collect(
    client: &Client,
    session_id: SessionId,
    target_id: TargetId,
    overall_timeout: Duration,
) -> Result<RawSnapshot> {
    let fut = async {
        let (dom_res, snapshot_res, ax_res, layout_res) = tokio::join!(
            client.execute_session(
                dom::GetDocumentParams { depth: Some(-1), pierce: true },
                session_id.clone(),
                target_id.clone(),
            ),
            client.execute_session(
                dom_snapshot::CaptureSnapshotParams::default(),
                session_id.clone(),
                target_id.clone(),
            ),
            client.execute_session(
                accessibility::GetFullAxTreeParams::default(),
                session_id.clone(),
                target_id.clone(),
            ),
            client.execute_session(page::GetLayoutMetricsParams {}, session_id.clone(), target_id.clone()),
        );

        let dom = match dom_res {
            Ok(resp) => Some(resp.root),
            Err(err) => {
                tracing::warn!(%err, "DOM.getDocument failed, continuing without a DOM tree");
                None
            }
        };
        let snapshot = match snapshot_res {
            Ok(resp) => Some(resp),
            Err(err) => {
                tracing::warn!(%err, "DOMSnapshot.captureSnapshot failed, continuing without layout/style data");
                None
            }
        };
        let ax_nodes = match ax_res {
            Ok(resp) => Some(resp.nodes),
            Err(err) => {
                tracing::warn!(%err, "Accessibility.getFullAXTree failed, continuing without AX data");
                None
            }
        };
        let layout = layout_res?;

        if dom.is_none() && snapshot.is_none() {
            return Err(CdpError::PartialData(
                    "both DOM.getDocument and DOMSnapshot.captureSnapshot failed".into(),
            ));
        }

        Ok(RawSnapshot {
                dom,
                snapshot,
                ax_nodes,
                layout,
        })
    };

    tokio::time::timeout(overall_timeout, fut)
        .await
        .map_err(|_| CdpError::Timeout(overall_timeout))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_snapshot_is_clonable_with_missing_sources() {
        let snap = RawSnapshot {
            dom: None,
            snapshot: None,
            ax_nodes: None,
            layout: page::GetLayoutMetricsReturns {
                css_layout_viewport: page::LayoutViewport {
                    page_x: 0,
                    page_y: 0,
                    client_width: 1280,
                    client_height: 800,
                },
                css_visual_viewport: page::VisualViewport {
                    client_width: 1280.0,
                    client_height: 800.0,
                    scale: 1.0,
                },
            },
        };
        let cloned = snap.clone();
        assert_eq!(cloned.layout.css_layout_viewport.client_width, 1280);
    }
}

