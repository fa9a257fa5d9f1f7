//! State orchestrator / Browser facade: the outermost layer of the
//! core. Combines the raw data collector, the merger and the
//! serializer across every attached page/iframe session into one
//! [`BrowserState`], and resolves action-by-index back to a concrete [`Client`]
//! primitive.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;

use cdp_agent_protocol::runtime;
use cdp_agent_protocol::target::{SessionId, TargetId};

use crate::client::{Client, ScrollDirection, SelectBy};
use crate::collector;
use crate::config::BrowserConfig;
use crate::error::{CdpError, ErrorKind, Result};
use crate::keys::Modifier;
use crate::merger::{self, EnhancedNode, SelectorEntry, SelectorMap};
use crate::serializer::{self, AnnotatedNode};

/// Which verb an [`ActionResult`] reports on. Distinct from
/// [`merger::ActionType`], which classifies what an *element* affords
/// (click/input/select/toggle) — this enumerates what the *caller* asked
/// the browser to do, including the index-free verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    Type,
    Select,
    Scroll,
    PressKey,
    Navigate,
    GoBack,
    GoForward,
    Refresh,
    Screenshot,
}

/// Immutable snapshot of the page. `selector_map` is the
/// lean, LLM-facing projection of each candidate element; the richer
/// `EnhancedNode`s used for pre-action geometry checks are kept only in the
/// [`Browser`]'s private observation cache, not here — this struct is the
/// part meant to travel with an agent's history.
#[derive(Debug, Clone)]
pub struct BrowserState {
    pub url: String,
    pub title: String,
    pub dom_text: String,
    pub selector_map: SelectorMap,
    pub screenshot_bytes: Option<Vec<u8>>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub element_count: usize,
}

/// Uniform action result: failures are returned here, never
/// raised as an error through the action surface, so an agent loop can
/// branch on `success` without a `try`/`catch` around its main loop.
#[derive(Debug, Clone)]
pub struct ActionResult {
    pub success: bool,
    pub action_type: Option<ActionKind>,
    pub element_index: Option<usize>,
    pub error_kind: Option<ErrorKind>,
    pub screenshot_ref: Option<PathBuf>,
}

impl ActionResult {
    fn ok(action_type: ActionKind, element_index: Option<usize>) -> Self {
        Self {
            success: true,
            action_type: Some(action_type),
            element_index,
            error_kind: None,
            screenshot_ref: None,
        }
    }

    fn err(error: &CdpError, element_index: Option<usize>) -> Self {
        Self {
            success: false,
            action_type: None,
            element_index,
            error_kind: Some(ErrorKind::from(error)),
            screenshot_ref: None,
        }
    }
}

/// What the orchestrator caches between `get_state()` calls so an action by
/// index can revalidate geometry without re-running the merge. Indices line
/// up 1:1 with the public `BrowserState.selector_map`.
struct Observation {
    nodes: Vec<EnhancedNode>,
    sessions: Vec<SessionId>,
}

pub struct Browser {
    client: Client,
    config: Arc<BrowserConfig>,
    last: AsyncMutex<Option<Observation>>,
}

impl Browser {
    pub fn new(client: Client, config: Arc<BrowserConfig>) -> Self {
        Self {
            client,
            config,
            last: AsyncMutex::new(None),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn close(&self) {
        self.client.close().await;
    }

    // -- state -----------------------------------------------------

    /// Fetches DOM+Snapshot+AX+layout for every attached page/iframe
    /// session, merges each independently, concatenates the ranked lists in
    /// frame order, and **concurrently** fetches url/title/screenshot.
    pub async fn get_state(&self, include_screenshot: bool) -> Result<BrowserState> {
        let (root_session, root_target) = self.root_session()?;

        let frames = self.client.registry().attached_page_sessions();
        if frames.is_empty() {
            return Err(CdpError::msg("no attached page session"));
        }

        let mut raw_by_frame = Vec::with_capacity(frames.len());
        for (session_id, target_id, depth) in &frames {
            match collector::collect(
                &self.client,
                session_id.clone(),
                target_id.clone(),
                self.config.dom_fetch_timeout,
            )
                .await
            {
                Ok(raw) => raw_by_frame.push((session_id.clone(), *depth, raw)),
                Err(err) => {
                    tracing::warn!(%err, target_id = %target_id, "skipping frame whose raw snapshot failed entirely");
                }
            }
        }
        if raw_by_frame.is_empty() {
            return Err(CdpError::PartialData("every attached frame failed to collect".into()));
        }

        let (viewport_width, viewport_height) = raw_by_frame
            .iter()
            .find(|(session_id, _, _)| *session_id == root_session)
            .map(|(_, _, raw)| (raw.layout.css_visual_viewport.client_width, raw.layout.css_visual_viewport.client_height))
            .unwrap_or((0.0, 0.0));

        let mut all_nodes: Vec<EnhancedNode> = Vec::new();
        let mut all_entries: Vec<SelectorEntry> = Vec::new();
        let mut all_sessions: Vec<SessionId> = Vec::new();
        let mut depths: Vec<usize> = Vec::new();

        for (session_id, depth, raw) in &raw_by_frame {
            let Some(dom_root) = &raw.dom else {
                tracing::warn!(target: "merger", "frame has no DOM tree, skipping its elements");
                continue;
            };
            let (nodes, map) = merger::merge(dom_root, raw, session_id.clone(), self.config.min_confidence);
            let entries = map.into_entries();
            depths.extend(std::iter::repeat(*depth).take(nodes.len()));
            all_sessions.extend(std::iter::repeat(session_id.clone()).take(nodes.len()));
            all_nodes.extend(nodes);
            all_entries.extend(entries);
        }

        let annotated: Vec<AnnotatedNode<'_>> = all_nodes
            .iter()
            .zip(&depths)
            .enumerate()
            .map(|(i, (node, depth))| AnnotatedNode {
                index: i + 1,
                node,
                frame_depth: *depth,
        })
            .collect();
        let dom_text = serializer::serialize(&annotated);
        let element_count = all_nodes.len();
        let selector_map = SelectorMap::from_entries(all_entries);

        *self.last.lock().await = Some(Observation {
                nodes: all_nodes,
                sessions: all_sessions,
        });

        let (url, title, screenshot_bytes) = tokio::join!(
            self.current_url(&root_target),
            self.page_title(root_session.clone(), root_target.clone()),
            self.maybe_screenshot(include_screenshot, root_session.clone(), root_target.clone()),
        );

        Ok(BrowserState {
                url: url?,
                title: title.unwrap_or_default(),
                dom_text,
                selector_map,
                screenshot_bytes: screenshot_bytes?,
                viewport_width,
                viewport_height,
                element_count,
        })
    }

    async fn current_url(&self, target_id: &TargetId) -> Result<String> {
        self.client.get_current_url(target_id).await
    }

    async fn page_title(&self, session_id: SessionId, target_id: TargetId) -> Result<String> {
        let resp = self
            .client
            .execute_session(runtime::EvaluateParams::new("document.title"), session_id, target_id)
            .await?;
        Ok(resp
                .result
                .value
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default())
    }

    async fn maybe_screenshot(
        &self,
        include: bool,
        session_id: SessionId,
        target_id: TargetId,
    ) -> Result<Option<Vec<u8>>> {
        if !include {
            return Ok(None);
        }
        let bytes = self
            .client
            .capture_screenshot(session_id, target_id, self.config.screenshot_format, self.config.screenshot_quality, false)
            .await?;
        Ok(Some(bytes))
    }

    fn root_session(&self) -> Result<(SessionId, TargetId)> {
        let session_id = self
            .client
            .registry()
            .root_page_session()
            .ok_or_else(|| CdpError::msg("no root page session attached"))?;
        let target_id = self
            .client
            .registry()
            .target_for_session(&session_id)
            .ok_or_else(|| CdpError::msg("root session has no target"))?;
        Ok((session_id, target_id))
    }

    /// Looks up `selector_map[index]` in the cached observation and
    /// revalidates visibility/occlusion before any action is dispatched
    ///.
    async fn resolve(&self, index: usize) -> Result<(SessionId, TargetId, EnhancedNode)> {
        let guard = self.last.lock().await;
        let observation = guard.as_ref().ok_or(CdpError::NotFound(index))?;
        let node = index
            .checked_sub(1)
            .and_then(|i| observation.nodes.get(i))
            .ok_or(CdpError::NotFound(index))?
            .clone();
        let session_id = observation
            .sessions
            .get(index - 1)
            .cloned()
            .ok_or(CdpError::NotFound(index))?;
        drop(guard);

        if !node.is_visible {
            return Err(CdpError::NotVisible);
        }
        if node.is_occluded {
            return Err(CdpError::Occluded);
        }
        let target_id = self
            .client
            .registry()
            .target_for_session(&session_id)
            .ok_or(CdpError::SessionLost)?;
        Ok((session_id, target_id, node))
    }

    // -- actions by index --------------------------------------

    pub async fn click(&self, index: usize) -> ActionResult {
        let resolved = self.resolve(index).await;
        let (session_id, target_id, node) = match resolved {
            Ok(r) => r,
            Err(err) => return ActionResult::err(&err, Some(index)),
        };
        match self.client.click_node(session_id, target_id, node.backend_node_id).await {
            Ok(()) => ActionResult::ok(ActionKind::Click, Some(index)),
            Err(err) => ActionResult::err(&err, Some(index)),
        }
    }

    pub async fn type_text(&self, index: usize, text: &str) -> ActionResult {
        let resolved = self.resolve(index).await;
        let (session_id, target_id, node) = match resolved {
            Ok(r) => r,
            Err(err) => return ActionResult::err(&err, Some(index)),
        };
        match self.client.type_text(session_id, target_id, node.backend_node_id, text).await {
            Ok(()) => ActionResult::ok(ActionKind::Type, Some(index)),
            Err(err) => ActionResult::err(&err, Some(index)),
        }
    }

    pub async fn select_option(&self, index: usize, value: &str, by: SelectBy) -> ActionResult {
        let resolved = self.resolve(index).await;
        let (session_id, target_id, node) = match resolved {
            Ok(r) => r,
            Err(err) => return ActionResult::err(&err, Some(index)),
        };
        match self
            .client
            .select_option(session_id, target_id, node.backend_node_id, value, by)
            .await
        {
            Ok(()) => ActionResult::ok(ActionKind::Select, Some(index)),
            Err(err) => ActionResult::err(&err, Some(index)),
        }
    }

    // -- actions without an index -------------------------------------

    pub async fn scroll(&self, direction: ScrollDirection, amount: f64) -> ActionResult {
        let Ok((session_id, target_id)) = self.root_session() else {
            return ActionResult::err(&CdpError::msg("no root page session attached"), None);
        };
        match self.client.scroll(session_id, target_id, direction, amount, None).await {
            Ok(()) => ActionResult::ok(ActionKind::Scroll, None),
            Err(err) => ActionResult::err(&err, None),
        }
    }

    pub async fn press_key(&self, key: &str, modifiers: &[Modifier]) -> ActionResult {
        let Ok((session_id, target_id)) = self.root_session() else {
            return ActionResult::err(&CdpError::msg("no root page session attached"), None);
        };
        match self.client.press_key(session_id, target_id, key, modifiers).await {
            Ok(()) => ActionResult::ok(ActionKind::PressKey, None),
            Err(err) => ActionResult::err(&err, None),
        }
    }

    pub async fn navigate(&self, url: &str) -> ActionResult {
        let Ok((session_id, target_id)) = self.root_session() else {
            return ActionResult::err(&CdpError::msg("no root page session attached"), None);
        };
        match self.client.navigate(session_id, target_id, url, true).await {
            Ok(()) => ActionResult::ok(ActionKind::Navigate, None),
            Err(err) => ActionResult::err(&err, None),
        }
    }

    pub async fn go_back(&self) -> ActionResult {
        let Ok((session_id, target_id)) = self.root_session() else {
            return ActionResult::err(&CdpError::msg("no root page session attached"), None);
        };
        match self.client.go_back(session_id, target_id).await {
            Ok(()) => ActionResult::ok(ActionKind::GoBack, None),
            Err(err) => ActionResult::err(&err, None),
        }
    }

    pub async fn go_forward(&self) -> ActionResult {
        let Ok((session_id, target_id)) = self.root_session() else {
            return ActionResult::err(&CdpError::msg("no root page session attached"), None);
        };
        match self.client.go_forward(session_id, target_id).await {
            Ok(()) => ActionResult::ok(ActionKind::GoForward, None),
            Err(err) => ActionResult::err(&err, None),
        }
    }

    pub async fn refresh(&self) -> ActionResult {
        let Ok((session_id, target_id)) = self.root_session() else {
            return ActionResult::err(&CdpError::msg("no root page session attached"), None);
        };
        match self.client.refresh(session_id, target_id).await {
            Ok(()) => ActionResult::ok(ActionKind::Refresh, None),
            Err(err) => ActionResult::err(&err, None),
        }
    }

    /// Captures a screenshot and writes it to a fresh temp file. The file is left
    /// on disk for the caller to read and eventually rotate out; the core
    /// itself only ever keeps the most recent screenshot's bytes in memory
    /// (inside the `BrowserState` returned by `get_state`), never a history
    /// of them.
    pub async fn screenshot(&self, full_page: bool) -> ActionResult {
        let Ok((session_id, target_id)) = self.root_session() else {
            return ActionResult::err(&CdpError::msg("no root page session attached"), None);
        };
        let bytes = match self
            .client
            .capture_screenshot(session_id, target_id, self.config.screenshot_format, self.config.screenshot_quality, full_page)
            .await
        {
            Ok(bytes) => bytes,
            Err(err) => return ActionResult::err(&err, None),
        };

        match write_screenshot_tempfile(&bytes, self.config.screenshot_format) {
            Ok(path) => ActionResult {
                success: true,
                action_type: Some(ActionKind::Screenshot),
                element_index: None,
                error_kind: None,
                screenshot_ref: Some(path),
            },
            Err(err) => ActionResult::err(&err, None),
        }
    }

    /// Enables `Overlay` on demand and highlights an already-resolved
    /// element; not part of the action-result
    /// surface since it has no pass/fail semantics an agent branches on.
    pub async fn highlight(&self, index: usize, duration: std::time::Duration) -> Result<()> {
        let (session_id, target_id, node) = self.resolve(index).await?;
        self.client.highlight_node(session_id, target_id, node.backend_node_id, duration).await
    }
}

fn write_screenshot_tempfile(bytes: &[u8], format: crate::config::ScreenshotFormat) -> Result<PathBuf> {
    use std::io::Write;

    let suffix = match format {
        crate::config::ScreenshotFormat::Jpeg => ".jpg",
        crate::config::ScreenshotFormat::Png => ".png",
    };
    let mut file = tempfile::Builder::new()
        .prefix("cdp-agent-screenshot-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| CdpError::msg(format!("failed to create screenshot temp file: {e}")))?;
    file.write_all(bytes)
        .map_err(|e| CdpError::msg(format!("failed to write screenshot temp file: {e}")))?;
    let (_, path) = file
        .keep()
        .map_err(|e| CdpError::msg(format!("failed to persist screenshot temp file: {e}")))?;
    Ok(path)
}

