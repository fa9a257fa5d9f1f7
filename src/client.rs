//! The CDP client: command dispatch, domain auto-enable, session
//! recovery, and the per-session action primitives the state orchestrator
//! and action-by-index API drive.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cdp_agent_protocol::dom::{BackendNodeId, BoxModel};
use cdp_agent_protocol::target::{SessionId, TargetId};
use cdp_agent_protocol::{dom, input, overlay, page, runtime, target};
use cdp_agent_wire::{to_command_response, Command, Method};
use tokio::task::JoinHandle;

use crate::config::BrowserConfig;
use crate::error::{CdpError, Result};
use crate::handler::commandfuture::await_response;
use crate::handler::{Handler, HandlerHandle};
use crate::keys::{self, Modifier};
use crate::registry::SessionRegistry;
use crate::transport::Transport;

/// Which CDP value a `select` action should match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectBy {
    Value,
    Text,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone)]
pub struct Client {
    handle: HandlerHandle,
    registry: Arc<SessionRegistry>,
    config: Arc<BrowserConfig>,
    overlay_enabled: Arc<Mutex<HashSet<SessionId>>>,
    task: Arc<tokio::sync::Mutex<Option<JoinHandle<()>>>>,
    background_tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Client {
    pub async fn connect(config: BrowserConfig) -> Result<Self> {
        let transport = Transport::connect(&config).await?;
        let (handle, task) = Handler::spawn(transport);
        let registry = handle.registry.clone();
        Ok(Self {
                handle,
                registry,
                config: Arc::new(config),
                overlay_enabled: Arc::new(Mutex::new(HashSet::new())),
                task: Arc::new(tokio::sync::Mutex::new(Some(task))),
                background_tasks: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Closes the client: cancels the handler task's reader/writer and
    /// awaits the task itself, and aborts any core-owned background tasks
    /// (e.g. delayed highlight hides) so none outlives this call.
    pub async fn close(&self) {
        self.handle.close();
        let mut guard = self.task.lock().await;
        if let Some(task) = guard.take() {
            let _ = task.await;
        }
        for task in self.background_tasks.lock().unwrap().drain(..) {
            task.abort();
        }
    }

    // -- dispatch -------------------------------------------------

    /// Browser-scoped command: no session id, always dispatched directly.
    pub async fn execute<T: Command>(&self, cmd: T) -> Result<T::Response> {
        self.send(cmd, None).await
    }

    /// Session-scoped command with the recovery state machine:
    /// `Try(normal send)`, and on `SessionLost`, `RecoverOnce` followed by
    /// exactly one retry. No further loops.
    pub async fn execute_session<T: Command + Clone>(
        &self,
        cmd: T,
        session_id: SessionId,
        target_id: TargetId,
    ) -> Result<T::Response> {
        if self.registry.is_session_active(&session_id) {
            match self.send(cmd.clone(), Some(session_id.clone())).await {
                Ok(resp) => return Ok(resp),
                Err(CdpError::SessionLost) => {}
                Err(err) => return Err(err),
            }
        }
        tracing::warn!(target_id = %target_id, "session lost, attempting recovery");
        let new_session = self.recover_once(&target_id).await?;
        self.send(cmd, Some(new_session)).await
    }

    async fn send<T: Command>(&self, cmd: T, session_id: Option<SessionId>) -> Result<T::Response> {
        let method = cmd.identifier();
        let params = serde_json::to_value(cmd)?;
        let (id, rx) = self.handle.submit(method.clone(), session_id, params).await?;
        let resp = await_response(&self.handle, id, rx, self.config.action_timeout).await?;
        to_command_response::<T>(resp, method.clone())
            .map(|r| r.result)
            .map_err(|e| CdpError::protocol(method.to_string(), e))
    }

    /// One bounded recovery attempt: re-attach to the target and record the fresh
    /// session. `Target.attachToTarget` is itself browser-scoped, so this
    /// never needs to bypass the active-session check — there is no
    /// session to check.
    async fn recover_once(&self, target_id: &TargetId) -> Result<SessionId> {
        let attach = target::AttachToTargetParams {
            target_id: target_id.clone(),
            flatten: true,
        };
        let resp = self.execute(attach).await.map_err(|_| CdpError::SessionLost)?;
        self.registry.attach_session(resp.session_id.clone(), target_id.clone());
        Ok(resp.session_id)
    }

    // -- action primitives ----------------------------------------

    pub async fn click_node(
        &self,
        session_id: SessionId,
        target_id: TargetId,
        backend_node_id: BackendNodeId,
    ) -> Result<()> {
        self.execute_session(
            dom::ScrollIntoViewIfNeededParams { backend_node_id },
            session_id.clone(),
            target_id.clone(),
        )
            .await?;

        // The prior `click_point` may be stale after scrolling; recompute.
        let model: BoxModel = self
            .execute_session(dom::GetBoxModelParams { backend_node_id }, session_id.clone(), target_id.clone())
            .await?
            .model;
        let (cx, cy) = model.center();

        self.execute_session(
            input::DispatchMouseEventParams::click_at(cx, cy, input::MouseEventType::MousePressed),
            session_id.clone(),
            target_id.clone(),
        )
            .await?;
        self.execute_session(
            input::DispatchMouseEventParams::click_at(cx, cy, input::MouseEventType::MouseReleased),
            session_id,
            target_id,
        )
            .await?;
        Ok(())
    }

    pub async fn type_text(
        &self,
        session_id: SessionId,
        target_id: TargetId,
        backend_node_id: BackendNodeId,
        text: &str,
    ) -> Result<()> {
        self.execute_session(dom::FocusParams { backend_node_id }, session_id.clone(), target_id.clone())
            .await?;

        for ch in text.chars() {
            if ch.is_control() {
                self.dispatch_control_char(session_id.clone(), target_id.clone(), ch).await?;
            } else {
                self.execute_session(
                    input::InsertTextParams::new(ch.to_string()),
                    session_id.clone(),
                    target_id.clone(),
                )
                    .await?;
            }
        }
        Ok(())
    }

    async fn dispatch_control_char(&self, session_id: SessionId, target_id: TargetId, ch: char) -> Result<()> {
        let key_name = match ch {
            '\n' | '\r' => "Enter",
            '\t' => "Tab",
            '\u{8}' => "Backspace",
            _ => return Ok(()),
        };
        self.press_key(session_id, target_id, key_name, &[]).await
    }

    pub async fn press_key(
        &self,
        session_id: SessionId,
        target_id: TargetId,
        key: &str,
        modifiers: &[Modifier],
    ) -> Result<()> {
        let def = keys::lookup(key).ok_or_else(|| CdpError::InputRejected(format!("unknown key: {key}")))?;
        let bitmask = keys::modifier_bitmask(modifiers);

        self.execute_session(
            input::DispatchKeyEventParams {
                event_type: input::KeyEventType::RawKeyDown,
                key: Some(def.key.to_string()),
                code: Some(def.code.to_string()),
                windows_virtual_key_code: Some(def.windows_virtual_key_code),
                text: None,
                modifiers: bitmask,
            },
            session_id.clone(),
            target_id.clone(),
        )
            .await?;

        if let Some(char_text) = def.char_text {
            self.execute_session(
                input::DispatchKeyEventParams {
                    event_type: input::KeyEventType::Char,
                    key: Some(def.key.to_string()),
                    code: Some(def.code.to_string()),
                    windows_virtual_key_code: Some(def.windows_virtual_key_code),
                    text: Some(char_text.to_string()),
                    modifiers: bitmask,
                },
                session_id.clone(),
                target_id.clone(),
            )
                .await?;
        }

        self.execute_session(
            input::DispatchKeyEventParams {
                event_type: input::KeyEventType::KeyUp,
                key: Some(def.key.to_string()),
                code: Some(def.code.to_string()),
                windows_virtual_key_code: Some(def.windows_virtual_key_code),
                text: None,
                modifiers: bitmask,
            },
            session_id,
            target_id,
        )
            .await?;
        Ok(())
    }

    pub async fn select_option(
        &self,
        session_id: SessionId,
        target_id: TargetId,
        backend_node_id: BackendNodeId,
        value: &str,
        by: SelectBy,
    ) -> Result<()> {
        let object_id = self
            .execute_session(
            dom::ResolveNodeParams {
                node_id: None,
                backend_node_id: Some(backend_node_id),
            },
            session_id.clone(),
            target_id.clone(),
        )
            .await?
            .object
            .object_id
            .ok_or_else(|| CdpError::msg("select target resolved to no remote object"))?;

        let selector = match by {
            SelectBy::Value => "Array.from(this.options).findIndex(o => o.value === arg)",
            SelectBy::Text => "Array.from(this.options).findIndex(o => o.textContent.trim() === arg)",
            SelectBy::Index => "Number(arg)",
        };
        let function_declaration = format!(
            "function(arg) {{
                    const idx = {selector};
                    if (idx < 0 || idx >= this.options.length) {{ throw new Error('option not found'); }}
                    this.selectedIndex = idx;
                    this.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    this.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }}"
        );

        let resp = self
            .execute_session(
            runtime::CallFunctionOnParams {
                function_declaration,
                object_id,
                arguments: vec![runtime::CallArgument::value(serde_json::Value::String(value.to_string()))],
                return_by_value: true,
            },
            session_id,
            target_id,
        )
            .await?;

        if resp.exception_details.is_some() {
            return Err(CdpError::InputRejected(format!("{value} is not a valid option")));
        }
        Ok(())
    }

    pub async fn scroll(
        &self,
        session_id: SessionId,
        target_id: TargetId,
        direction: ScrollDirection,
        amount: f64,
        at: Option<(f64, f64)>,
    ) -> Result<()> {
        let (x, y) = match at {
            Some(point) => point,
            None => {
                let metrics = self
                    .execute_session(page::GetLayoutMetricsParams {}, session_id.clone(), target_id.clone())
                    .await?;
                (
                    metrics.css_visual_viewport.client_width / 2.0,
                    metrics.css_visual_viewport.client_height / 2.0,
                )
            }
        };
        let (dx, dy) = match direction {
            ScrollDirection::Up => (0.0, -amount),
            ScrollDirection::Down => (0.0, amount),
            ScrollDirection::Left => (-amount, 0.0),
            ScrollDirection::Right => (amount, 0.0),
        };
        self.execute_session(
            input::DispatchMouseEventParams::wheel_at(x, y, dx, dy),
            session_id,
            target_id,
        )
            .await?;
        Ok(())
    }

    pub async fn capture_screenshot(
        &self,
        session_id: SessionId,
        target_id: TargetId,
        format: crate::config::ScreenshotFormat,
        quality: u8,
        full_page: bool,
    ) -> Result<Vec<u8>> {
        let format = match format {
            crate::config::ScreenshotFormat::Jpeg => page::ScreenshotFormat::Jpeg,
            crate::config::ScreenshotFormat::Png => page::ScreenshotFormat::Png,
        };
        let resp = self
            .execute_session(
            page::CaptureScreenshotParams {
                format,
                quality: Some(quality as i64),
                clip: None,
                capture_beyond_viewport: full_page,
            },
            session_id,
            target_id,
        )
            .await?;
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(resp.data.as_bytes())
            .map_err(|e| CdpError::msg(format!("invalid screenshot payload: {e}")))
    }

    pub async fn navigate(&self, session_id: SessionId, target_id: TargetId, url: &str, wait: bool) -> Result<()> {
        self.execute_session(page::NavigateParams::new(url), session_id.clone(), target_id.clone())
            .await?;
        if wait {
            self.wait_for_load(session_id, target_id, self.config.page_load_timeout).await?;
        }
        Ok(())
    }

    pub async fn wait_for_load(&self, session_id: SessionId, target_id: TargetId, timeout: Duration) -> Result<()> {
        use cdp_agent_protocol::CdpEvent;

        let mut events = self.handle.subscribe();
        let wait_for_fired = async {
            loop {
                match events.recv().await {
                    Ok((sid, CdpEvent::LoadEventFired(_))) if sid.as_ref() == Some(&session_id) => return,
                    Ok(_) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        };
        tokio::time::timeout(timeout, wait_for_fired)
            .await
            .map_err(|_| CdpError::Timeout(timeout))?;

        // Short network-idle window: give in-flight requests a brief chance
        // to settle before treating the page as loaded.
        let idle_window = Duration::from_millis(300);
        let network_idle = async {
            loop {
                match events.recv().await {
                    Ok((sid, CdpEvent::LoadingFinished(_) | CdpEvent::LoadingFailed(_)))
                    if sid.as_ref() == Some(&session_id) =>
                    {
                        continue
                    }
                    Ok(_) => continue,
                    Err(_) => return,
                }
            }
        };
        let _ = tokio::time::timeout(idle_window, network_idle).await;

        // Final guard only: `document.readyState`, not the primary signal.
        let _ = self
            .execute_session(
            runtime::EvaluateParams::new("document.readyState === 'complete'"),
            session_id,
            target_id,
        )
            .await;
        Ok(())
    }

    pub async fn highlight_node(
        &self,
        session_id: SessionId,
        target_id: TargetId,
        backend_node_id: BackendNodeId,
        duration: Duration,
    ) -> Result<()> {
        let needs_enable = {
            let mut guard = self.overlay_enabled.lock().unwrap();
            guard.insert(session_id.clone())
        };
        if needs_enable {
            self.execute_session(overlay::EnableParams {}, session_id.clone(), target_id.clone())
                .await?;
        }

        self.execute_session(
            overlay::HighlightNodeParams::new(backend_node_id),
            session_id.clone(),
            target_id.clone(),
        )
            .await?;

        let client = self.clone();
        let handle = tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                let _ = client
                    .execute_session(overlay::HideHighlightParams {}, session_id, target_id)
                    .await;
        });
        let mut background_tasks = self.background_tasks.lock().unwrap();
        background_tasks.retain(|task| !task.is_finished());
        background_tasks.push(handle);
        Ok(())
    }

    pub async fn go_back(&self, session_id: SessionId, target_id: TargetId) -> Result<()> {
        self.navigate_history(session_id, target_id, -1).await
    }

    pub async fn go_forward(&self, session_id: SessionId, target_id: TargetId) -> Result<()> {
        self.navigate_history(session_id, target_id, 1).await
    }

    /// `current_index` is a position into `entries`, not an entry id — the
    /// id is a separate handle `navigateToHistoryEntry` expects.
    async fn navigate_history(&self, session_id: SessionId, target_id: TargetId, delta: i64) -> Result<()> {
        let history = self
            .execute_session(page::GetNavigationHistoryParams {}, session_id.clone(), target_id.clone())
            .await?;
        let target_index = history.current_index + delta;
        let entry = usize::try_from(target_index)
            .ok()
            .and_then(|idx| history.entries.get(idx))
            .ok_or(CdpError::NotFound(0))?;
        self.execute_session(
            page::NavigateToHistoryEntryParams { entry_id: entry.id },
            session_id,
            target_id,
        )
            .await?;
        Ok(())
    }

    pub async fn refresh(&self, session_id: SessionId, target_id: TargetId) -> Result<()> {
        self.execute_session(page::ReloadParams::default(), session_id, target_id)
            .await?;
        Ok(())
    }

    pub async fn get_current_url(&self, target_id: &TargetId) -> Result<String> {
        self.registry
            .target_url(target_id)
            .ok_or_else(|| CdpError::msg("unknown target"))
    }
}

