//! The CDP client's background task.
//!
//! Exactly one task owns reads from the WebSocket and dispatches to the
//! codec; this module is that task. It is the sole
//! writer of the [`Codec`]'s pending-command table; the [`SessionRegistry`]
//! is shared more broadly (readers elsewhere take its lock directly) but
//! every *event-driven* mutation of it — the cascades in — happens
//! here, in response to `Target`/`Page` events, so that registry state and
//! pending-command failures stay consistent with each other.

use std::borrow::Cow;
use std::sync::Arc;

use futures::channel::mpsc::UnboundedReceiver as FutUnboundedReceiver;
use futures::channel::oneshot;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::broadcast;

use cdp_agent_protocol::target::{SessionId, TargetId, TargetType};
use cdp_agent_protocol::CdpEvent;
use cdp_agent_wire::{CallId, Response};

use crate::codec::{self, Codec, Frame};
use crate::error::CdpError;
use crate::registry::{SessionRegistry, Target as RegistryTarget};
use crate::transport::Transport;

pub mod commandfuture;

/// A request submitted to the handler task from any client-facing task.
pub enum HandlerMessage {
    Send {
        method: Cow<'static, str>,
        session_id: Option<SessionId>,
        params: Value,
        respond: oneshot::Sender<(CallId, oneshot::Receiver<Result<Response, CdpError>>)>,
    },
    Cancel(CallId),
    Close,
}

/// Broadcast capacity for the event fan-out. Sized generously since a slow
/// subscriber (e.g. a `wait_for_load` caller who isn't polling yet) should
/// not cause events to be dropped under normal page-load event volume.
const EVENT_BROADCAST_CAPACITY: usize = 1024;

pub struct Handler {
    codec: Codec,
    registry: Arc<SessionRegistry>,
    inbound: FutUnboundedReceiver<String>,
    requests: tokio::sync::mpsc::UnboundedReceiver<HandlerMessage>,
    outbound: futures::channel::mpsc::UnboundedSender<String>,
    events: broadcast::Sender<(Option<SessionId>, CdpEvent)>,
}

/// Handle used by client-facing code to talk to the running [`Handler`]
/// task and to observe its event stream.
#[derive(Clone)]
pub struct HandlerHandle {
    requests: tokio::sync::mpsc::UnboundedSender<HandlerMessage>,
    events: broadcast::Sender<(Option<SessionId>, CdpEvent)>,
    pub registry: Arc<SessionRegistry>,
}

impl HandlerHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<(Option<SessionId>, CdpEvent)> {
        self.events.subscribe()
    }

    /// Submits a command and returns its `CallId` (for timeout-driven
    /// cancellation) plus a receiver for the eventual response.
    pub async fn submit(
        &self,
        method: Cow<'static, str>,
        session_id: Option<SessionId>,
        params: Value,
    ) -> Result<(CallId, oneshot::Receiver<Result<Response, CdpError>>), CdpError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(HandlerMessage::Send {
                method,
                session_id,
                params,
                respond: tx,
        })
            .map_err(|_| CdpError::ConnectionClosed)?;
        rx.await.map_err(|_| CdpError::ConnectionClosed)
    }

    pub fn cancel(&self, id: CallId) {
        let _ = self.requests.send(HandlerMessage::Cancel(id));
    }

    pub fn close(&self) {
        let _ = self.requests.send(HandlerMessage::Close);
    }
}

impl Handler {
    /// Spawns the handler task and returns a handle to it. Also sends the
    /// initial `Target.setDiscoverTargets` + `Target.setAutoAttach` pair
    /// so the registry starts populating immediately.
    pub fn spawn(mut transport: Transport) -> (HandlerHandle, tokio::task::JoinHandle<()>) {
        let registry = Arc::new(SessionRegistry::new());
        let inbound = transport.take_receiver().expect("transport receiver taken twice");
        let outbound = transport.sender();
        let (req_tx, req_rx) = tokio::sync::mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_BROADCAST_CAPACITY);

        let handle = HandlerHandle {
            requests: req_tx,
            events: events_tx.clone(),
            registry: registry.clone(),
        };

        let mut handler = Handler {
            codec: Codec::new(),
            registry,
            inbound,
            requests: req_rx,
            outbound,
            events: events_tx,
        };

        let join = tokio::spawn(async move {
                // Keep `transport` alive for the lifetime of the task so its
                // reader/writer aren't dropped out from under the channels.
                let _transport = transport;
                handler.bootstrap();
                handler.run().await;
        });

        (handle, join)
    }

    fn bootstrap(&mut self) {
        use cdp_agent_protocol::target::SetDiscoverTargetsParams;
        let discover = SetDiscoverTargetsParams { discover: true };
        self.send_raw("Target.setDiscoverTargets".into(), None, serde_json::to_value(discover).unwrap());

        use cdp_agent_protocol::target::SetAutoAttachParams;
        let auto_attach = SetAutoAttachParams::new(true, false, true);
        self.send_raw("Target.setAutoAttach".into(), None, serde_json::to_value(auto_attach).unwrap());
    }

    fn send_raw(&mut self, method: Cow<'static, str>, session_id: Option<SessionId>, params: Value) {
        let (call, _rx) = self.codec.submit(method, session_id, params);
        if let Ok(text) = codec::encode(&call) {
            let _ = self.outbound.unbounded_send(text);
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                msg = self.requests.recv() => {
                    match msg {
                        Some(HandlerMessage::Send { method, session_id, params, respond }) => {
                            let (call, rx) = self.codec.submit(method, session_id, params);
                            match codec::encode(&call) {
                                Ok(text) => {
                                    if self.outbound.unbounded_send(text).is_err() {
                                        self.codec.cancel(call.id);
                                        // receiver drop will surface ConnectionClosed to the caller
                                    }
                                }
                                Err(_) => {
                                    self.codec.cancel(call.id);
                                }
                            }
                            let _ = respond.send((call.id, rx));
                        }
                        Some(HandlerMessage::Cancel(id)) => {
                            self.codec.cancel(id);
                        }
                        Some(HandlerMessage::Close) | None => {
                            self.codec.fail_all();
                            break;
                        }
                    }
                }
                frame = self.inbound.next() => {
                    match frame {
                        Some(text) => self.on_frame(&text),
                        None => {
                            self.codec.fail_all();
                            break;
                        }
                    }
                }
            }
        }
    }

    fn on_frame(&mut self, text: &str) {
        match codec::decode(text) {
            Ok(Frame::Response(resp)) => {
                if !self.codec.resolve(resp) {
                    tracing::warn!("response for unknown or cancelled command id");
                }
            }
            Ok(Frame::Event { session_id, method, params }) => {
                self.on_event(session_id, method, params);
            }
            Err(err) => {
                tracing::warn!(%err, "failed to decode inbound frame");
            }
        }
    }

    fn on_event(&mut self, session_id: Option<SessionId>, method: String, params: Value) {
        let event = CdpEvent::parse(&method, params);

        match &event {
            CdpEvent::TargetCreated(ev) => {
                self.registry.add_target(RegistryTarget {
                        target_id: ev.target_info.target_id.clone(),
                        target_type: ev.target_info.target_type,
                        url: ev.target_info.url.clone(),
                        session_id: None,
                });
            }
            CdpEvent::TargetDestroyed(ev) => {
                if let Some(target) = self.registry.remove_target(&ev.target_id) {
                    if let Some(session_id) = target.session_id {
                        self.codec.fail_session(&session_id);
                    }
                }
            }
            CdpEvent::TargetInfoChanged(ev) => {
                self.registry.set_target_url(&ev.target_info.target_id, ev.target_info.url.clone());
            }
            CdpEvent::AttachedToTarget(ev) => {
                if self.registry.target_url(&ev.target_info.target_id).is_none() {
                    self.registry.add_target(RegistryTarget {
                            target_id: ev.target_info.target_id.clone(),
                            target_type: ev.target_info.target_type,
                            url: ev.target_info.url.clone(),
                            session_id: None,
                    });
                }
                self.registry
                    .attach_session(ev.session_id.clone(), ev.target_info.target_id.clone());
                if matches!(ev.target_info.target_type, TargetType::Page | TargetType::Iframe) {
                    self.enable_domains(ev.session_id.clone());
                }
            }
            CdpEvent::DetachedFromTarget(ev) => {
                self.registry.detach_session(&ev.session_id);
                self.codec.fail_session(&ev.session_id);
            }
            CdpEvent::FrameAttached(ev) => {
                if let Some(session_id) = &session_id {
                    if let Some(target_id) = self.registry.target_for_session(session_id) {
                        self.registry.upsert_frame(
                            ev.frame_id.clone(),
                            target_id,
                            ev.parent_frame_id.clone(),
                            String::new(),
                        );
                    }
                }
            }
            CdpEvent::FrameNavigated(ev) => {
                if let Some(session_id) = &session_id {
                    if let Some(target_id) = self.registry.target_for_session(session_id) {
                        self.registry.upsert_frame(
                            ev.frame.id.clone(),
                            target_id.clone(),
                            ev.frame.parent_id.clone(),
                            ev.frame.url.clone(),
                        );
                        if ev.frame.parent_id.is_none() {
                            self.registry.set_target_url(&target_id, ev.frame.url.clone());
                        }
                    }
                }
            }
            CdpEvent::FrameDetached(ev) => {
                self.registry.remove_frame(&ev.frame_id);
            }
            CdpEvent::LoadEventFired(_) | CdpEvent::LoadingFinished(_) | CdpEvent::LoadingFailed(_) => {}
            CdpEvent::TargetCrashed(_) | CdpEvent::Other {.. } => {}
        }

        let _ = self.events.send((session_id, event));
    }

    /// Enables the fixed set of domains needed on every new
    /// page-typed session. `Overlay` is deliberately not in this
    /// list — it's enabled lazily on first highlight.
    fn enable_domains(&mut self, session_id: SessionId) {
        use cdp_agent_protocol::{network, page, runtime};
        // DOM, DOMSnapshot and Accessibility need no explicit `.enable` in
        // the subset this crate binds; the collector calls them
        // directly.
        self.send_raw(
            "Page.enable".into(),
            Some(session_id.clone()),
            serde_json::to_value(page::EnableParams {}).unwrap(),
        );
        self.send_raw(
            "Runtime.enable".into(),
            Some(session_id.clone()),
            serde_json::to_value(runtime::EnableParams {}).unwrap(),
        );
        self.send_raw(
            "Network.enable".into(),
            Some(session_id),
            serde_json::to_value(network::EnableParams {}).unwrap(),
        );
    }
}

pub use commandfuture::await_response;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Transport;

    fn attached_to_target_frame(session_id: &str, target_id: &str) -> String {
        format!(
            r#"{{"method":"Target.attachedToTarget","params":{{
                    "sessionId":"{session_id}",
                    "targetInfo":{{"targetId":"{target_id}","type":"page","title":"","url":"https://example.com/","attached":true}},
                    "waitingForDebugger":false
    }}}}"#
)
}

#[tokio::test]
async fn dispatches_command_and_resolves_response() {
    let (transport, server_to_client, mut client_to_server) = Transport::fake();
    let (handle, _join) = Handler::spawn(transport);

    // Drain the two bootstrap commands (setDiscoverTargets, setAutoAttach).
    let _ = client_to_server.next().await.unwrap();
    let _ = client_to_server.next().await.unwrap();

    let submit_handle = handle.clone();
    let submit_task = tokio::spawn(async move {
            submit_handle.submit("Page.enable".into(), None, serde_json::Value::Null).await
    });

    let outbound = client_to_server.next().await.unwrap();
    let sent: serde_json::Value = serde_json::from_str(&outbound).unwrap();
    let id = sent["id"].as_u64().unwrap();

    server_to_client
        .unbounded_send(format!(r#"{{"id":{id},"result":{{}}}}"#))
        .unwrap();

    let (_call_id, rx) = submit_task.await.unwrap().unwrap();
    let resp = rx.await.unwrap().unwrap();
    assert!(resp.result.is_some());

    handle.close();
}

#[tokio::test]
async fn attached_to_target_event_populates_registry_and_enables_domains() {
    let (transport, server_to_client, mut client_to_server) = Transport::fake();
    let (handle, _join) = Handler::spawn(transport);
    let _ = client_to_server.next().await.unwrap(); // setDiscoverTargets
    let _ = client_to_server.next().await.unwrap(); // setAutoAttach

    server_to_client
        .unbounded_send(attached_to_target_frame("S1", "T1"))
        .unwrap();

    // enable_domains fires Page.enable / Runtime.enable / Network.enable.
    for _ in 0..3 {
        let _ = client_to_server.next().await.unwrap();
    }

    assert!(handle.registry.is_session_active(&SessionId::from("S1")));
    assert_eq!(handle.registry.target_for_session(&SessionId::from("S1")), Some(TargetId::from("T1")));

    handle.close();
}

#[tokio::test]
async fn detached_from_target_fails_pending_commands_with_session_lost() {
    let (transport, server_to_client, mut client_to_server) = Transport::fake();
    let (handle, _join) = Handler::spawn(transport);
    let _ = client_to_server.next().await.unwrap();
    let _ = client_to_server.next().await.unwrap();

    server_to_client
        .unbounded_send(attached_to_target_frame("S1", "T1"))
        .unwrap();
    for _ in 0..3 {
        let _ = client_to_server.next().await.unwrap();
    }

    let (_id, rx) = handle
        .submit("DOM.getDocument".into(), Some(SessionId::from("S1")), serde_json::Value::Null)
        .await
        .unwrap();
    let _ = client_to_server.next().await.unwrap();

    server_to_client
        .unbounded_send(r#"{"method":"Target.detachedFromTarget","params":{"sessionId":"S1"}}"#.to_string())
        .unwrap();

    let result = rx.await.unwrap();
    assert!(matches!(result, Err(CdpError::SessionLost)));
    assert!(!handle.registry.is_session_active(&SessionId::from("S1")));

    handle.close();
}
}

