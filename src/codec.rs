//! Wire codec: turns outbound `(method, session, params)` triples
//! into the `MethodCall` envelope with a freshly minted [`CallId`], and
//! turns inbound JSON frames into either a command response or an event.
//!
//! The codec owns the pending-command table. It
//! never touches a socket — that's the transport's job — it only
//! knows how to encode/decode JSON and correlate `id` ↔ completion slot.

use std::borrow::Cow;

use fnv::FnvHashMap;
use futures::channel::oneshot;
use serde_json::Value;

use cdp_agent_protocol::target::SessionId;
use cdp_agent_wire::{CallId, MethodCall, Response};

use crate::error::CdpError;

/// What arrived off the wire, decoded one level past raw JSON.
pub enum Frame {
    Response(Response),
    Event {
        session_id: Option<SessionId>,
        method: String,
        params: Value,
    },
}

type Completion = oneshot::Sender<std::result::Result<Response, CdpError>>;

/// The pending-command table plus a monotonic id counter. A response whose
/// `id` is unknown is logged and discarded (it may belong to a cancelled or
/// already-timed-out command).
#[derive(Default)]
pub struct Codec {
    next_id: usize,
    pending: FnvHashMap<CallId, (Option<SessionId>, Completion)>,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh `CallId`, records the pending command, and returns the
    /// outbound envelope to serialize plus a receiver for the eventual
    /// response.
    pub fn submit(
        &mut self,
        method: Cow<'static, str>,
        session_id: Option<SessionId>,
        params: Value,
    ) -> (MethodCall, oneshot::Receiver<std::result::Result<Response, CdpError>>) {
        let id = CallId::new(self.next_id);
        self.next_id += 1;
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, (session_id.clone(), tx));
        let call = MethodCall {
            id,
            session_id: session_id.map(|s| s.0),
            method,
            params,
        };
        (call, rx)
    }

    /// Routes a decoded response to its waiting completion slot. Returns
    /// `false` if no command with this id was pending.
    pub fn resolve(&mut self, resp: Response) -> bool {
        if let Some((_, tx)) = self.pending.remove(&resp.id) {
            let _ = tx.send(Ok(resp));
            true
        } else {
            false
        }
    }

    /// Removes a pending entry without resolving it — used on a per-call
    /// timeout so a late response is discarded rather
    /// than delivered to a requester who already gave up.
    pub fn cancel(&mut self, id: CallId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Fails every outstanding command for one session with `SessionLost`
    ///.
    pub fn fail_session(&mut self, session_id: &SessionId) {
        let dead: Vec<CallId> = self
            .pending
            .iter()
            .filter(|(_, (sid, _))| sid.as_ref() == Some(session_id))
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            if let Some((_, tx)) = self.pending.remove(&id) {
                let _ = tx.send(Err(CdpError::SessionLost));
            }
        }
    }

    /// Fails every outstanding command atomically — used when the
    /// transport closes.
    pub fn fail_all(&mut self) {
        for (_, (_, tx)) in self.pending.drain() {
            let _ = tx.send(Err(CdpError::ConnectionClosed));
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

pub fn encode(call: &MethodCall) -> std::result::Result<String, CdpError> {
    Ok(serde_json::to_string(call)?)
}

/// Decodes one inbound text frame. A frame with an `id` field is a command
/// response; anything else is an event.
pub fn decode(text: &str) -> std::result::Result<Frame, CdpError> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("id").is_some() {
        let resp: Response = serde_json::from_value(value)?;
        Ok(Frame::Response(resp))
    } else {
        let method = value
            .get("method")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();
        let session_id = value
            .get("sessionId")
            .and_then(|s| s.as_str())
            .map(SessionId::from);
        let params = value.get("params").cloned().unwrap_or(Value::Null);
        Ok(Frame::Event {
                session_id,
                method,
                params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_response_frame() {
        let text = r#"{"id":3,"result":{"ok":true}}"#;
        match decode(text).unwrap() {
            Frame::Response(resp) => {
                assert_eq!(resp.id, CallId::new(3));
                assert!(resp.result.is_some());
            }
            Frame::Event {.. } => panic!("expected response"),
        }
    }

    #[test]
    fn decodes_event_frame_with_session() {
        let text = r#"{"method":"Page.loadEventFired","sessionId":"S1","params":{}}"#;
        match decode(text).unwrap() {
            Frame::Event {
                session_id, method,..
            } => {
                assert_eq!(method, "Page.loadEventFired");
                assert_eq!(session_id, Some(SessionId::from("S1")));
            }
            Frame::Response(_) => panic!("expected event"),
        }
    }

    #[test]
    fn unknown_response_id_is_not_resolved() {
        let mut codec = Codec::new();
        let resp = Response {
            id: CallId::new(99),
            result: Some(Value::Bool(true)),
            error: None,
        };
        assert!(!codec.resolve(resp));
    }

    #[test]
    fn submit_then_resolve_round_trips() {
        let mut codec = Codec::new();
        let (_call, rx) = codec.submit("Page.enable".into(), None, Value::Null);
        let id = CallId::new(0);
        codec.resolve(Response {
                id,
                result: Some(Value::Bool(true)),
                error: None,
        });
        let resolved = futures::executor::block_on(rx).unwrap().unwrap();
        assert_eq!(resolved.id, id);
    }

    #[test]
    fn fail_session_only_touches_matching_pending_commands() {
        let mut codec = Codec::new();
        let (_c1, rx1) = codec.submit("A".into(), Some(SessionId::from("S1")), Value::Null);
        let (_c2, rx2) = codec.submit("B".into(), Some(SessionId::from("S2")), Value::Null);
        codec.fail_session(&SessionId::from("S1"));

        assert!(futures::executor::block_on(rx1).unwrap().is_err());
        assert_eq!(codec.pending_len(), 1);
        drop(rx2);
    }
}

