//! Session & frame registry: the routing table mapping CDP frames →
//! targets → sessions, with lifecycle events from the browser.
//!
//! A pure data structure protected by a single mutex — the sole point of
//! synchronization in the crate. Every mutation that
//! cascades (removing a target removes its session and its frames) happens
//! under one lock acquisition so the cascade is atomic from a reader's
//! point of view.

use std::collections::HashSet;
use std::sync::Mutex;

use fnv::FnvHashMap;

use cdp_agent_protocol::page::FrameId;
use cdp_agent_protocol::target::{SessionId, TargetId, TargetType};

/// A browser tab or OOPIF.
#[derive(Debug, Clone)]
pub struct Target {
    pub target_id: TargetId,
    pub target_type: TargetType,
    pub url: String,
    pub session_id: Option<SessionId>,
}

/// An attached protocol channel to a target.
///
/// Detached sessions are removed outright rather than left tombstoned in
/// this map — `is_active` is represented by membership in `sessions`, so a
/// lookup miss *is* the tombstone.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: SessionId,
    pub target_id: TargetId,
}

/// A renderer frame. Owned by exactly one target at a time;
/// the mapping is mutable across cross-origin navigations.
#[derive(Debug, Clone)]
pub struct Frame {
    pub frame_id: FrameId,
    pub target_id: TargetId,
    pub parent_frame_id: Option<FrameId>,
    pub url: String,
    pub origin: String,
}

fn origin_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .map(|u| u.origin().ascii_serialization())
        .unwrap_or_else(|| url.to_string())
}

#[derive(Debug, Default)]
struct Inner {
    targets: FnvHashMap<TargetId, Target>,
    sessions: FnvHashMap<SessionId, Session>,
    frames: FnvHashMap<FrameId, Frame>,
    /// Secondary index so `session_for_origin` doesn't linearly scan every
    /// frame on every lookup.
    origin_targets: FnvHashMap<String, HashSet<TargetId>>,
}

/// The registry. Cheap to construct, intended to be wrapped in an `Arc` and
/// shared between the handler task and anything that needs to resolve a
/// frame or origin to a session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&self, target: Target) {
        let mut inner = self.inner.lock().unwrap();
        inner.targets.insert(target.target_id.clone(), target);
    }

    /// Removes a target and cascades: its attached session and any frames
    /// it currently owns are removed too.
    pub fn remove_target(&self, target_id: &TargetId) -> Option<Target> {
        let mut inner = self.inner.lock().unwrap();
        let target = inner.targets.remove(target_id)?;
        if let Some(session_id) = &target.session_id {
            inner.sessions.remove(session_id);
        }
        let dead: Vec<FrameId> = inner
            .frames
            .iter()
            .filter(|(_, f)| &f.target_id == target_id)
            .map(|(id, _)| id.clone())
            .collect();
        for frame_id in dead {
            if let Some(frame) = inner.frames.remove(&frame_id) {
                if let Some(set) = inner.origin_targets.get_mut(&frame.origin) {
                    set.remove(&frame.target_id);
                }
            }
        }
        Some(target)
    }

    pub fn attach_session(&self, session_id: SessionId, target_id: TargetId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(target) = inner.targets.get_mut(&target_id) {
            target.session_id = Some(session_id.clone());
        }
        inner.sessions.insert(
            session_id.clone(),
            Session {
                session_id,
                target_id,
            },
        );
    }

    /// Tombstones the session (removes it outright) and cascades: the
    /// owning target's `session_id` is cleared. Callers that hold pending
    /// commands for this session are expected to fail them with
    /// `SessionLost` themselves — the registry only owns routing data.
    pub fn detach_session(&self, session_id: &SessionId) -> Option<Session> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner.sessions.remove(session_id)?;
        if let Some(target) = inner.targets.get_mut(&session.target_id) {
            if target.session_id.as_ref() == Some(session_id) {
                target.session_id = None;
            }
        }
        Some(session)
    }

    pub fn is_session_active(&self, session_id: &SessionId) -> bool {
        self.inner.lock().unwrap().sessions.contains_key(session_id)
    }

    pub fn upsert_frame(
        &self,
        frame_id: FrameId,
        target_id: TargetId,
        parent_frame_id: Option<FrameId>,
        url: String,
    ) {
        let mut inner = self.inner.lock().unwrap();
        let origin = origin_of(&url);

        if let Some(existing) = inner.frames.get(&frame_id) {
            if existing.origin != origin {
                if let Some(set) = inner.origin_targets.get_mut(&existing.origin) {
                    set.remove(&existing.target_id);
                }
            }
        }

        inner
            .origin_targets
            .entry(origin.clone())
            .or_default()
            .insert(target_id.clone());

        inner.frames.insert(
            frame_id.clone(),
            Frame {
                frame_id,
                target_id,
                parent_frame_id,
                url,
                origin,
            },
        );
    }

    pub fn remove_frame(&self, frame_id: &FrameId) -> Option<Frame> {
        let mut inner = self.inner.lock().unwrap();
        let frame = inner.frames.remove(frame_id)?;
        if let Some(set) = inner.origin_targets.get_mut(&frame.origin) {
            set.remove(&frame.target_id);
        }
        Some(frame)
    }

    /// Resolves a frame id to the session currently attached to its owning
    /// target, if any.
    pub fn session_for_frame(&self, frame_id: &FrameId) -> Option<SessionId> {
        let inner = self.inner.lock().unwrap();
        let frame = inner.frames.get(frame_id)?;
        inner.targets.get(&frame.target_id)?.session_id.clone()
    }

    /// Resolves an origin to any one attached session whose target owns a
    /// frame of that origin. Used to route actions on out-of-process
    /// iframes to the correct session (S4).
    pub fn session_for_origin(&self, origin: &str) -> Option<SessionId> {
        let inner = self.inner.lock().unwrap();
        let target_ids = inner.origin_targets.get(origin)?;
        target_ids
            .iter()
            .find_map(|tid| inner.targets.get(tid).and_then(|t| t.session_id.clone()))
    }

    /// The session of the first attached page-typed target — the "main
    /// tab" a fresh client talks to before any navigation creates iframes.
    pub fn root_page_session(&self) -> Option<SessionId> {
        let inner = self.inner.lock().unwrap();
        inner
            .targets
            .values()
            .find(|t| matches!(t.target_type, TargetType::Page))
            .and_then(|t| t.session_id.clone())
    }

    pub fn target_for_session(&self, session_id: &SessionId) -> Option<TargetId> {
        let inner = self.inner.lock().unwrap();
        inner.sessions.get(session_id).map(|s| s.target_id.clone())
    }

    /// All attached sessions on a page or iframe target, paired with
    /// a frame depth: 0 for the root page target, 1 for everything else.
    /// Out-of-process iframes are full `Target`s in their own right, so this is a flat pass over targets rather than a frame
    /// tree walk — good enough for the serializer's indentation,
    /// which only needs "nested or not".
    pub fn attached_page_sessions(&self) -> Vec<(SessionId, TargetId, usize)> {
        let inner = self.inner.lock().unwrap();
        inner
            .targets
            .values()
            .filter(|t| matches!(t.target_type, TargetType::Page | TargetType::Iframe))
            .filter_map(|t| {
                let session_id = t.session_id.clone()?;
                let depth = usize::from(!matches!(t.target_type, TargetType::Page));
                Some((session_id, t.target_id.clone(), depth))
        })
            .collect()
    }

    pub fn set_target_url(&self, target_id: &TargetId, url: String) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(target) = inner.targets.get_mut(target_id) {
            target.url = url;
        }
    }

    pub fn target_url(&self, target_id: &TargetId) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .targets
            .get(target_id)
            .map(|t| t.url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str) -> Target {
        Target {
            target_id: TargetId::from(id),
            target_type: TargetType::Page,
            url: "about:blank".into(),
            session_id: None,
        }
    }

    #[test]
    fn attach_links_session_and_target_both_ways() {
        let reg = SessionRegistry::new();
        reg.add_target(target("T1"));
        reg.attach_session(SessionId::from("S1"), TargetId::from("T1"));

        assert!(reg.is_session_active(&SessionId::from("S1")));
        assert_eq!(reg.target_for_session(&SessionId::from("S1")), Some(TargetId::from("T1")));
    }

    #[test]
    fn removing_target_cascades_session_and_frames() {
        let reg = SessionRegistry::new();
        reg.add_target(target("T1"));
        reg.attach_session(SessionId::from("S1"), TargetId::from("T1"));
        reg.upsert_frame(
            FrameId::from("F1".to_string()),
            TargetId::from("T1"),
            None,
            "https://example.com/".into(),
        );

        reg.remove_target(&TargetId::from("T1"));

        assert!(!reg.is_session_active(&SessionId::from("S1")));
        assert_eq!(reg.session_for_frame(&FrameId::from("F1".to_string())), None);
        assert_eq!(reg.session_for_origin("https://example.com"), None);
    }

    #[test]
    fn detach_session_clears_target_back_reference() {
        let reg = SessionRegistry::new();
        reg.add_target(target("T1"));
        reg.attach_session(SessionId::from("S1"), TargetId::from("T1"));

        let detached = reg.detach_session(&SessionId::from("S1"));
        assert!(detached.is_some());
        assert_eq!(reg.root_page_session(), None);
    }

    #[test]
    fn session_for_origin_uses_secondary_index() {
        let reg = SessionRegistry::new();
        reg.add_target(target("T1"));
        reg.attach_session(SessionId::from("S1"), TargetId::from("T1"));
        reg.upsert_frame(
            FrameId::from("F1".to_string()),
            TargetId::from("T1"),
            None,
            "https://iframe.example/page".into(),
        );

        assert_eq!(
            reg.session_for_origin("https://iframe.example"),
            Some(SessionId::from("S1"))
        );
    }
}

