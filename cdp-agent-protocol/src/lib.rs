//! Hand-written CDP domain bindings for the subset of the protocol this
//! crate's client drives: `Target`, `Page`, `DOM`, `DOMSnapshot`,
//! `Accessibility`, `Runtime`, `Network`, `Input`, `Overlay`.
//!
//! Unlike a full PDL-generated binding, this crate only declares the
//! commands, parameters and events the client actually issues or listens
//! for. Each module mirrors one CDP domain.

pub mod accessibility;
pub mod dom;
pub mod dom_snapshot;
pub mod input;
pub mod network;
pub mod overlay;
pub mod page;
pub mod runtime;
pub mod target;

use cdp_agent_wire::Method;

/// The event side of the protocol, normalized into one enum so the codec
/// can hand a single type to the registry/handler regardless of domain.
///
/// There is no PDL build step in this crate, so this enum and its `parse`
/// constructor are hand-written, matched against the wire `method` string.
#[derive(Debug, Clone)]
pub enum CdpEvent {
    TargetCreated(target::EventTargetCreated),
    TargetDestroyed(target::EventTargetDestroyed),
    TargetCrashed(target::EventTargetCrashed),
    AttachedToTarget(target::EventAttachedToTarget),
    DetachedFromTarget(target::EventDetachedFromTarget),
    TargetInfoChanged(target::EventTargetInfoChanged),
    FrameAttached(page::EventFrameAttached),
    FrameNavigated(page::EventFrameNavigated),
    FrameDetached(page::EventFrameDetached),
    LoadEventFired(page::EventLoadEventFired),
    LoadingFinished(network::EventLoadingFinished),
    LoadingFailed(network::EventLoadingFailed),
    /// Anything else the browser sends that this client doesn't act on.
    /// Kept (rather than dropped at the transport) so `tracing` can log
    /// unrecognized methods without the codec discarding information.
    Other {
        method: String,
        params: serde_json::Value,
    },
}

impl CdpEvent {
    /// Parse an event frame's `(method, params)` into a typed variant.
    /// Unknown methods fall back to `Other` rather than erroring — new CDP
    /// events show up constantly and an unrecognized one is not a protocol
    /// violation.
    pub fn parse(method: &str, params: serde_json::Value) -> Self {
        let parsed = match method {
            "Target.targetCreated" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::TargetCreated)
            }
            "Target.targetDestroyed" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::TargetDestroyed)
            }
            "Target.targetCrashed" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::TargetCrashed)
            }
            "Target.attachedToTarget" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::AttachedToTarget)
            }
            "Target.detachedFromTarget" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::DetachedFromTarget)
            }
            "Target.targetInfoChanged" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::TargetInfoChanged)
            }
            "Page.frameAttached" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::FrameAttached)
            }
            "Page.frameNavigated" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::FrameNavigated)
            }
            "Page.frameDetached" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::FrameDetached)
            }
            "Page.loadEventFired" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::LoadEventFired)
            }
            "Network.loadingFinished" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::LoadingFinished)
            }
            "Network.loadingFailed" => {
                serde_json::from_value(params.clone()).ok().map(CdpEvent::LoadingFailed)
            }
            _ => None,
        };
        parsed.unwrap_or(CdpEvent::Other {
            method: method.to_string(),
            params,
        })
    }
}

impl Method for CdpEvent {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        match self {
            CdpEvent::TargetCreated(_) => "Target.targetCreated".into(),
            CdpEvent::TargetDestroyed(_) => "Target.targetDestroyed".into(),
            CdpEvent::TargetCrashed(_) => "Target.targetCrashed".into(),
            CdpEvent::AttachedToTarget(_) => "Target.attachedToTarget".into(),
            CdpEvent::DetachedFromTarget(_) => "Target.detachedFromTarget".into(),
            CdpEvent::TargetInfoChanged(_) => "Target.targetInfoChanged".into(),
            CdpEvent::FrameAttached(_) => "Page.frameAttached".into(),
            CdpEvent::FrameNavigated(_) => "Page.frameNavigated".into(),
            CdpEvent::FrameDetached(_) => "Page.frameDetached".into(),
            CdpEvent::LoadEventFired(_) => "Page.loadEventFired".into(),
            CdpEvent::LoadingFinished(_) => "Network.loadingFinished".into(),
            CdpEvent::LoadingFailed(_) => "Network.loadingFailed".into(),
            CdpEvent::Other { method, .. } => method.clone().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_event() {
        let params = serde_json::json!({"sessionId": "S1", "targetId": "T1"});
        let ev = CdpEvent::parse("Target.detachedFromTarget", params);
        assert!(matches!(ev, CdpEvent::DetachedFromTarget(_)));
    }

    #[test]
    fn falls_back_to_other_for_unknown_method() {
        let ev = CdpEvent::parse("Debugger.paused", serde_json::json!({}));
        assert!(matches!(ev, CdpEvent::Other { .. }));
        assert_eq!(ev.identifier(), "Debugger.paused");
    }
}
