//! `Target` domain: https://chromedevtools.github.io/devtools-protocol/tot/Target/

use std::borrow::Cow;

use cdp_agent_wire::{Command, Method};
use serde::{Deserialize, Serialize};

macro_rules! newtype_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_id!(TargetId);
newtype_id!(SessionId);
newtype_id!(BrowserContextId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Page,
    Iframe,
    Worker,
    SharedWorker,
    ServiceWorker,
    Browser,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub target_id: TargetId,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub title: String,
    pub url: String,
    pub attached: bool,
    #[serde(default)]
    pub opener_id: Option<TargetId>,
    #[serde(default)]
    pub browser_context_id: Option<BrowserContextId>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SetDiscoverTargetsParams {
    pub discover: bool,
}

impl Method for SetDiscoverTargetsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.setDiscoverTargets".into()
    }
}

impl Command for SetDiscoverTargetsParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAutoAttachParams {
    pub auto_attach: bool,
    pub wait_for_debugger_on_start: bool,
    pub flatten: bool,
}

impl SetAutoAttachParams {
    pub fn new(auto_attach: bool, wait_for_debugger_on_start: bool, flatten: bool) -> Self {
        Self {
            auto_attach,
            wait_for_debugger_on_start,
            flatten,
        }
    }
}

impl Method for SetAutoAttachParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.setAutoAttach".into()
    }
}

impl Command for SetAutoAttachParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetParams {
    pub target_id: TargetId,
    pub flatten: bool,
}

impl Method for AttachToTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.attachToTarget".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetReturns {
    pub session_id: SessionId,
}

impl Command for AttachToTargetParams {
    type Response = AttachToTargetReturns;
}

#[derive(Debug, Clone, Serialize)]
pub struct GetTargetsParams {}

impl Method for GetTargetsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.getTargets".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTargetsReturns {
    pub target_infos: Vec<TargetInfo>,
}

impl Command for GetTargetsParams {
    type Response = GetTargetsReturns;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateTargetParams {
    pub target_id: TargetId,
}

impl ActivateTargetParams {
    pub fn new(target_id: TargetId) -> Self {
        Self { target_id }
    }
}

impl Method for ActivateTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.activateTarget".into()
    }
}

impl Command for ActivateTargetParams {
    type Response = serde_json::Value;
}

// --- Events -----------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetCreated {
    pub target_info: TargetInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetDestroyed {
    pub target_id: TargetId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetCrashed {
    pub target_id: TargetId,
    pub status: String,
    pub error_code: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttachedToTarget {
    pub session_id: SessionId,
    pub target_info: TargetInfo,
    pub waiting_for_debugger: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetachedFromTarget {
    pub session_id: SessionId,
    #[serde(default)]
    pub target_id: Option<TargetId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetInfoChanged {
    pub target_info: TargetInfo,
}
