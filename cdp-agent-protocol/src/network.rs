//! `Network` domain (the small slice this client needs):
//! https://chromedevtools.github.io/devtools-protocol/tot/Network/

use std::borrow::Cow;

use cdp_agent_wire::{Command, Method};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoaderId(pub String);

#[derive(Debug, Clone, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnableParams {}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.enable".into()
    }
}

impl Command for EnableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DisableParams {}

impl Method for DisableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.disable".into()
    }
}

impl Command for DisableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetCookiesParams {}

impl Method for GetCookiesParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.getCookies".into()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetCookiesReturns {
    pub cookies: Vec<Cookie>,
}

impl Command for GetCookiesParams {
    type Response = GetCookiesReturns;
}

/// Fired when a network request finishes loading; used only as one signal
/// feeding the `wait_for_load` network-idle window.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoadingFinished {
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoadingFailed {
    pub request_id: String,
}
