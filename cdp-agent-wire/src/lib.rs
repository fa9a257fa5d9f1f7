//! Wire-level envelope types shared between the hand-written CDP protocol
//! bindings (`cdp-agent-protocol`) and the client (`cdp-agent-core`).
//!
//! Nothing in this crate knows about WebSockets, sessions, or the browser.
//! It only describes the shape of a CDP JSON frame: a command carries a
//! method name, optional session id and JSON params; a response carries the
//! matching id plus a result or an error; an event carries a method name,
//! optional session id and JSON params with no id at all.

use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifier for an in-flight command, unique per connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(usize);

impl CallId {
    pub fn new(id: usize) -> Self {
        CallId(id)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallId({})", self.0)
    }
}

/// A command frame as sent over the wire: `{id, method, params, [sessionId]}`.
#[derive(Serialize, Debug, PartialEq)]
pub struct MethodCall {
    pub id: CallId,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub method: Cow<'static, str>,
    pub params: serde_json::Value,
}

/// Implemented by every CDP parameter type; gives the fully qualified method
/// name (`Domain.methodName`) used both to serialize the outbound frame and
/// to route an inbound event.
pub trait Method {
    /// The whole string identifier for this method, e.g. `DOM.removeNode`.
    fn identifier(&self) -> Cow<'static, str>;

    /// The name of the domain this method belongs to, e.g. `DOM`.
    fn domain_name(&self) -> Cow<'static, str> {
        self.split().0
    }

    /// The standalone identifier of the method inside the domain, e.g.
    /// `removeNode`.
    fn method_name(&self) -> Cow<'static, str> {
        self.split().1
    }

    /// Tuple of `(domain_name, method_name)`.
    fn split(&self) -> (Cow<'static, str>, Cow<'static, str>) {
        match self.identifier() {
            Cow::Borrowed(id) => {
                let mut iter = id.split('.');
                (iter.next().unwrap_or_default().into(), iter.next().unwrap_or_default().into())
            }
            Cow::Owned(id) => {
                let mut iter = id.split('.');
                (
                    Cow::Owned(iter.next().unwrap_or_default().to_string()),
                    Cow::Owned(iter.next().unwrap_or_default().to_string()),
                )
            }
        }
    }
}

/// Implemented by every CDP parameter type that has a well-defined response
/// payload shape.
pub trait Command: Serialize + Method {
    type Response: DeserializeOwned + fmt::Debug;
}

/// A decoded response to a previously issued [`MethodCall`].
#[derive(Debug, Clone)]
pub struct CommandResponse<T> {
    pub id: CallId,
    pub result: T,
    pub method: Cow<'static, str>,
}

impl<T> std::ops::Deref for CommandResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.result
    }
}

/// A CDP-level protocol error, as it appears in a response's `error` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "protocol error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for WireError {}

/// Raw response frame as it arrives off the wire, before being matched
/// against the `T::Response` type of the command that requested it.
#[derive(Deserialize, Debug, Clone)]
pub struct Response {
    pub id: CallId,
    pub result: Option<serde_json::Value>,
    pub error: Option<WireError>,
}

/// An event frame as it arrives off the wire: no `id`, a method name, an
/// optional session id (present whenever the event originated from an
/// attached target rather than the browser endpoint), and JSON params.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct EventFrame {
    pub method: Cow<'static, str>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    pub params: serde_json::Value,
}

impl Method for EventFrame {
    fn identifier(&self) -> Cow<'static, str> {
        self.method.clone()
    }
}

/// Implemented by the crate-specific `CdpEvent` enum generated from the
/// event frame's `method` discriminant.
pub trait Event: Method + DeserializeOwned {
    fn session_id(&self) -> Option<&str>;
}

/// Either half of what can arrive on the wire for a given frame: a response
/// to a command we issued, or an event we didn't ask for.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Message<T> {
    Response(Response),
    Event(T),
}

/// Turn a raw wire [`Response`] into a strongly typed [`CommandResponse`],
/// given the method name of the command that was issued.
pub fn to_command_response<T: Command>(
    resp: Response,
    method: Cow<'static, str>,
) -> Result<CommandResponse<T::Response>, WireError> {
    if let Some(res) = resp.result {
        match serde_json::from_value(res) {
            Ok(result) => Ok(CommandResponse {
                id: resp.id,
                result,
                method,
            }),
            Err(err) => Err(WireError {
                code: -32000,
                message: format!("failed to decode result for {method}: {err}"),
            }),
        }
    } else if let Some(err) = resp.error {
        Err(err)
    } else {
        Err(WireError {
            code: -32000,
            message: format!("empty response for {method}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl Method for Ping {
        fn identifier(&self) -> Cow<'static, str> {
            "Page.ping".into()
        }
    }

    #[test]
    fn splits_domain_and_method() {
        let ping = Ping;
        assert_eq!(ping.domain_name(), "Page");
        assert_eq!(ping.method_name(), "ping");
    }

    #[test]
    fn call_id_displays_numeric_value() {
        assert_eq!(CallId::new(7).to_string(), "CallId(7)");
    }
}
