//! Crate-wide error taxonomy: wrapped transport/serialization errors, a
//! typed protocol-error variant, and the terminal variants the
//! merger/client/registry can produce.

use cdp_agent_wire::WireError;

pub type Result<T> = std::result::Result<T, CdpError>;

#[derive(Debug, thiserror::Error)]
pub enum CdpError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    WebSocket(#[from] async_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("protocol error calling {method}: {source}")]
    Protocol {
        method: String,
        #[source]
        source: WireError,
    },

    #[error("session lost and could not be recovered")]
    SessionLost,

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("no element at selector index {0}")]
    NotFound(usize),

    #[error("element is occluded by another node")]
    Occluded,

    #[error("element is not visible")]
    NotVisible,

    #[error("input rejected: {0}")]
    InputRejected(String),

    #[error("partial data: {0} failed, continuing with remaining sources")]
    PartialData(String),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("{0}")]
    Other(String),
}

impl CdpError {
    pub fn msg(msg: impl Into<String>) -> Self {
        CdpError::Other(msg.into())
    }

    pub fn protocol(method: impl Into<String>, source: WireError) -> Self {
        CdpError::Protocol {
            method: method.into(),
            source,
        }
    }
}

/// The subset of [`CdpError`] variants an action result can surface to a
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connection,
    Protocol,
    SessionLost,
    Timeout,
    NotFound,
    Occluded,
    NotVisible,
    InputRejected,
    PartialData,
    Other,
}

impl From<&CdpError> for ErrorKind {
    fn from(err: &CdpError) -> Self {
        match err {
            CdpError::Connection(_) | CdpError::WebSocket(_) | CdpError::ConnectionClosed => {
                ErrorKind::Connection
            }
            CdpError::Json(_) => ErrorKind::Other,
            CdpError::Protocol {.. } => ErrorKind::Protocol,
            CdpError::SessionLost => ErrorKind::SessionLost,
            CdpError::Timeout(_) => ErrorKind::Timeout,
            CdpError::NotFound(_) => ErrorKind::NotFound,
            CdpError::Occluded => ErrorKind::Occluded,
            CdpError::NotVisible => ErrorKind::NotVisible,
            CdpError::InputRejected(_) => ErrorKind::InputRejected,
            CdpError::PartialData(_) => ErrorKind::PartialData,
            CdpError::Other(_) => ErrorKind::Other,
        }
    }
}

