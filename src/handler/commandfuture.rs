//! Per-call timeout wrapper: every CDP round-trip is
//! wrapped in a timeout; on expiry the pending entry is cancelled so a late
//! response is discarded rather than delivered to a requester who already
//! gave up.

use std::time::Duration;

use futures::channel::oneshot;

use cdp_agent_wire::{CallId, Response};

use super::HandlerHandle;
use crate::error::CdpError;

/// Awaits a previously submitted command's completion, racing it against
/// `timeout`. On timeout, tells the handler to cancel the pending entry.
pub async fn await_response(
    handle: &HandlerHandle,
    id: CallId,
    rx: oneshot::Receiver<Result<Response, CdpError>>,
    timeout: Duration,
) -> Result<Response, CdpError> {
    match tokio::time::timeout(timeout, rx).await {
        Ok(Ok(Ok(resp))) => Ok(resp),
        Ok(Ok(Err(err))) => Err(err),
        Ok(Err(_canceled)) => Err(CdpError::ConnectionClosed),
        Err(_elapsed) => {
            handle.cancel(id);
            Err(CdpError::Timeout(timeout))
        }
    }
}

