//! WebSocket transport: exactly one connection per browser process.
//! Connects with bounded exponential backoff, pumps inbound frames onto a
//! channel, ships outbound frames from another, and on close cancels and
//! awaits its reader task before returning — no dangling background work.

use std::time::Duration;

use async_tungstenite::tokio::{connect_async, ConnectStream};
use async_tungstenite::tungstenite::Message as WsMessage;
use async_tungstenite::WebSocketStream;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::{SinkExt, StreamExt};
use tokio::task::JoinHandle;

use crate::config::BrowserConfig;
use crate::error::CdpError;

/// Resolves the browser's debug WebSocket URL via `GET /json/version`,
/// falling back to `GET /json`.
pub async fn resolve_debugger_ws_url(config: &BrowserConfig) -> Result<String, CdpError> {
    let client = reqwest::Client::new();

    if let Ok(resp) = client.get(config.debugger_url_endpoint()).send().await {
        if let Ok(value) = resp.json::<serde_json::Value>().await {
            if let Some(url) = value.get("webSocketDebuggerUrl").and_then(|u| u.as_str()) {
                return Ok(url.to_string());
            }
        }
    }

    let resp = client
        .get(config.debugger_list_endpoint())
        .send()
        .await
        .map_err(|e| CdpError::Connection(e.to_string()))?;
    let list: Vec<serde_json::Value> = resp
        .json()
        .await
        .map_err(|e| CdpError::Connection(e.to_string()))?;
    list.into_iter()
        .find_map(|t| {
            t.get("webSocketDebuggerUrl")
                .and_then(|u| u.as_str())
                .map(|s| s.to_string())
    })
        .ok_or_else(|| CdpError::Connection("no debuggable target exposed a websocket url".into()))
}

async fn connect_with_retry(
    url: &str,
    retry_limit: u32,
    base_delay_ms: u64,
) -> Result<WebSocketStream<ConnectStream>, CdpError> {
    let mut attempt = 0;
    loop {
        match connect_async(url).await {
            Ok((stream, _response)) => return Ok(stream),
            Err(err) => {
                attempt += 1;
                if attempt > retry_limit {
                    return Err(CdpError::Connection(format!(
                                "failed to connect to {url} after {attempt} attempts: {err}"
                    )));
                }
                let delay = base_delay_ms.saturating_mul(1u64 << attempt.min(16));
                tracing::warn!(attempt, delay_ms = delay, %err, "retrying websocket connect");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }
    }
}

/// Owns the single WebSocket connection and the reader task that pumps
/// inbound frames. Dropping/`close`-ing this cancels and awaits that task.
pub struct Transport {
    outbound: UnboundedSender<String>,
    inbound: Option<UnboundedReceiver<String>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Transport {
    pub async fn connect(config: &BrowserConfig) -> Result<Self, CdpError> {
        let url = resolve_debugger_ws_url(config).await?;
        let stream = connect_with_retry(&url, config.connect_retry_limit, config.connect_retry_base_delay_ms).await?;
        let (mut write, mut read) = stream.split();

        let (inbound_tx, inbound_rx) = unbounded::<String>();
        let (outbound_tx, mut outbound_rx) = unbounded::<String>();

        let reader = tokio::spawn(async move {
                while let Some(msg) = read.next().await {
                    match msg {
                        Ok(WsMessage::Text(text)) => {
                            if inbound_tx.unbounded_send(text).is_err() {
                                break;
                            }
                        }
                        Ok(WsMessage::Close(_)) => break,
                        Ok(_) => {}
                        Err(err) => {
                            tracing::warn!(%err, "websocket read error");
                            break;
                        }
                    }
                }
        });

        let writer = tokio::spawn(async move {
                while let Some(text) = outbound_rx.next().await {
                    if write.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                let _ = write.close().await;
        });

        Ok(Self {
                outbound: outbound_tx,
                inbound: Some(inbound_rx),
                reader,
                writer,
        })
    }

    pub fn sender(&self) -> UnboundedSender<String> {
        self.outbound.clone()
    }

    /// Takes the inbound receiver. Callable once; the handler task owns it
    /// for the lifetime of the connection.
    pub fn take_receiver(&mut self) -> Option<UnboundedReceiver<String>> {
        self.inbound.take()
    }

    /// Cancels and awaits the reader/writer tasks. Safe to call more than
    /// once.
    pub async fn close(&mut self) {
        self.outbound.close_channel();
        self.reader.abort();
        self.writer.abort();
        let _ = (&mut self.reader).await;
        let _ = (&mut self.writer).await;
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

#[cfg(test)]
impl Transport {
    /// Builds a `Transport` over a pair of in-memory channels instead of a
    /// real socket, so the handler's dispatch/recovery loop can be driven
    /// from a test without a browser.
    pub(crate) fn fake() -> (Self, UnboundedSender<String>, UnboundedReceiver<String>) {
        let (inbound_tx, inbound_rx) = unbounded::<String>();
        let (outbound_tx, outbound_rx) = unbounded::<String>();
        let transport = Self {
            outbound: outbound_tx,
            inbound: Some(inbound_rx),
            reader: tokio::spawn(async {}),
            writer: tokio::spawn(async {}),
        };
        (transport, inbound_tx, outbound_rx)
    }
}

