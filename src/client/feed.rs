//! Change feed reader.
//!
//! Reads the room's SSE stream chunk by chunk, splits it into lines and
//! forwards every decoded `ChangeEvent` over an mpsc channel.

use futures_util::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

use super::api::ChatApi;
use super::error::ApiError;
use crate::shared::ChangeEvent;

/// Buffered events before the reader waits for the consumer
const FEED_BUFFER: usize = 256;

/// Incremental SSE parser
///
/// Feed it raw text as it arrives; it returns the `data` payload of every
/// event completed by that text. Comments and other fields are skipped.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    data: Vec<String>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut completed = Vec::new();

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    completed.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }
            if let Some(value) = line.strip_prefix("data:") {
                self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }
        completed
    }
}

/// A live subscription to one room's changes
#[derive(Debug)]
pub struct ChangeFeed {
    events: mpsc::Receiver<ChangeEvent>,
    reader: JoinHandle<()>,
}

impl ChangeFeed {
    /// Subscribe to `room_id` and start reading
    pub async fn connect(api: &ChatApi, room_id: Uuid) -> Result<Self, ApiError> {
        let response = api.subscribe_changes(room_id).await?;
        tracing::info!("[Feed] Subscribed to room {}", room_id);

        let (tx, events) = mpsc::channel(FEED_BUFFER);
        let reader = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut parser = SseParser::new();
            let mut pending_utf8: Vec<u8> = Vec::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::warn!("[Feed] Stream for room {} failed: {}", room_id, e);
                        return;
                    }
                };

                pending_utf8.extend_from_slice(&chunk);
                let valid = match std::str::from_utf8(&pending_utf8) {
                    Ok(_) => pending_utf8.len(),
                    // A multi-byte character split across chunks; keep the tail for the next one.
                    Err(e) if e.error_len().is_none() => e.valid_up_to(),
                    Err(e) => {
                        tracing::error!("[Feed] Invalid UTF-8 in stream: {}", e);
                        return;
                    }
                };
                let text = String::from_utf8_lossy(&pending_utf8[..valid]).into_owned();
                pending_utf8.drain(..valid);

                for data in parser.push(&text) {
                    if !forward(&tx, &data).await {
                        return;
                    }
                }
            }
            tracing::info!("[Feed] Stream for room {} closed", room_id);
        });

        Ok(Self { events, reader })
    }

    /// Next change, or `None` once the stream has ended
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Decode and forward one payload; `false` once the consumer is gone
async fn forward(tx: &mpsc::Sender<ChangeEvent>, data: &str) -> bool {
    match serde_json::from_str::<ChangeEvent>(data) {
        Ok(event) => tx.send(event).await.is_ok(),
        Err(e) => {
            tracing::warn!("[Feed] Skipping undecodable event: {}", e);
            true
        }
    }
}
