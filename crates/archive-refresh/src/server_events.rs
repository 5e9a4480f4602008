//! Server-push event stream consumer.
//!
//! The backend exposes a persistent SSE stream at `/events` and
//! announces `daily-refresh-complete` when its own bookkeeping settles.
//! The listener relays that onto the local bus and reconnects after a
//! fixed delay on any transport failure; errors are logged, never
//! surfaced to the rest of the client.

use crate::error::{RefreshError, RefreshResult};
use crate::events::{RefreshEvent, RefreshEvents};
use futures_util::StreamExt;
use std::time::Duration;
use tracing::{debug, info, warn};

const SERVER_REFRESH_EVENT: &str = "daily-refresh-complete";

/// SSE consumer for the backend's `/events` stream.
pub struct ServerEventListener {
    http_client: reqwest::Client,
    events_url: String,
    events: RefreshEvents,
    reconnect_delay: Duration,
}

impl ServerEventListener {
    pub fn new(events_url: impl Into<String>, events: RefreshEvents) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            events_url: events_url.into(),
            events,
            reconnect_delay: Duration::from_secs(5),
        }
    }

    /// Consume the stream forever, reconnecting on errors and on
    /// orderly stream end.
    pub async fn run(&self) {
        info!(url = %self.events_url, "Starting server event listener");
        loop {
            match self.consume_stream().await {
                Ok(()) => debug!("Event stream ended, reconnecting"),
                Err(e) => warn!(error = %e, "Event stream error, reconnecting"),
            }
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn consume_stream(&self) -> RefreshResult<()> {
        let response = self
            .http_client
            .get(&self.events_url)
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Stream(format!(
                "event stream returned status {}",
                status.as_u16()
            )));
        }

        let mut stream = response.bytes_stream();
        let mut parser = SseParser::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for event_name in parser.feed(&chunk) {
                self.dispatch(&event_name);
            }
        }
        Ok(())
    }

    fn dispatch(&self, event_name: &str) {
        if event_name == SERVER_REFRESH_EVENT {
            debug!("Server announced daily refresh completion");
            self.events.emit(RefreshEvent::ServerRefreshComplete);
        } else {
            debug!(event = %event_name, "Ignoring unknown server event");
        }
    }
}

/// Minimal SSE line parser: tracks the `event:` field and yields the
/// event name at each blank-line dispatch. Data payloads and comments
/// are ignored; only the event name matters here.
#[derive(Default)]
struct SseParser {
    buffer: String,
    current_event: Option<String>,
}

impl SseParser {
    /// Feed raw bytes; returns the names of events completed by this
    /// chunk.
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut completed = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.current_event.take() {
                    completed.push(event);
                }
            } else if let Some(name) = line.strip_prefix("event:") {
                self.current_event = Some(name.trim().to_string());
            }
            // data:, id:, retry: and comment lines are ignored.
        }
        completed
    }
}
