use futures_util::StreamExt;
use log::debug;
use tokio::sync::mpsc;

use super::event::{FrameDecoder, RawEvent};
use super::query::StreamQuery;

/// Transport-level happenings, in delivery order. `Open` precedes any
/// `Event`; `Error` and `Closed` are terminal.
#[derive(Debug)]
pub enum TransportEvent {
    Open,
    Event(RawEvent),
    Error(String),
    Closed,
}

/// Seam between the session state machine and the wire. Implementations
/// feed a channel so the session can be driven by a scripted fake in
/// tests.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, query: &StreamQuery) -> mpsc::Receiver<TransportEvent>;
}

pub struct HttpConnector {
    base_url: String,
    client: reqwest::Client,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client: reqwest::Client::new() }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, query: &StreamQuery) -> mpsc::Receiver<TransportEvent> {
        let (tx, rx) = mpsc::channel(64);
        let url = format!("{}/api/stream-objects", self.base_url);
        let client = self.client.clone();
        let pairs = query.to_pairs();

        tokio::spawn(async move {
            let response = match client.get(&url).query(&pairs).send().await {
                Ok(response) => response,
                Err(e) => {
                    let _ = tx.send(TransportEvent::Error(e.to_string())).await;
                    return;
                }
            };
            if !response.status().is_success() {
                let message = format!("stream request failed: {}", response.status());
                let _ = tx.send(TransportEvent::Error(message)).await;
                return;
            }
            if tx.send(TransportEvent::Open).await.is_err() {
                return;
            }

            let mut decoder = FrameDecoder::default();
            let mut buffer = String::new();
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(TransportEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&bytes));
                while let Some(end) = buffer.find('\n') {
                    let line: String = buffer.drain(..=end).collect();
                    if let Some(frame) = decoder.push_line(line.trim_end_matches('\n')) {
                        if tx.send(TransportEvent::Event(frame)).await.is_err() {
                            // Receiver dropped: the session was superseded.
                            debug!("stream receiver gone, dropping connection");
                            return;
                        }
                    }
                }
            }
            let _ = tx.send(TransportEvent::Closed).await;
        });

        rx
    }
}
