use serde::Deserialize;

use super::error::StreamError;
use crate::catalog::{ImageStatus, NightTimes, RecordPatch};

/// One framed server-push message, before typed decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub event: String,
    pub data: String,
}

/// Incremental `event:`/`data:` line framing. Feed decoded lines; a
/// blank line flushes the accumulated frame.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    event: Option<String>,
    data: String,
}

impl FrameDecoder {
    pub fn push_line(&mut self, line: &str) -> Option<RawEvent> {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return self.flush();
        }
        if let Some(rest) = line.strip_prefix("event:") {
            self.event = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            if !self.data.is_empty() {
                self.data.push('\n');
            }
            self.data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // Comment lines and unknown fields are ignored per the protocol.
        None
    }

    fn flush(&mut self) -> Option<RawEvent> {
        if self.event.is_none() && self.data.is_empty() {
            return None;
        }
        let event = self.event.take().unwrap_or_else(|| "message".to_string());
        let data = std::mem::take(&mut self.data);
        Some(RawEvent { event, data })
    }
}

/// Typed stream events. Order is not guaranteed across types but is
/// monotonic within a type.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Total(u64),
    NightTimes(NightTimes),
    CatalogMetadata(Vec<RecordPatch>),
    ObjectData(RecordPatch),
    ObjectDetails(RecordPatch),
    ImageStatus(ImageStatusEvent),
    DownloadProgress { current: u64, total: u64 },
    ProcessingProgress(u64),
    Close,
    ServerError(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageStatusEvent {
    pub name: String,
    pub status: ImageStatus,
    pub url: Option<String>,
    pub fov: Option<f64>,
}

#[derive(Deserialize)]
struct ProgressPayload {
    current: u64,
    total: u64,
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: String,
}

pub fn decode(raw: &RawEvent) -> Result<StreamEvent, StreamError> {
    match raw.event.as_str() {
        "total" => raw
            .data
            .trim()
            .parse()
            .map(StreamEvent::Total)
            .map_err(|e| StreamError::payload("total", e)),
        // The original backend named this event `twilight_info`.
        "night_times" | "twilight_info" => serde_json::from_str(&raw.data)
            .map(StreamEvent::NightTimes)
            .map_err(|e| StreamError::payload("night_times", e)),
        "catalog_metadata" => serde_json::from_str(&raw.data)
            .map(StreamEvent::CatalogMetadata)
            .map_err(|e| StreamError::payload("catalog_metadata", e)),
        "object_data" => serde_json::from_str(&raw.data)
            .map(StreamEvent::ObjectData)
            .map_err(|e| StreamError::payload("object_data", e)),
        "object_details" => serde_json::from_str(&raw.data)
            .map(StreamEvent::ObjectDetails)
            .map_err(|e| StreamError::payload("object_details", e)),
        "image_status" => serde_json::from_str(&raw.data)
            .map(StreamEvent::ImageStatus)
            .map_err(|e| StreamError::payload("image_status", e)),
        "download_progress" => serde_json::from_str::<ProgressPayload>(&raw.data)
            .map(|p| StreamEvent::DownloadProgress { current: p.current, total: p.total })
            .map_err(|e| StreamError::payload("download_progress", e)),
        "processing_progress" => raw
            .data
            .trim()
            .parse()
            .map(StreamEvent::ProcessingProgress)
            .map_err(|e| StreamError::payload("processing_progress", e)),
        "close" => Ok(StreamEvent::Close),
        "error" => {
            let message = serde_json::from_str::<ErrorPayload>(&raw.data)
                .map(|p| p.error)
                .unwrap_or_else(|_| raw.data.clone());
            Ok(StreamEvent::ServerError(message))
        }
        other => Err(StreamError::UnknownEvent(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &mut FrameDecoder, text: &str) -> Vec<RawEvent> {
        text.split('\n')
            .filter_map(|line| decoder.push_line(line))
            .collect()
    }

    #[test]
    fn frames_event_data_pairs() {
        let mut decoder = FrameDecoder::default();
        let frames = feed(&mut decoder, "event: total\ndata: 42\n\nevent: close\ndata:\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], RawEvent { event: "total".into(), data: "42".into() });
        assert_eq!(frames[1].event, "close");
    }

    #[test]
    fn blank_line_without_frame_emits_nothing() {
        let mut decoder = FrameDecoder::default();
        assert!(feed(&mut decoder, "\n\n").is_empty());
    }

    #[test]
    fn multiline_data_joins_with_newline() {
        let mut decoder = FrameDecoder::default();
        let frames = feed(&mut decoder, "data: a\ndata: b\n\n");
        assert_eq!(frames[0].data, "a\nb");
    }

    #[test]
    fn decodes_typed_events() {
        let raw = RawEvent {
            event: "image_status".into(),
            data: r#"{"name": "M 31", "status": "cached", "url": "/cache/x.jpg"}"#.into(),
        };
        match decode(&raw).unwrap() {
            StreamEvent::ImageStatus(ev) => {
                assert_eq!(ev.name, "M 31");
                assert_eq!(ev.status, ImageStatus::Cached);
                assert_eq!(ev.url.as_deref(), Some("/cache/x.jpg"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn twilight_info_aliases_night_times() {
        let raw = RawEvent {
            event: "twilight_info".into(),
            data: r#"{"night": ["2026-08-24T22:00:00Z", "2026-08-25T03:00:00Z"]}"#.into(),
        };
        assert!(matches!(decode(&raw), Ok(StreamEvent::NightTimes(_))));
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        let raw = RawEvent { event: "object_details".into(), data: "{not json".into() };
        assert!(matches!(decode(&raw), Err(StreamError::Payload { .. })));

        let raw = RawEvent { event: "telemetry".into(), data: "{}".into() };
        assert!(matches!(decode(&raw), Err(StreamError::UnknownEvent(_))));
    }

    #[test]
    fn error_event_carries_backend_message() {
        let raw = RawEvent { event: "error".into(), data: r#"{"error": "boom"}"#.into() };
        assert_eq!(decode(&raw).unwrap(), StreamEvent::ServerError("boom".into()));
    }
}
