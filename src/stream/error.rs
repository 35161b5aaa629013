use thiserror::Error;

/// Per-event decode failures. These are logged and swallowed by the
/// session loop; a single corrupt message never ends the stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("unknown event type '{0}'")]
    UnknownEvent(String),
    #[error("bad '{event}' payload: {message}")]
    Payload { event: &'static str, message: String },
}

impl StreamError {
    pub fn payload(event: &'static str, err: impl ToString) -> Self {
        StreamError::Payload { event, message: err.to_string() }
    }
}
