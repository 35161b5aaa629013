pub mod error;
pub mod event;
pub mod query;
pub mod session;
pub mod transport;

pub use error::StreamError;
pub use event::{decode, FrameDecoder, RawEvent, StreamEvent};
pub use query::{DownloadMode, StreamQuery};
pub use session::{SessionStatus, StreamSession};
pub use transport::{Connector, HttpConnector, TransportEvent};
