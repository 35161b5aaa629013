pub mod settings;
pub mod snapshot;
pub mod watcher;

pub use settings::{Camera, ClientFilterSettings, ImageOptions, Location, Settings, Telescope};
pub use snapshot::ParameterSnapshot;
pub use watcher::ParameterWatcher;
