pub mod filter;
pub mod night;
pub mod record;
pub mod store;

pub use filter::{view_order, SortKey, ViewQuery};
pub use night::{visible_hours, NightTimes, Zone};
pub use record::{AltitudePoint, FovRectangle, ImageStatus, ObjectRecord, RecordPatch, SensorFov};
pub use store::RecordStore;
