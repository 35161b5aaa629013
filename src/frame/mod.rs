pub mod fov;
pub mod overlay;
pub mod timeline;

pub use fov::{fov_degrees, fov_degrees_approx, sensor_fov};
pub use overlay::{overlay_layout, FramingState, OverlayLayout};
pub use timeline::{time_to_x, zone_rects, ZoneRect};
