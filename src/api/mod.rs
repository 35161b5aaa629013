pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, ImageAcquisition, ImageFetcher};
pub use error::ApiError;
pub use types::{AcquireImageResponse, CameraPreset, EquipmentPresets, GeocodeHit};
