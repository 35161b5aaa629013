use crate::catalog::SortKey;

use super::settings::Settings;

/// Canonical, comparison-only view of the settings fields that force
/// the backend to recompute the catalog. Client-only display filters
/// (magnitude, size, type set) are intentionally excluded: they never
/// change the candidate set.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub focal_length: f64,
    pub sensor_width: f64,
    pub sensor_height: f64,
    pub catalogs: Vec<String>,
    pub sort_key: SortKey,
    pub min_altitude: f64,
    pub min_hours: f64,
    pub image_padding: f64,
    pub image_resolution: u32,
    pub image_timeout_secs: u64,
    pub image_source: String,
}

impl ParameterSnapshot {
    pub fn of(settings: &Settings) -> Self {
        Self {
            latitude: settings.location.latitude,
            longitude: settings.location.longitude,
            focal_length: settings.telescope.focal_length,
            sensor_width: settings.camera.sensor_width,
            sensor_height: settings.camera.sensor_height,
            catalogs: settings.catalogs.clone(),
            sort_key: settings.sort_key,
            min_altitude: settings.min_altitude,
            min_hours: settings.min_hours,
            image_padding: settings.image.padding,
            image_resolution: settings.image.resolution,
            image_timeout_secs: settings.image.timeout_secs,
            image_source: settings.image.source.clone(),
        }
    }
}
