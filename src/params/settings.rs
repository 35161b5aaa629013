use serde::{Deserialize, Serialize};

use crate::catalog::SortKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telescope {
    pub focal_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub sensor_width: f64,
    pub sensor_height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Options forwarded to the backend's image pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    #[serde(default = "default_padding")]
    pub padding: f64,
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_source")]
    pub source: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            resolution: default_resolution(),
            timeout_secs: default_timeout_secs(),
            source: default_source(),
        }
    }
}

fn default_padding() -> f64 {
    1.5
}

fn default_resolution() -> u32 {
    512
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_source() -> String {
    "dss2r".to_string()
}

/// User-local view filters. These change only what is displayed from
/// the already-downloaded set, never the backend's candidate set, so
/// they are deliberately absent from `ParameterSnapshot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientFilterSettings {
    pub max_magnitude: Option<f64>,
    pub min_size: Option<f64>,
    #[serde(default)]
    pub min_hours: f64,
    #[serde(default)]
    pub selected_types: Vec<String>,
}

/// Full user settings blob as exchanged with the backend. Unknown
/// fields round-trip through `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub telescope: Telescope,
    pub camera: Camera,
    pub location: Location,
    #[serde(default = "default_catalogs")]
    pub catalogs: Vec<String>,
    #[serde(default = "default_min_altitude")]
    pub min_altitude: f64,
    #[serde(default)]
    pub min_hours: f64,
    #[serde(default = "default_sort_key")]
    pub sort_key: SortKey,
    #[serde(default)]
    pub image: ImageOptions,
    #[serde(default)]
    pub filters: ClientFilterSettings,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_catalogs() -> Vec<String> {
    vec!["messier".to_string()]
}

fn default_min_altitude() -> f64 {
    30.0
}

fn default_sort_key() -> SortKey {
    SortKey::Time
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telescope: Telescope { focal_length: 1000.0 },
            camera: Camera { sensor_width: 23.5, sensor_height: 15.7 },
            location: Location { latitude: 55.70, longitude: 13.19 },
            catalogs: default_catalogs(),
            min_altitude: default_min_altitude(),
            min_hours: 0.0,
            sort_key: default_sort_key(),
            image: ImageOptions::default(),
            filters: ClientFilterSettings::default(),
            extra: serde_json::Map::new(),
        }
    }
}
