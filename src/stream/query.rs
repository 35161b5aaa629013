use serde::{Deserialize, Serialize};

use crate::params::{ClientFilterSettings, ParameterSnapshot};

/// How eagerly the backend downloads images during the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DownloadMode {
    /// Only the user's current selection, on demand.
    #[default]
    Selected,
    /// Every object passing the filters.
    Filtered,
    /// Every matching object.
    All,
}

impl DownloadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadMode::Selected => "selected",
            DownloadMode::Filtered => "filtered",
            DownloadMode::All => "all",
        }
    }
}

/// Query for one stream-open call. The client-only filter fields ride
/// along for backends that filter server-side, but changing them alone
/// never re-opens the connection.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamQuery {
    pub snapshot: ParameterSnapshot,
    pub filters: ClientFilterSettings,
    pub mode: DownloadMode,
}

impl StreamQuery {
    pub fn new(
        snapshot: ParameterSnapshot,
        filters: ClientFilterSettings,
        mode: DownloadMode,
    ) -> Self {
        Self { snapshot, filters, mode }
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let s = &self.snapshot;
        let mut pairs = vec![
            ("focal_length".to_string(), s.focal_length.to_string()),
            ("sensor_width".to_string(), s.sensor_width.to_string()),
            ("sensor_height".to_string(), s.sensor_height.to_string()),
            ("latitude".to_string(), s.latitude.to_string()),
            ("longitude".to_string(), s.longitude.to_string()),
            ("catalogs".to_string(), s.catalogs.join(",")),
            ("sort_key".to_string(), s.sort_key.as_str().to_string()),
            ("min_altitude".to_string(), s.min_altitude.to_string()),
            ("min_hours".to_string(), s.min_hours.to_string()),
            ("image_padding".to_string(), s.image_padding.to_string()),
            ("image_resolution".to_string(), s.image_resolution.to_string()),
            ("image_timeout".to_string(), s.image_timeout_secs.to_string()),
            ("image_source".to_string(), s.image_source.clone()),
            ("download_mode".to_string(), self.mode.as_str().to_string()),
        ];
        if let Some(max_magnitude) = self.filters.max_magnitude {
            pairs.push(("max_magnitude".to_string(), max_magnitude.to_string()));
        }
        if let Some(min_size) = self.filters.min_size {
            pairs.push(("min_size".to_string(), min_size.to_string()));
        }
        if !self.filters.selected_types.is_empty() {
            pairs.push(("selected_types".to_string(), self.filters.selected_types.join(",")));
        }
        pairs
    }
}
