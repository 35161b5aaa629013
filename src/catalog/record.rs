use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Imaging state of a record. The backend historically emitted `queued`
/// for objects it had not started on yet, so that spelling decodes to
/// `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    #[serde(alias = "queued")]
    Pending,
    Downloading,
    Cached,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudePoint {
    #[serde(with = "flexible_time")]
    pub time: DateTime<Utc>,
    pub altitude: f64,
}

/// Sensor footprint in degrees, as optionally supplied by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorFov {
    pub w: f64,
    pub h: f64,
}

/// Legacy overlay descriptor: percentages of the downloaded image size.
/// Kept as a fallback decoder only; see `frame::overlay`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FovRectangle {
    pub width_percent: f64,
    pub height_percent: f64,
}

/// One catalog target. `name` is the only stable join key across every
/// stream event; everything else is replaceable in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub name: String,
    pub common_name: Option<String>,
    pub other_id: Option<String>,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub constellation: Option<String>,
    pub ra: Option<String>,
    pub dec: Option<String>,
    pub catalog: Option<String>,
    pub size: Option<String>,
    pub mag: Option<f64>,
    pub maj_ax: Option<f64>,
    pub max_altitude: Option<f64>,
    pub hours_visible: Option<f64>,
    #[serde(default)]
    pub altitude_graph: Vec<AltitudePoint>,
    #[serde(default)]
    pub moon_graph: Vec<AltitudePoint>,
    pub image_url: Option<String>,
    pub image_fov: Option<f64>,
    pub fov_rectangle: Option<FovRectangle>,
    pub sensor_fov: Option<SensorFov>,
    pub status: Option<ImageStatus>,
    pub setup_hash: Option<String>,
}

/// Partial update for an existing record. Every field except `name` is
/// optional; absent fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub name: String,
    pub common_name: Option<String>,
    pub other_id: Option<String>,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub constellation: Option<String>,
    pub ra: Option<String>,
    pub dec: Option<String>,
    pub catalog: Option<String>,
    pub size: Option<String>,
    pub mag: Option<f64>,
    pub maj_ax: Option<f64>,
    pub max_altitude: Option<f64>,
    pub hours_visible: Option<f64>,
    pub altitude_graph: Option<Vec<AltitudePoint>>,
    pub moon_graph: Option<Vec<AltitudePoint>>,
    pub image_url: Option<String>,
    pub image_fov: Option<f64>,
    pub fov_rectangle: Option<FovRectangle>,
    pub sensor_fov: Option<SensorFov>,
    pub status: Option<ImageStatus>,
    pub setup_hash: Option<String>,
}

impl ObjectRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            common_name: None,
            other_id: None,
            object_type: None,
            constellation: None,
            ra: None,
            dec: None,
            catalog: None,
            size: None,
            mag: None,
            maj_ax: None,
            max_altitude: None,
            hours_visible: None,
            altitude_graph: Vec::new(),
            moon_graph: Vec::new(),
            image_url: None,
            image_fov: None,
            fov_rectangle: None,
            sensor_fov: None,
            status: None,
            setup_hash: None,
        }
    }

    pub fn from_patch(patch: RecordPatch) -> Self {
        let mut record = Self::new(patch.name.clone());
        record.merge(patch);
        record
    }

    /// Field-level merge: only fields present in the patch replace the
    /// record's fields. `name` never changes.
    pub fn merge(&mut self, patch: RecordPatch) {
        let RecordPatch {
            name: _,
            common_name,
            other_id,
            object_type,
            constellation,
            ra,
            dec,
            catalog,
            size,
            mag,
            maj_ax,
            max_altitude,
            hours_visible,
            altitude_graph,
            moon_graph,
            image_url,
            image_fov,
            fov_rectangle,
            sensor_fov,
            status,
            setup_hash,
        } = patch;

        if let Some(v) = common_name {
            self.common_name = Some(v);
        }
        if let Some(v) = other_id {
            self.other_id = Some(v);
        }
        if let Some(v) = object_type {
            self.object_type = Some(v);
        }
        if let Some(v) = constellation {
            self.constellation = Some(v);
        }
        if let Some(v) = ra {
            self.ra = Some(v);
        }
        if let Some(v) = dec {
            self.dec = Some(v);
        }
        if let Some(v) = catalog {
            self.catalog = Some(v);
        }
        if let Some(v) = size {
            self.size = Some(v);
        }
        if let Some(v) = mag {
            self.mag = Some(v);
        }
        if let Some(v) = maj_ax {
            self.maj_ax = Some(v);
        }
        if let Some(v) = max_altitude {
            self.max_altitude = Some(v);
        }
        if let Some(v) = hours_visible {
            self.hours_visible = Some(v);
        }
        if let Some(v) = altitude_graph {
            self.altitude_graph = v;
        }
        if let Some(v) = moon_graph {
            self.moon_graph = v;
        }
        if let Some(v) = image_url {
            self.image_url = Some(v);
        }
        if let Some(v) = image_fov {
            self.image_fov = Some(v);
        }
        if let Some(v) = fov_rectangle {
            self.fov_rectangle = Some(v);
        }
        if let Some(v) = sensor_fov {
            self.sensor_fov = Some(v);
        }
        if let Some(v) = status {
            self.status = Some(v);
        }
        if let Some(v) = setup_hash {
            self.setup_hash = Some(v);
        }
    }

    /// Peak altitude over the delivered graph, falling back to the
    /// server-estimated value when no graph has arrived yet.
    pub fn peak_altitude(&self) -> Option<f64> {
        self.altitude_graph
            .iter()
            .map(|p| p.altitude)
            .fold(None, |acc: Option<f64>, alt| {
                Some(acc.map_or(alt, |a| a.max(alt)))
            })
            .or(self.max_altitude)
    }

    /// A record needs on-demand acquisition when it has no usable image
    /// yet. The backend sends empty-string URLs for never-downloaded
    /// objects.
    pub fn needs_image(&self) -> bool {
        self.image_url.as_deref().map_or(true, str::is_empty)
            || self.status == Some(ImageStatus::Pending)
    }
}

/// Timestamp (de)serialization tolerant of the backend's two formats:
/// RFC 3339 and astropy's offset-less ISO form.
pub(crate) mod flexible_time {
    use super::*;
    use chrono::SecondsFormat;
    use serde::{de, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| Utc.from_utc_datetime(&naive))
            })
    }

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_fields_absent_from_patch() {
        let mut record = ObjectRecord::new("M 31");
        record.mag = Some(3.4);
        record.constellation = Some("Andromeda".to_string());

        record.merge(RecordPatch {
            name: "M 31".to_string(),
            image_url: Some("/cache/abc/M_31.jpg".to_string()),
            status: Some(ImageStatus::Cached),
            ..Default::default()
        });

        assert_eq!(record.mag, Some(3.4));
        assert_eq!(record.constellation.as_deref(), Some("Andromeda"));
        assert_eq!(record.image_url.as_deref(), Some("/cache/abc/M_31.jpg"));
        assert_eq!(record.status, Some(ImageStatus::Cached));
    }

    #[test]
    fn needs_image_on_empty_url_or_pending() {
        let mut record = ObjectRecord::new("NGC 7000");
        assert!(record.needs_image());

        record.image_url = Some(String::new());
        assert!(record.needs_image());

        record.image_url = Some("/cache/x.jpg".to_string());
        record.status = Some(ImageStatus::Cached);
        assert!(!record.needs_image());

        record.status = Some(ImageStatus::Pending);
        assert!(record.needs_image());
    }

    #[test]
    fn queued_status_decodes_as_pending() {
        let patch: RecordPatch =
            serde_json::from_str(r#"{"name": "M 42", "status": "queued"}"#).unwrap();
        assert_eq!(patch.status, Some(ImageStatus::Pending));
    }

    #[test]
    fn altitude_point_accepts_offsetless_timestamps() {
        let point: AltitudePoint =
            serde_json::from_str(r#"{"time": "2026-08-24T21:30:00.000", "altitude": 41.5}"#)
                .unwrap();
        assert_eq!(point.altitude, 41.5);

        let rfc: AltitudePoint =
            serde_json::from_str(r#"{"time": "2026-08-24T21:30:00Z", "altitude": 41.5}"#).unwrap();
        assert_eq!(point.time, rfc.time);
    }

    #[test]
    fn peak_altitude_prefers_delivered_graph() {
        let mut record = ObjectRecord::new("M 13");
        record.max_altitude = Some(10.0);
        assert_eq!(record.peak_altitude(), Some(10.0));

        record.altitude_graph = vec![
            AltitudePoint { time: Utc::now(), altitude: 20.0 },
            AltitudePoint { time: Utc::now(), altitude: 55.0 },
        ];
        assert_eq!(record.peak_altitude(), Some(55.0));
    }
}
