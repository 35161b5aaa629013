use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::record::{flexible_time, AltitudePoint};

/// One twilight zone: absolute start/end timestamps for the observing
/// night, independent of the altitude-graph sampling grid.
pub type Zone = [DateTime<Utc>; 2];

pub const NIGHT_ZONE: &str = "night";

/// Twilight intervals keyed by zone name (`civil`, `nautical`,
/// `astronomical`, `night` and the morning-mirrored `*_morn` variants).
/// Received once per stream session and replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NightTimes {
    zones: BTreeMap<String, Zone>,
}

impl NightTimes {
    pub fn from_zones(zones: BTreeMap<String, Zone>) -> Self {
        Self { zones }
    }

    pub fn zone(&self, key: &str) -> Option<&Zone> {
        self.zones.get(key)
    }

    /// The fully dark interval, if the backend reported one.
    pub fn night(&self) -> Option<&Zone> {
        self.zone(NIGHT_ZONE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Zone)> {
        self.zones.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl<'de> Deserialize<'de> for NightTimes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, Vec<String>> = Deserialize::deserialize(deserializer)?;
        let mut zones = BTreeMap::new();
        for (key, bounds) in raw {
            if bounds.len() != 2 {
                return Err(de::Error::custom(format!(
                    "zone '{}' must have exactly two timestamps",
                    key
                )));
            }
            let start = flexible_time::parse(&bounds[0])
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", bounds[0])))?;
            let end = flexible_time::parse(&bounds[1])
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", bounds[1])))?;
            zones.insert(key, [start, end]);
        }
        Ok(Self { zones })
    }
}

impl Serialize for NightTimes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.zones.len()))?;
        for (key, [start, end]) in &self.zones {
            map.serialize_entry(key, &[start.to_rfc3339(), end.to_rfc3339()])?;
        }
        map.end()
    }
}

/// Hours during the night window in which the target sits at or above
/// the altitude threshold. Sample spacing is taken from the first two
/// points of the series; without a defined dark window visibility
/// cannot be asserted and the result is 0.0.
pub fn visible_hours(samples: &[AltitudePoint], threshold_deg: f64, night: Option<&Zone>) -> f64 {
    let Some([start, end]) = night else {
        return 0.0;
    };
    if samples.len() < 2 {
        return 0.0;
    }
    let step_hours = (samples[1].time - samples[0].time).num_seconds() as f64 / 3600.0;
    if step_hours <= 0.0 {
        return 0.0;
    }
    let qualifying = samples
        .iter()
        .filter(|p| p.altitude >= threshold_deg && p.time >= *start && p.time <= *end)
        .count();
    round1(qualifying as f64 * step_hours)
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
