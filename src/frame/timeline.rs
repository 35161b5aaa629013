use chrono::{DateTime, Utc};

use crate::catalog::{AltitudePoint, NightTimes};

/// Maps an absolute timestamp onto the pixel width spanned by the
/// displayed altitude series, clamped to `[0, width]`.
pub fn time_to_x(
    t: DateTime<Utc>,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    width: f64,
) -> f64 {
    let span = (range_end - range_start).num_milliseconds() as f64;
    if span <= 0.0 || width <= 0.0 {
        return 0.0;
    }
    let offset = (t - range_start).num_milliseconds() as f64;
    (offset / span * width).clamp(0.0, width)
}

/// One twilight zone projected onto the graph, `x0 < x1` guaranteed.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRect {
    pub zone: String,
    pub x0: f64,
    pub x1: f64,
}

/// Projects every night zone onto the time range of the displayed
/// series. Zones clamped down to nothing are discarded.
pub fn zone_rects(times: &NightTimes, samples: &[AltitudePoint], width: f64) -> Vec<ZoneRect> {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Vec::new();
    };
    times
        .iter()
        .filter_map(|(zone, [start, end])| {
            let x0 = time_to_x(*start, first.time, last.time, width);
            let x1 = time_to_x(*end, first.time, last.time, width);
            (x1 > x0).then(|| ZoneRect { zone: zone.to_string(), x0, x1 })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, hour, 0, 0).unwrap()
    }

    fn series() -> Vec<AltitudePoint> {
        (0..=10)
            .map(|i| AltitudePoint { time: t(i), altitude: 45.0 })
            .collect()
    }

    #[test]
    fn interpolates_and_clamps() {
        assert_eq!(time_to_x(t(5), t(0), t(10), 500.0), 250.0);
        assert_eq!(time_to_x(t(0), t(0), t(10), 500.0), 0.0);
        // Out-of-range timestamps clamp to the edges.
        assert_eq!(time_to_x(t(12), t(0), t(10), 500.0), 500.0);
    }

    #[test]
    fn zones_outside_the_range_are_discarded() {
        let mut zones = BTreeMap::new();
        zones.insert("night".to_string(), [t(2), t(6)]);
        zones.insert("civil_morn".to_string(), [t(11), t(12)]);
        let times = NightTimes::from_zones(zones);

        let rects = zone_rects(&times, &series(), 500.0);
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].zone, "night");
        assert_eq!(rects[0].x0, 100.0);
        assert_eq!(rects[0].x1, 300.0);
    }

    #[test]
    fn empty_series_yields_no_rects() {
        let mut zones = BTreeMap::new();
        zones.insert("night".to_string(), [t(2), t(6)]);
        let times = NightTimes::from_zones(zones);
        assert!(zone_rects(&times, &[], 500.0).is_empty());
    }
}
