use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::night::{visible_hours, Zone};
use super::record::ObjectRecord;
use crate::params::ClientFilterSettings;

/// Active sort key for the view list. `altitude` is the historical
/// wire spelling of `time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[serde(alias = "altitude")]
    Time,
    HoursAbove,
    Brightness,
    Size,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Time => "time",
            SortKey::HoursAbove => "hours_above",
            SortKey::Brightness => "brightness",
            SortKey::Size => "size",
        }
    }
}

/// Inputs to one view recomputation. A non-empty search string
/// overrides every other filter.
#[derive(Debug, Clone, Copy)]
pub struct ViewQuery<'a> {
    pub search: &'a str,
    pub filters: &'a ClientFilterSettings,
    pub min_altitude: f64,
    pub sort_key: SortKey,
    pub night: Option<&'a Zone>,
}

/// Magnitude assumed for records without one; matches the backend's
/// placeholder so such records fail any magnitude cap.
const UNKNOWN_MAG: f64 = 99.0;

/// Recomputes the ordered, filtered view as a list of record names.
pub fn view_order(records: &[ObjectRecord], query: &ViewQuery) -> Vec<String> {
    let search = normalize(query.search);
    if !search.is_empty() {
        return search_order(records, &search);
    }

    let mut view: Vec<(&ObjectRecord, f64, f64)> = records
        .iter()
        .filter_map(|r| {
            let peak = r.peak_altitude().unwrap_or(0.0);
            let hours = visible_hours(&r.altitude_graph, query.min_altitude, query.night);
            passes_filters(r, peak, hours, query).then_some((r, peak, hours))
        })
        .collect();

    view.sort_by(|a, b| compare(a, b, query.sort_key));
    view.into_iter().map(|(r, _, _)| r.name.clone()).collect()
}

fn passes_filters(record: &ObjectRecord, peak: f64, hours: f64, query: &ViewQuery) -> bool {
    if peak < query.min_altitude {
        return false;
    }
    if hours < query.filters.min_hours {
        return false;
    }
    if let Some(max_mag) = query.filters.max_magnitude {
        if record.mag.unwrap_or(UNKNOWN_MAG) > max_mag {
            return false;
        }
    }
    if let Some(min_size) = query.filters.min_size {
        if record.maj_ax.unwrap_or(0.0) < min_size {
            return false;
        }
    }
    if !query.filters.selected_types.is_empty() {
        let object_type = record.object_type.as_deref().unwrap_or("");
        if !query
            .filters
            .selected_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(object_type))
        {
            return false;
        }
    }
    true
}

fn compare(a: &(&ObjectRecord, f64, f64), b: &(&ObjectRecord, f64, f64), key: SortKey) -> Ordering {
    let (ra, peak_a, hours_a) = a;
    let (rb, peak_b, hours_b) = b;
    let ordering = match key {
        SortKey::Time => peak_b.partial_cmp(peak_a),
        SortKey::HoursAbove => hours_b.partial_cmp(hours_a),
        SortKey::Brightness => ra
            .mag
            .unwrap_or(UNKNOWN_MAG)
            .partial_cmp(&rb.mag.unwrap_or(UNKNOWN_MAG)),
        SortKey::Size => rb
            .maj_ax
            .unwrap_or(0.0)
            .partial_cmp(&ra.maj_ax.unwrap_or(0.0)),
    };
    ordering.unwrap_or(Ordering::Equal)
}

/// Search ranking: exact match first, then prefix match, then shorter
/// names, then lexical order. Matches against the normalized identity,
/// common name and alternate id.
fn search_order(records: &[ObjectRecord], needle: &str) -> Vec<String> {
    let mut hits: Vec<(&ObjectRecord, u8, u8)> = records
        .iter()
        .filter_map(|r| {
            let keys = [
                Some(normalize(&r.name)),
                r.common_name.as_deref().map(normalize),
                r.other_id.as_deref().map(normalize),
            ];
            let keys: Vec<String> = keys.into_iter().flatten().collect();
            if !keys.iter().any(|k| k.contains(needle)) {
                return None;
            }
            let exact = keys.iter().any(|k| k == needle);
            let prefix = keys.iter().any(|k| k.starts_with(needle));
            Some((r, u8::from(!exact), u8::from(!prefix)))
        })
        .collect();

    hits.sort_by(|(a, a_exact, a_prefix), (b, b_exact, b_prefix)| {
        (a_exact, a_prefix, a.name.len(), &a.name).cmp(&(b_exact, b_prefix, b.name.len(), &b.name))
    });
    hits.into_iter().map(|(r, _, _)| r.name.clone()).collect()
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
