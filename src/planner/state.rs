use uuid::Uuid;

use crate::catalog::{view_order, NightTimes, ObjectRecord, RecordStore, ViewQuery};
use crate::params::Settings;
use crate::stream::{SessionStatus, StreamEvent};

/// The one shared mutable state read and written by every component:
/// the record store, the night windows, the selection and the session
/// status. All mutation happens on discrete event callbacks under one
/// lock; the stream reducer lives here so it is unit-testable without a
/// live connection.
#[derive(Debug)]
pub struct PlannerState {
    pub status: SessionStatus,
    pub status_text: String,
    /// Id of the authoritative stream session. Events tagged with any
    /// other id are from a superseded connection and must not mutate
    /// the store.
    pub session: Option<Uuid>,
    pub night_times: NightTimes,
    pub store: RecordStore,
    pub selected: Option<String>,
    /// Selection identity remembered across catalog replacement.
    pub remembered: Option<String>,
    pub expected_total: Option<u64>,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            status_text: String::new(),
            session: None,
            night_times: NightTimes::default(),
            store: RecordStore::new(),
            selected: None,
            remembered: None,
            expected_total: None,
        }
    }
}

impl PlannerState {
    /// Reducer for one stream event. Session-terminal events (`close`,
    /// backend errors) are handled by the session loop, not here.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Total(n) => {
                self.expected_total = Some(n);
                self.status_text = format!("{} objects matched", n);
            }
            StreamEvent::NightTimes(times) => {
                self.night_times = times;
            }
            StreamEvent::CatalogMetadata(patches) => {
                let records = patches.into_iter().map(ObjectRecord::from_patch).collect();
                self.store.replace_all(records);
                self.selected = self
                    .selected
                    .take()
                    .filter(|name| self.store.contains(name))
                    .or_else(|| {
                        self.remembered
                            .clone()
                            .filter(|name| self.store.contains(name))
                    })
                    .or_else(|| self.store.first_name());
            }
            StreamEvent::ObjectData(patch) => {
                let name = patch.name.clone();
                self.store.upsert(patch);
                if self.selected.is_none() {
                    let remembered_match = self.remembered.as_deref() == Some(name.as_str());
                    if remembered_match || (self.remembered.is_none() && self.store.len() == 1) {
                        self.selected = Some(name);
                    }
                }
            }
            StreamEvent::ObjectDetails(patch) => {
                // Late events after truncation reference unknown names;
                // those are silently ignored.
                self.store.merge_existing(patch);
            }
            StreamEvent::ImageStatus(ev) => {
                if let Some(record) = self.store.get_mut(&ev.name) {
                    record.status = Some(ev.status);
                    if let Some(url) = ev.url {
                        record.image_url = Some(url);
                    }
                    if let Some(fov) = ev.fov {
                        record.image_fov = Some(fov);
                    }
                }
            }
            StreamEvent::DownloadProgress { current, total } => {
                self.status_text = format!("downloading images {}/{}", current, total);
            }
            StreamEvent::ProcessingProgress(n) => {
                self.status_text = format!("processed {} objects", n);
            }
            StreamEvent::Close | StreamEvent::ServerError(_) => {}
        }
    }

    /// User-driven selection; returns false for unknown names.
    pub fn select(&mut self, name: &str) -> bool {
        if !self.store.contains(name) {
            return false;
        }
        self.selected = Some(name.to_string());
        self.remembered = Some(name.to_string());
        true
    }

    pub fn selected_record(&self) -> Option<&ObjectRecord> {
        self.selected.as_deref().and_then(|name| self.store.get(name))
    }

    /// The ordered, filtered view list for the current settings.
    pub fn view(&self, settings: &Settings, search: &str) -> Vec<String> {
        view_order(
            self.store.all(),
            &ViewQuery {
                search,
                filters: &settings.filters,
                min_altitude: settings.min_altitude,
                sort_key: settings.sort_key,
                night: self.night_times.night(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ImageStatus, RecordPatch};
    use crate::stream::event::ImageStatusEvent;

    fn patch(name: &str) -> RecordPatch {
        RecordPatch { name: name.to_string(), ..Default::default() }
    }

    fn metadata(names: &[&str]) -> StreamEvent {
        StreamEvent::CatalogMetadata(names.iter().map(|n| patch(n)).collect())
    }

    #[test]
    fn catalog_metadata_preserves_selection_when_possible() {
        let mut state = PlannerState::default();
        state.apply(metadata(&["M 31", "M 42", "M 45"]));
        assert_eq!(state.selected.as_deref(), Some("M 31"));

        state.select("M 42");
        state.apply(metadata(&["M 42", "M 45"]));
        assert_eq!(state.selected.as_deref(), Some("M 42"));

        state.apply(metadata(&["M 1", "M 13"]));
        assert_eq!(state.selected.as_deref(), Some("M 1"));
    }

    #[test]
    fn remembered_identity_survives_replacement() {
        let mut state = PlannerState::default();
        state.apply(metadata(&["M 31", "M 42"]));
        state.select("M 42");

        // Replacement drops the name, selection falls back to first.
        state.apply(metadata(&["M 31", "M 45"]));
        assert_eq!(state.selected.as_deref(), Some("M 31"));

        // But once it reappears the remembered identity wins again.
        state.selected = None;
        state.apply(metadata(&["M 31", "M 42"]));
        assert_eq!(state.selected.as_deref(), Some("M 42"));
    }

    #[test]
    fn object_data_auto_selects_first_append() {
        let mut state = PlannerState::default();
        state.apply(StreamEvent::ObjectData(patch("M 31")));
        state.apply(StreamEvent::ObjectData(patch("M 42")));
        assert_eq!(state.selected.as_deref(), Some("M 31"));
    }

    #[test]
    fn object_data_waits_for_remembered_identity() {
        let mut state = PlannerState::default();
        state.remembered = Some("M 42".to_string());
        state.apply(StreamEvent::ObjectData(patch("M 31")));
        assert_eq!(state.selected, None);
        state.apply(StreamEvent::ObjectData(patch("M 42")));
        assert_eq!(state.selected.as_deref(), Some("M 42"));
    }

    #[test]
    fn details_merge_retains_existing_fields() {
        let mut state = PlannerState::default();
        let mut first = patch("M 31");
        first.mag = Some(3.4);
        first.constellation = Some("Andromeda".to_string());
        state.apply(StreamEvent::CatalogMetadata(vec![first]));

        let mut details = patch("M 31");
        details.maj_ax = Some(178.0);
        state.apply(StreamEvent::ObjectDetails(details));

        let record = state.store.get("M 31").unwrap();
        assert_eq!(record.mag, Some(3.4));
        assert_eq!(record.constellation.as_deref(), Some("Andromeda"));
        assert_eq!(record.maj_ax, Some(178.0));

        // Unknown name is a silent no-op.
        state.apply(StreamEvent::ObjectDetails(patch("M 99")));
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn image_status_merges_url_and_fov() {
        let mut state = PlannerState::default();
        state.apply(metadata(&["M 31"]));
        state.apply(StreamEvent::ImageStatus(ImageStatusEvent {
            name: "M 31".to_string(),
            status: ImageStatus::Cached,
            url: Some("/cache/x.jpg".to_string()),
            fov: Some(2.1),
        }));
        let record = state.store.get("M 31").unwrap();
        assert_eq!(record.status, Some(ImageStatus::Cached));
        assert_eq!(record.image_url.as_deref(), Some("/cache/x.jpg"));
        assert_eq!(record.image_fov, Some(2.1));
    }

    #[test]
    fn progress_events_touch_status_text_only() {
        let mut state = PlannerState::default();
        state.apply(metadata(&["M 31"]));
        state.apply(StreamEvent::DownloadProgress { current: 3, total: 10 });
        assert_eq!(state.status_text, "downloading images 3/10");
        assert_eq!(state.store.len(), 1);
    }
}
