use std::sync::{Arc, Mutex};

use log::warn;

use super::state::PlannerState;
use crate::api::ImageFetcher;
use crate::catalog::{ImageStatus, ObjectRecord};
use crate::params::Settings;

/// Keeps exactly one record designated "selected" and guarantees it
/// has a usable image, requesting on-demand acquisition when it does
/// not. The acquisition is point-to-point and survives stream restarts;
/// its eventual resolution merges by name, so a stale response can
/// never clobber a different record.
pub struct SelectionController<F: ImageFetcher> {
    shared: Arc<Mutex<PlannerState>>,
    fetcher: Arc<F>,
}

impl<F: ImageFetcher> Clone for SelectionController<F> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone(), fetcher: self.fetcher.clone() }
    }
}

impl<F: ImageFetcher> SelectionController<F> {
    pub fn new(shared: Arc<Mutex<PlannerState>>, fetcher: Arc<F>) -> Self {
        Self { shared, fetcher }
    }

    pub fn selected(&self) -> Option<String> {
        self.shared.lock().unwrap().selected.clone()
    }

    /// Returns false for names absent from the store.
    pub fn select(&self, name: &str, settings: &Settings) -> bool {
        let pending = {
            let mut state = self.shared.lock().unwrap();
            if !state.select(name) {
                return false;
            }
            state.store.get_mut(name).and_then(|record| {
                if record.needs_image() {
                    // Optimistic: mark in flight before the request.
                    record.status = Some(ImageStatus::Downloading);
                    Some(record.clone())
                } else {
                    None
                }
            })
        };
        if let Some(record) = pending {
            self.spawn_acquisition(record, settings.clone());
        }
        true
    }

    /// Moves selection forward within the given view order, clamped at
    /// the end. No-op on an empty view.
    pub fn next(&self, view: &[String], settings: &Settings) {
        self.step(view, 1, settings);
    }

    /// Moves selection backward, clamped at the start.
    pub fn prev(&self, view: &[String], settings: &Settings) {
        self.step(view, -1, settings);
    }

    fn step(&self, view: &[String], delta: isize, settings: &Settings) {
        if view.is_empty() {
            return;
        }
        let target = match self
            .selected()
            .and_then(|current| view.iter().position(|n| *n == current))
        {
            Some(i) => (i as isize + delta).clamp(0, view.len() as isize - 1) as usize,
            // Selection not in the view: enter it at the nearest edge.
            None => 0,
        };
        self.select(&view[target], settings);
    }

    fn spawn_acquisition(&self, record: ObjectRecord, settings: Settings) {
        let shared = self.shared.clone();
        let fetcher = self.fetcher.clone();
        let name = record.name.clone();
        tokio::spawn(async move {
            match fetcher.acquire(record, settings).await {
                Ok(acquired) => {
                    let mut state = shared.lock().unwrap();
                    if let Some(record) = state.store.get_mut(&name) {
                        record.status = Some(acquired.status);
                        if let Some(url) = acquired.url {
                            record.image_url = Some(url);
                        }
                    }
                }
                Err(e) => {
                    warn!("image acquisition failed for {}: {}", name, e);
                    let mut state = shared.lock().unwrap();
                    if let Some(record) = state.store.get_mut(&name) {
                        record.status = Some(ImageStatus::Error);
                    }
                }
            }
        });
    }
}
