use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::info;
use tokio::sync::mpsc;

use super::selection::SelectionController;
use super::state::PlannerState;
use crate::api::ImageFetcher;
use crate::params::{ParameterSnapshot, ParameterWatcher, Settings};
use crate::stream::{Connector, DownloadMode, SessionStatus, StreamQuery, StreamSession};

/// Owns the whole client engine: the shared state, the stream session,
/// the parameter watcher and the selection controller, wired the same
/// way throughout so a fake transport and a stub fetcher can drive it
/// in tests.
pub struct Planner<F: ImageFetcher> {
    shared: Arc<Mutex<PlannerState>>,
    session: StreamSession,
    watcher: ParameterWatcher,
    restart_rx: mpsc::Receiver<ParameterSnapshot>,
    selection: SelectionController<F>,
    settings: Settings,
    mode: DownloadMode,
}

impl<F: ImageFetcher> Planner<F> {
    pub fn new(
        connector: Arc<dyn Connector>,
        fetcher: Arc<F>,
        settings: Settings,
        debounce: Duration,
        mode: DownloadMode,
    ) -> Self {
        let shared = Arc::new(Mutex::new(PlannerState::default()));
        let (restart_tx, restart_rx) = mpsc::channel(8);
        let mut watcher = ParameterWatcher::new(debounce, restart_tx);
        // Prime the baseline so the initial load never restarts.
        watcher.observe(&settings);
        let session = StreamSession::new(connector, shared.clone());
        let selection = SelectionController::new(shared.clone(), fetcher);
        Self { shared, session, watcher, restart_rx, selection, settings, mode }
    }

    pub fn state(&self) -> Arc<Mutex<PlannerState>> {
        self.shared.clone()
    }

    pub fn selection(&self) -> &SelectionController<F> {
        &self.selection
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn status_text(&self) -> String {
        self.shared.lock().unwrap().status_text.clone()
    }

    /// Applies a settings mutation; a semantic parameter change arms
    /// the debounced restart.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.watcher.observe(&self.settings);
    }

    pub async fn start(&mut self) {
        let query = StreamQuery::new(
            ParameterSnapshot::of(&self.settings),
            self.settings.filters.clone(),
            self.mode,
        );
        self.session.start(query).await;
    }

    pub async fn stop(&mut self) {
        self.session.stop().await;
    }

    pub fn view(&self, search: &str) -> Vec<String> {
        self.shared.lock().unwrap().view(&self.settings, search)
    }

    /// Runs the current session to a terminal state, restarting it
    /// whenever the watcher reports a settled parameter change.
    /// Debounce-triggered restarts always use `selected` mode.
    pub async fn run_session(&mut self) {
        self.start().await;
        loop {
            tokio::select! {
                _ = self.session.wait() => {
                    match self.restart_rx.try_recv() {
                        Ok(snapshot) => self.restart(snapshot).await,
                        Err(_) => break,
                    }
                }
                Some(snapshot) = self.restart_rx.recv() => {
                    self.restart(snapshot).await;
                }
            }
        }
    }

    async fn restart(&mut self, snapshot: ParameterSnapshot) {
        info!("parameters changed, restarting stream");
        let query =
            StreamQuery::new(snapshot, self.settings.filters.clone(), DownloadMode::Selected);
        self.session.start(query).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ImageAcquisition};
    use crate::catalog::{ImageStatus, ObjectRecord};
    use crate::stream::{RawEvent, TransportEvent};
    use futures_util::future::BoxFuture;
    use std::collections::VecDeque;

    struct NoopFetcher;

    impl ImageFetcher for NoopFetcher {
        fn acquire(
            &self,
            _object: ObjectRecord,
            _settings: Settings,
        ) -> BoxFuture<'static, Result<ImageAcquisition, ApiError>> {
            Box::pin(async { Ok(ImageAcquisition { url: None, status: ImageStatus::Pending }) })
        }
    }

    struct ScriptedConnector {
        scripts: Mutex<VecDeque<mpsc::Receiver<TransportEvent>>>,
    }

    impl Connector for ScriptedConnector {
        fn connect(&self, _query: &StreamQuery) -> mpsc::Receiver<TransportEvent> {
            self.scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| mpsc::channel(1).1)
        }
    }

    fn raw(event: &str, data: &str) -> TransportEvent {
        TransportEvent::Event(RawEvent { event: event.to_string(), data: data.to_string() })
    }

    #[tokio::test]
    async fn debounced_restart_closes_the_old_connection() {
        let (tx1, rx1) = mpsc::channel(64);
        let (tx2, rx2) = mpsc::channel(64);
        let connector = Arc::new(ScriptedConnector {
            scripts: Mutex::new(VecDeque::from([rx1, rx2])),
        });
        let mut planner = Planner::new(
            connector,
            Arc::new(NoopFetcher),
            Settings::default(),
            Duration::from_millis(50),
            DownloadMode::Selected,
        );
        let shared = planner.state();

        // Arm the debounce before the session loop starts.
        let mut edited = Settings::default();
        edited.telescope.focal_length = 600.0;
        planner.update_settings(edited);

        let driver = tokio::spawn(async move { planner.run_session().await });

        let _ = tx1.send(TransportEvent::Open).await;
        let _ = tx1.send(raw("object_data", r#"{"name": "old"}"#)).await;

        // The settled parameter change must tear the first connection
        // down before the replacement connects.
        for _ in 0..200 {
            if tx1.is_closed() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(tx1.is_closed());

        tx2.send(TransportEvent::Open).await.unwrap();
        tx2.send(raw("catalog_metadata", r#"[{"name": "new"}]"#))
            .await
            .unwrap();
        tx2.send(raw("close", "")).await.unwrap();
        driver.await.unwrap();

        let state = shared.lock().unwrap();
        assert_eq!(state.status, SessionStatus::Complete);
        assert!(state.store.contains("new"));
    }
}
