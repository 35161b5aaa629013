use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::event::{decode, StreamEvent};
use super::query::StreamQuery;
use super::transport::{Connector, TransportEvent};
use crate::planner::PlannerState;

/// Lifecycle of one stream session. `Stopped`, `Complete` and `Error`
/// are terminal for that session; a fresh `start` is required after any
/// of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Connecting,
    Streaming,
    Complete,
    Error,
    Stopped,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Complete | SessionStatus::Error | SessionStatus::Stopped
        )
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Owns at most one active server-push connection and translates its
/// events into `PlannerState` mutations. Starting a new session always
/// tears the previous connection down first.
pub struct StreamSession {
    connector: Arc<dyn Connector>,
    shared: Arc<Mutex<PlannerState>>,
    worker: Option<WorkerHandle>,
}

impl StreamSession {
    pub fn new(connector: Arc<dyn Connector>, shared: Arc<Mutex<PlannerState>>) -> Self {
        Self { connector, shared, worker: None }
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.lock().unwrap().status
    }

    pub async fn start(&mut self, query: StreamQuery) {
        self.teardown().await;

        let id = Uuid::new_v4();
        {
            let mut state = self.shared.lock().unwrap();
            state.status = SessionStatus::Connecting;
            state.status_text = "connecting".to_string();
            state.session = Some(id);
            state.expected_total = None;
        }
        info!("stream session {} starting ({} mode)", id, query.mode.as_str());

        let events = self.connector.connect(&query);
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_session_loop(self.shared.clone(), id, events, stop_rx));
        self.worker = Some(WorkerHandle { stop_tx, join });
    }

    /// Safe in any state, idempotent. After `stop` returns, no further
    /// event from this session mutates the state.
    pub async fn stop(&mut self) {
        self.teardown().await;
        let mut state = self.shared.lock().unwrap();
        if !matches!(state.status, SessionStatus::Complete | SessionStatus::Error) {
            state.status = SessionStatus::Stopped;
            state.status_text = "stopped".to_string();
        }
    }

    /// Waits for the current session to reach a terminal state. Returns
    /// immediately when no session is running. Cancelling this future
    /// leaves the worker handle in place, so a later `start` or `stop`
    /// can still tear the connection down.
    pub async fn wait(&mut self) {
        if let Some(worker) = self.worker.as_mut() {
            let _ = (&mut worker.join).await;
        }
        self.worker = None;
    }

    async fn teardown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
        }
    }
}

async fn run_session_loop(
    shared: Arc<Mutex<PlannerState>>,
    id: Uuid,
    mut events: mpsc::Receiver<TransportEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut stop_armed = true;
    loop {
        tokio::select! {
            res = &mut stop_rx, if stop_armed => {
                match res {
                    Ok(()) => {
                        finish(&shared, id, SessionStatus::Stopped, "stopped");
                        return;
                    }
                    // Sender dropped without a stop: keep streaming.
                    Err(_) => stop_armed = false,
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    finish(&shared, id, SessionStatus::Complete, "stream ended");
                    return;
                };
                match event {
                    TransportEvent::Open => {
                        let mut state = shared.lock().unwrap();
                        if state.session == Some(id) {
                            state.status = SessionStatus::Streaming;
                            state.status_text = "streaming".to_string();
                        }
                    }
                    TransportEvent::Closed => {
                        finish(&shared, id, SessionStatus::Complete, "stream complete");
                        return;
                    }
                    TransportEvent::Error(message) => {
                        error!("stream session {}: transport error: {}", id, message);
                        finish(&shared, id, SessionStatus::Error, &message);
                        return;
                    }
                    TransportEvent::Event(raw) => match decode(&raw) {
                        Ok(StreamEvent::Close) => {
                            finish(&shared, id, SessionStatus::Complete, "stream complete");
                            return;
                        }
                        Ok(StreamEvent::ServerError(message)) => {
                            error!("stream session {}: backend error: {}", id, message);
                            finish(&shared, id, SessionStatus::Error, &message);
                            return;
                        }
                        Ok(event) => {
                            let mut state = shared.lock().unwrap();
                            if state.session == Some(id) {
                                state.apply(event);
                            }
                        }
                        // One corrupt message must not end the stream.
                        Err(e) => warn!("stream session {}: dropped event: {}", id, e),
                    },
                }
            }
        }
    }
}

fn finish(shared: &Arc<Mutex<PlannerState>>, id: Uuid, status: SessionStatus, text: &str) {
    let mut state = shared.lock().unwrap();
    if state.session != Some(id) {
        return;
    }
    state.status = status;
    state.status_text = text.to_string();
    // Append mode can end without the remembered identity ever arriving;
    // fall back to the first delivered record.
    if status == SessionStatus::Complete && state.selected.is_none() {
        state.selected = state.store.first_name();
    }
}
