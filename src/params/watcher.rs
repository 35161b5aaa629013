use std::time::Duration;

use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::settings::Settings;
use super::snapshot::ParameterSnapshot;

/// Watches settings mutations and debounces stream restarts.
///
/// Trailing-edge: each semantic change re-arms the timer, so a user
/// scrubbing a numeric field produces one restart request when input
/// goes quiet. The first observed snapshot only primes the comparison
/// state; structurally equal snapshots never arm the timer.
pub struct ParameterWatcher {
    debounce: Duration,
    restart_tx: mpsc::Sender<ParameterSnapshot>,
    last: Option<ParameterSnapshot>,
    timer: Option<JoinHandle<()>>,
}

impl ParameterWatcher {
    pub fn new(debounce: Duration, restart_tx: mpsc::Sender<ParameterSnapshot>) -> Self {
        Self { debounce, restart_tx, last: None, timer: None }
    }

    pub fn observe(&mut self, settings: &Settings) {
        let snapshot = ParameterSnapshot::of(settings);
        match &self.last {
            None => {
                // Initial load establishes the baseline without a restart.
                self.last = Some(snapshot);
                return;
            }
            Some(prev) if *prev == snapshot => return,
            Some(_) => {}
        }
        self.last = Some(snapshot.clone());
        self.arm(snapshot);
    }

    fn arm(&mut self, snapshot: ParameterSnapshot) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        debug!("parameters changed, debouncing restart");
        let tx = self.restart_tx.clone();
        let delay = self.debounce;
        self.timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(snapshot).await;
        }));
    }
}

impl Drop for ParameterWatcher {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
