//! Scheduler module for polling the bulletin.

mod coordinator;
mod interval;
mod state;

pub use coordinator::*;
pub use interval::*;
pub use state::*;

use crate::fetch::BulletinSource;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Upper bound of the random delay added to each scheduled wait.
const MAX_JITTER_MS: u64 = 1000;

/// Fallback wait when a deadline would overflow the clock.
const MAX_WAIT: Duration = Duration::from_secs(7 * 24 * 3600);

/// Background loop that runs scheduled cycles on the coordinator.
///
/// Manual refreshes go straight to [`PollCoordinator::refresh`] and do not
/// move the scheduled deadline.
pub struct Poller<S> {
    coordinator: Arc<PollCoordinator<S>>,
    stop: Arc<Mutex<Option<tokio::sync::broadcast::Sender<()>>>>,
}

impl<S: BulletinSource> Poller<S> {
    pub fn new(coordinator: Arc<PollCoordinator<S>>) -> Self {
        Self {
            coordinator,
            stop: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the poll loop. The first cycle runs immediately.
    pub async fn start(&self) {
        let (tx, _) = tokio::sync::broadcast::channel(1);
        let mut rx = tx.subscribe();
        {
            let mut stop_guard = self.stop.lock().await;
            if stop_guard.is_some() {
                return; // Already running
            }
            *stop_guard = Some(tx);
        }

        let coordinator = self.coordinator.clone();

        tokio::spawn(async move {
            let mut deadline = Instant::now();

            loop {
                tokio::select! {
                    _ = rx.recv() => break,
                    _ = tokio::time::sleep_until(deadline) => {
                        coordinator.refresh().await;

                        let wait = coordinator.next_interval() + jitter();
                        tracing::debug!("Poller: next scheduled cycle in {:?}", wait);
                        let now = Instant::now();
                        deadline = now.checked_add(wait).unwrap_or(now + MAX_WAIT);
                    }
                }
            }

            tracing::info!("Poller: stopped");
        });
    }

    /// Stop the poll loop.
    pub async fn stop(&self) {
        let mut stop = self.stop.lock().await;
        if let Some(tx) = stop.take() {
            let _ = tx.send(());
        }
    }
}

fn jitter() -> Duration {
    Duration::from_millis(rand::random::<u64>() % MAX_JITTER_MS)
}
