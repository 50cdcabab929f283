//! Poll coordinator: one fetch, parse, select and merge cycle at a time.

use super::interval::{next_interval, PollSettings};
use super::state::{PollState, PublishedRecord};
use crate::bulletin::extract_advisories;
use crate::fetch::{BulletinSource, FetchError};
use crate::geo::CoordinatePair;
use crate::selection::{select_nearest, SelectionResult};

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, Mutex};

/// Why a cycle fell back to the sentinel record.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("unexpected status code: {0}")]
    Status(u16),
}

/// Owns the poll state and runs cycles against a bulletin source.
///
/// Cycles are serialized by the state lock. Readers go through the watch
/// channel and never wait on a cycle in flight.
pub struct PollCoordinator<S> {
    source: S,
    settings: PollSettings,
    state: Mutex<PollState>,
    /// Completed cycle count, used to coalesce concurrent refreshes.
    completed: AtomicU64,
    /// Millis until the next scheduled cycle, per the last completed cycle.
    next_interval_ms: AtomicU64,
    published: watch::Sender<PublishedRecord>,
}

impl<S: BulletinSource> PollCoordinator<S> {
    pub fn new(source: S, settings: PollSettings) -> Self {
        let state = PollState::new(settings.reference_point);
        let (published, _) = watch::channel(state.publish());
        let initial_wait = next_interval(&settings, &state.current_record);

        Self {
            source,
            state: Mutex::new(state),
            completed: AtomicU64::new(0),
            next_interval_ms: AtomicU64::new(millis(initial_wait)),
            published,
            settings,
        }
    }

    /// The most recently published record.
    pub fn latest(&self) -> PublishedRecord {
        self.published.borrow().clone()
    }

    /// Receive every newly published record.
    pub fn subscribe(&self) -> watch::Receiver<PublishedRecord> {
        self.published.subscribe()
    }

    /// Wait chosen by the last completed cycle.
    pub fn next_interval(&self) -> Duration {
        Duration::from_millis(self.next_interval_ms.load(Ordering::Acquire))
    }

    /// Run one cycle, or join the one already in flight.
    ///
    /// A caller that has to wait for another cycle gets that cycle's record
    /// rather than starting a second fetch. If this future is dropped before
    /// the fetch completes the state is left untouched.
    pub async fn refresh(&self) -> PublishedRecord {
        let seen = self.completed.load(Ordering::Acquire);
        let mut state = self.state.lock().await;

        if self.completed.load(Ordering::Acquire) != seen {
            tracing::debug!("Refresh joined a cycle that was already in flight");
            return self.latest();
        }

        match self.run_cycle(state.reference_point).await {
            Ok(selection) => {
                match selection.distance_km {
                    Some(d) => tracing::info!(
                        "Nearest cyclone: {} {} at {:.1} km",
                        selection.classification,
                        selection.name,
                        d
                    ),
                    None => tracing::info!("No active cyclone in bulletin"),
                }
                state.apply_success(selection, Utc::now());
            }
            Err(e) => {
                tracing::warn!("Bulletin cycle failed: {}", e);
                state.apply_failure();
            }
        }

        let wait = next_interval(&self.settings, &state.current_record);
        self.next_interval_ms.store(millis(wait), Ordering::Release);

        // Readers woken by the channel must already see this cycle as completed
        let record = state.publish();
        self.completed.fetch_add(1, Ordering::AcqRel);
        self.published.send_replace(record.clone());

        record
    }

    async fn run_cycle(&self, reference: CoordinatePair) -> Result<SelectionResult, CycleError> {
        let timeout = self.settings.fetch_timeout;
        let fetch = self.source.fetch(&self.settings.bulletin_url, timeout);

        let response = tokio::time::timeout(timeout, fetch)
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        if !response.is_ok() {
            return Err(CycleError::Status(response.status));
        }

        let advisories = extract_advisories(&response.body, &self.settings.image_host);
        Ok(select_nearest(reference, &advisories))
    }
}

fn millis(wait: Duration) -> u64 {
    u64::try_from(wait.as_millis()).unwrap_or(u64::MAX)
}
