//! Bulk winner selection
//!
//! A bulk job fans out one `select_winner` call per participant. Calls are
//! spawned together; item `i` sleeps `i × stagger` before its request, so
//! the backend sees them spaced out while their completions arrive in any
//! order. Each completion comes back to the UI loop as a `BulkResolution`
//! and is folded into the job's counters there, one at a time.

use crate::api::Backend;
use crate::error::UiError;
use crate::events::AppEvent;
use crate::tui::components::toast::ToastKind;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Spacing between consecutive calls of one job
pub const STAGGER: Duration = Duration::from_millis(200);

/// How long each progress toast stays up
pub const PROGRESS_TOAST: Duration = Duration::from_millis(1000);

pub const EMPTY_SELECTION: &str = "Please select participants to mark as winners";

pub type JobId = u64;

/// Drop repeated ids, keeping first occurrences in order
pub fn dedupe(ids: &[u64]) -> Vec<u64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// One finished call of a bulk job
#[derive(Debug)]
pub struct BulkResolution {
    pub job: JobId,
    pub id: u64,
    pub outcome: Result<String, UiError>,
}

/// Final tally of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkSummary {
    pub completed: usize,
    pub failed: usize,
}

impl BulkSummary {
    pub fn message(&self) -> String {
        format!(
            "Bulk operation completed. {} successful, {} failed.",
            self.completed, self.failed
        )
    }

    pub fn kind(&self) -> ToastKind {
        if self.failed == 0 {
            ToastKind::Success
        } else {
            ToastKind::Warning
        }
    }
}

/// What a single resolution changed
#[derive(Debug, Clone, PartialEq)]
pub struct BulkUpdate {
    pub percent: f64,
    /// Set exactly once, on the resolution that settles the last item
    pub summary: Option<BulkSummary>,
}

impl BulkUpdate {
    pub fn progress_message(&self) -> String {
        format!("Processing: {:.1}% complete", self.percent)
    }
}

/// Counters of one in-flight job
#[derive(Debug, Clone)]
pub struct BulkJob {
    items: Vec<u64>,
    completed: usize,
    failed: usize,
}

impl BulkJob {
    pub fn new(items: Vec<u64>) -> Self {
        Self {
            items,
            completed: 0,
            failed: 0,
        }
    }

    pub fn settled(&self) -> usize {
        self.completed + self.failed
    }

    pub fn is_terminal(&self) -> bool {
        self.settled() == self.items.len()
    }

    pub fn percent(&self) -> f64 {
        if self.items.is_empty() {
            return 100.0;
        }
        self.settled() as f64 / self.items.len() as f64 * 100.0
    }

    /// Fold one outcome into the counters.
    ///
    /// Returns `None` for resolutions arriving after the job already settled.
    pub fn record(&mut self, success: bool) -> Option<BulkUpdate> {
        if self.is_terminal() {
            return None;
        }
        if success {
            self.completed += 1;
        } else {
            self.failed += 1;
        }
        let summary = self.is_terminal().then_some(BulkSummary {
            completed: self.completed,
            failed: self.failed,
        });
        Some(BulkUpdate {
            percent: self.percent(),
            summary,
        })
    }
}

/// All jobs started from this client, keyed by id
#[derive(Debug, Default)]
pub struct BulkTracker {
    next_id: JobId,
    jobs: HashMap<JobId, BulkJob>,
}

impl BulkTracker {
    /// Register a job for the given selection.
    ///
    /// Returns `None` when nothing remains after deduplication.
    pub fn start(&mut self, ids: &[u64]) -> Option<(JobId, Vec<u64>)> {
        let items = dedupe(ids);
        if items.is_empty() {
            return None;
        }
        self.next_id += 1;
        let job = self.next_id;
        tracing::info!(job, count = items.len(), "bulk selection started");
        self.jobs.insert(job, BulkJob::new(items.clone()));
        Some((job, items))
    }

    /// Apply a resolution; finished jobs are dropped from the tracker
    pub fn resolve(&mut self, resolution: &BulkResolution) -> Option<BulkUpdate> {
        let job = self.jobs.get_mut(&resolution.job)?;
        match &resolution.outcome {
            Ok(message) => {
                tracing::debug!(job = resolution.job, id = resolution.id, %message, "winner selected")
            }
            Err(e) => {
                tracing::warn!(job = resolution.job, id = resolution.id, error = %e, "winner selection failed")
            }
        }
        let update = job.record(resolution.outcome.is_ok())?;
        if update.summary.is_some() {
            self.jobs.remove(&resolution.job);
        }
        Some(update)
    }

    pub fn active(&self) -> usize {
        self.jobs.len()
    }
}

/// Spawn one staggered `select_winner` call per item.
///
/// A failed call is reported like any other; it never stops the rest.
pub fn dispatch<B: Backend>(
    backend: Arc<B>,
    job: JobId,
    items: Vec<u64>,
    stagger: Duration,
    tx: mpsc::Sender<AppEvent>,
) {
    for (i, id) in items.into_iter().enumerate() {
        let backend = backend.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(stagger * i as u32).await;
            let outcome = backend.select_winner(id).await.map(|o| o.message);
            let _ = tx
                .send(AppEvent::Bulk(BulkResolution { job, id, outcome }))
                .await;
        });
    }
}
