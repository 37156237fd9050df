//! In-memory registry of crawl runs
//!
//! Each run executes on its own tokio task. The registry tracks its status and
//! keeps the report once the run completes.

use crate::config::Config;
use crate::crawler::engine::{CrawlEngine, CrawlReport, StopHandle};
use crate::frontier::Algorithm;
use crate::output::CrawlStats;
use crate::state::{FoundLinksIndex, RunStatus};
use crate::{CrawlError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinError;
use uuid::Uuid;

/// Point-in-time view of a run
///
/// `found_links` and `stats` are only present once the run has completed.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub id: Uuid,
    pub start_url: String,
    pub algorithm: Algorithm,
    pub status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CrawlStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_links: Option<FoundLinksIndex>,
}

struct RunEntry {
    snapshot: RunSnapshot,
    stop: StopHandle,
}

/// Registry of crawl runs, cheap to clone and share between callers
#[derive(Clone, Default)]
pub struct RunRegistry {
    runs: Arc<Mutex<HashMap<Uuid, RunEntry>>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, RunEntry>> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a crawl run in the background and returns its id
    ///
    /// Must be called from within a tokio runtime. A run whose start URL is
    /// invalid, or whose engine panics, ends in [`RunStatus::Failed`].
    pub fn start_run(&self, start_url: &str, algorithm: Algorithm, config: Config) -> Uuid {
        let engine = CrawlEngine::new(config, algorithm);
        let id = self.register(start_url, algorithm, engine.stop_handle());

        let start_url = start_url.to_string();
        self.spawn_run(id, async move { engine.run(&start_url).await });

        tracing::info!(run_id = %id, algorithm = %algorithm, "run started");
        id
    }

    fn register(&self, start_url: &str, algorithm: Algorithm, stop: StopHandle) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            RunEntry {
                snapshot: RunSnapshot {
                    id,
                    start_url: start_url.to_string(),
                    algorithm,
                    status: RunStatus::Pending,
                    created_at: Utc::now(),
                    finished_at: None,
                    error: None,
                    stats: None,
                    found_links: None,
                },
                stop,
            },
        );
        id
    }

    /// Drives `run` on its own task so a panic still leaves the run terminal
    fn spawn_run<F>(&self, id: Uuid, run: F)
    where
        F: Future<Output = Result<CrawlReport>> + Send + 'static,
    {
        let registry = self.clone();
        tokio::spawn(async move {
            registry.set_status(id, RunStatus::Running);
            let outcome = match tokio::spawn(run).await {
                Ok(outcome) => outcome.map_err(|e| e.to_string()),
                Err(e) => Err(join_failure(e)),
            };
            registry.finish(id, outcome);
        });
    }

    /// Returns the current snapshot of a run
    pub fn get_status(&self, id: Uuid) -> Result<RunSnapshot> {
        self.lock()
            .get(&id)
            .map(|entry| entry.snapshot.clone())
            .ok_or(CrawlError::RunNotFound(id))
    }

    /// Asks a run to stop launching new fetches
    ///
    /// The run drains its in-flight fetches and then completes.
    pub fn stop_run(&self, id: Uuid) -> Result<()> {
        let runs = self.lock();
        let entry = runs.get(&id).ok_or(CrawlError::RunNotFound(id))?;
        entry.stop.stop();
        tracing::info!(run_id = %id, "stop requested");
        Ok(())
    }

    /// Ids of all known runs, oldest first
    pub fn run_ids(&self) -> Vec<Uuid> {
        let runs = self.lock();
        let mut ids: Vec<_> = runs
            .values()
            .map(|entry| (entry.snapshot.created_at, entry.snapshot.id))
            .collect();
        ids.sort();
        ids.into_iter().map(|(_, id)| id).collect()
    }

    fn set_status(&self, id: Uuid, status: RunStatus) {
        if let Some(entry) = self.lock().get_mut(&id) {
            entry.snapshot.status = status;
        }
    }

    fn finish(&self, id: Uuid, outcome: std::result::Result<CrawlReport, String>) {
        let mut runs = self.lock();
        let Some(entry) = runs.get_mut(&id) else {
            return;
        };
        let snapshot = &mut entry.snapshot;
        snapshot.finished_at = Some(Utc::now());

        match outcome {
            Ok(report) => {
                snapshot.status = RunStatus::Completed;
                snapshot.stats = Some(report.stats);
                snapshot.found_links = Some(report.found_links);
                tracing::info!(run_id = %id, "run completed");
            }
            Err(error) => {
                tracing::warn!(run_id = %id, error = %error, "run failed");
                snapshot.status = RunStatus::Failed;
                snapshot.error = Some(error);
            }
        }
    }
}

/// Describes why a run task ended without producing a result
fn join_failure(e: JoinError) -> String {
    if !e.is_panic() {
        return "run task cancelled".to_string();
    }
    let payload = e.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    match message {
        Some(msg) => format!("run panicked: {}", msg),
        None => "run panicked".to_string(),
    }
}
