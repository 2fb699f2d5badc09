use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::registry::{Task, TaskRegistry};
use crate::probe::Prober;
use crate::storage::Storage;
use crate::storage::models::NewSample;

/// Outcome of a run-trigger request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// A run is already in flight; its label is returned instead of
    /// starting a new one. Safe for callers to retry.
    AlreadyRunning(String),
    /// A new run was accepted and handed to the worker.
    Started(String),
}

impl Admission {
    pub fn label(&self) -> &str {
        match self {
            Admission::AlreadyRunning(label) | Admission::Started(label) => label,
        }
    }
}

struct RunJob {
    task: Task,
}

/// Orchestrates probing runs: single-flight admission, progress updates as
/// probes complete, and persistence of successful results on completion.
///
/// Accepted runs are queued to a single worker task, so only one run
/// executes at a time process-wide; admission against the registry remains
/// the authoritative single-flight guarantee regardless of queue depth.
pub struct TaskScheduler {
    registry: Arc<TaskRegistry>,
    job_tx: mpsc::Sender<RunJob>,
    // Admission scan and task creation happen under one guard so two
    // concurrent triggers cannot both pass the scan.
    admission: Mutex<()>,
}

impl TaskScheduler {
    /// Create the scheduler and spawn its run worker.
    pub fn new(registry: Arc<TaskRegistry>, storage: Arc<dyn Storage>, prober: Prober) -> Self {
        let (job_tx, mut job_rx) = mpsc::channel::<RunJob>(1);

        let worker_registry = Arc::clone(&registry);
        tokio::spawn(async move {
            while let Some(job) = job_rx.recv().await {
                let label = job.task.label.clone();
                if let Err(err) = run_pipeline(&worker_registry, storage.as_ref(), &prober, job.task).await
                {
                    error!("probing run {label} failed: {err:#}");
                }
            }
        });

        Self { registry, job_tx, admission: Mutex::new(()) }
    }

    /// Trigger a probing run.
    ///
    /// Returns immediately in both cases; the run itself proceeds on the
    /// worker. When a run is already in flight its label is returned and
    /// nothing new is started.
    pub fn start_run(&self) -> Admission {
        let _guard = self.admission.lock();

        if let Some(active) = self.registry.list().into_iter().find(Task::in_flight) {
            return Admission::AlreadyRunning(active.label);
        }

        let task = self.registry.create();
        let label = task.label.clone();
        info!("accepted probing run {label}");

        // The worker outlives the scheduler and the queue is empty whenever
        // admission passes, so this cannot reject a job in practice.
        if let Err(err) = self.job_tx.try_send(RunJob { task }) {
            error!("failed to enqueue probing run {label}: {err}");
        }

        Admission::Started(label)
    }

    pub fn get_task(&self, label: &str) -> Option<Task> {
        self.registry.get(label)
    }

    pub fn list_tasks(&self) -> Vec<Task> {
        self.registry.list()
    }
}

/// One full probing pass: fetch targets, fan out, track progress, persist
/// successes.
async fn run_pipeline(
    registry: &TaskRegistry,
    storage: &dyn Storage,
    prober: &Prober,
    mut task: Task,
) -> Result<()> {
    let targets = storage.list_targets().await?;
    let total = targets.len();

    if total == 0 {
        info!("run {}: no targets configured", task.label);
        task.progress = 1.0;
        registry.put(task);
        return Ok(());
    }

    let mut outcomes = Vec::with_capacity(total);
    let mut done = 0usize;
    let mut rx = prober.probe_all(targets);

    while let Some(outcome) = rx.recv().await {
        // The local counter is the single source of truth for progress;
        // completions all arrive on this one receiver, so it can only grow.
        done += 1;

        task = match registry.get(&task.label) {
            Some(saved) => saved,
            None => {
                warn!("run {}: task vanished from registry, restoring it", task.label);
                task
            }
        };
        task.progress = done as f64 / total as f64;
        registry.put(task.clone());

        outcomes.push(outcome);
    }

    let successes: Vec<NewSample> = outcomes
        .iter()
        .filter(|outcome| outcome.latency_ms > 0.0)
        .map(|outcome| NewSample {
            target_id: outcome.target.id,
            address: outcome.target.address.clone(),
            latency_ms: outcome.latency_ms,
        })
        .collect();

    if successes.is_empty() {
        error!("run {}: all {total} probes failed, nothing to persist", task.label);
        return Ok(());
    }

    info!("run {}: persisting {}/{total} successful probes", task.label, successes.len());
    storage.insert_samples(&successes).await?;
    Ok(())
}
