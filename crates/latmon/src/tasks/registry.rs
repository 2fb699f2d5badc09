use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

/// Length of generated task labels.
const LABEL_LEN: usize = 6;

/// Progress of one probing run.
///
/// `progress` is a fraction in `[0, 1]`, monotonically non-decreasing
/// within a run and exactly `1.0` once every target has been probed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub label: String,
    pub progress: f64,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whether the run this task tracks is still going.
    pub fn in_flight(&self) -> bool {
        self.progress != 1.0
    }
}

/// In-memory store of run progress, keyed by task label.
///
/// All mutations go through one mutex, so interleaved probe completions can
/// never observe a half-applied write. Entries are never evicted; they live
/// for the process lifetime.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Mutex<HashMap<String, Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh task with a unique label and zero progress.
    pub fn create(&self) -> Task {
        let mut tasks = self.tasks.lock();
        loop {
            let label = generate_label();
            if tasks.contains_key(&label) {
                continue;
            }
            let task = Task { label: label.clone(), progress: 0.0, created_at: Utc::now() };
            tasks.insert(label, task.clone());
            return task;
        }
    }

    pub fn get(&self, label: &str) -> Option<Task> {
        self.tasks.lock().get(label).cloned()
    }

    /// Snapshot of every task. Order is unspecified.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.lock().values().cloned().collect()
    }

    /// Insert-or-replace by label.
    pub fn put(&self, task: Task) {
        self.tasks.lock().insert(task.label.clone(), task);
    }

    #[cfg(test)]
    pub(crate) fn remove(&self, label: &str) {
        self.tasks.lock().remove(label);
    }
}

fn generate_label() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(LABEL_LEN).map(char::from).collect()
}
