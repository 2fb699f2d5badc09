use std::sync::Arc;

use latmon::storage::Storage;
use latmon::tasks::TaskScheduler;

/// Shared handles passed to every route handler.
pub struct AppState {
    pub scheduler: Arc<TaskScheduler>,
    pub storage: Arc<dyn Storage>,
}
