use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A probing target: one IP address under observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: Uuid,
    pub address: String,
}

/// One persisted latency measurement for a target.
///
/// `latency_ms` is always positive here; failed probes are never written to
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySample {
    pub id: Option<i64>,
    pub target_id: Uuid,
    pub address: String,
    pub latency_ms: f64,
    pub created_at: DateTime<Utc>,
}

/// Row-to-be for the bulk insert at the end of a probing run.
#[derive(Debug, Clone)]
pub struct NewSample {
    pub target_id: Uuid,
    pub address: String,
    pub latency_ms: f64,
}

/// Time-window and address filter for sample queries.
///
/// `after`/`before` are inclusive bounds on `created_at`.
#[derive(Debug, Clone, Default)]
pub struct SampleFilter {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    pub address: Option<String>,
}
