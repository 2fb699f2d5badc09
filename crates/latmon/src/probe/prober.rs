use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use super::pinger::Pinger;
use crate::storage::models::Target;

/// One finished measurement, reported as soon as it completes.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub target: Target,
    pub latency_ms: f64,
}

/// Concurrent fan-out over a batch of targets.
pub struct Prober {
    pinger: Arc<dyn Pinger>,
}

impl Prober {
    pub fn new(pinger: Arc<dyn Pinger>) -> Self {
        Self { pinger }
    }

    /// Launch one measurement per target, all in flight at once.
    ///
    /// Outcomes arrive on the returned channel in completion order, which
    /// is unrelated to input order. The channel closes once every target
    /// has reported, so draining it to exhaustion observes the full batch.
    pub fn probe_all(&self, targets: Vec<Target>) -> mpsc::Receiver<ProbeOutcome> {
        // Capacity covers the whole batch so no probe task ever blocks on a
        // slow consumer.
        let (tx, rx) = mpsc::channel(targets.len().max(1));

        for target in targets {
            let pinger = Arc::clone(&self.pinger);
            let tx = tx.clone();
            tokio::spawn(async move {
                let latency_ms = pinger.measure(&target.address).await;
                if tx.send(ProbeOutcome { target, latency_ms }).await.is_err() {
                    warn!("probe outcome receiver dropped before batch completion");
                }
            });
        }

        rx
    }
}
