use std::time::{Duration, Instant};

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Sentinel latency returned for any failed measurement.
pub const FAILED_MEASUREMENT: f64 = -1.0;

/// Latency measurement primitive.
#[async_trait::async_trait]
pub trait Pinger: Send + Sync {
    /// Measure latency to `address` in milliseconds.
    ///
    /// Returns a positive latency on success and [`FAILED_MEASUREMENT`] on
    /// timeout or any connection failure. Implementations must resolve a
    /// timeout to the sentinel rather than hang.
    async fn measure(&self, address: &str) -> f64;
}

/// Measures latency as the time to complete a TCP handshake against a fixed
/// port.
pub struct TcpPinger {
    port: u16,
    timeout_duration: Duration,
}

impl TcpPinger {
    pub fn new(port: u16, timeout_seconds: u64) -> Self {
        Self { port, timeout_duration: Duration::from_secs(timeout_seconds) }
    }
}

#[async_trait::async_trait]
impl Pinger for TcpPinger {
    async fn measure(&self, address: &str) -> f64 {
        let start = Instant::now();
        let connect = TcpStream::connect((address, self.port));

        match timeout(self.timeout_duration, connect).await {
            // Sub-millisecond handshakes must still read as successes.
            Ok(Ok(_stream)) => (start.elapsed().as_secs_f64() * 1000.0).max(0.001),
            Ok(Err(_)) | Err(_) => FAILED_MEASUREMENT,
        }
    }
}
