//! Latency measurement and concurrent fan-out.
//!
//! [`Pinger`] is the measurement seam: implementations turn every failure
//! into the `-1.0` sentinel instead of an error, so a bad target can never
//! abort a batch. [`Prober`] launches one measurement per target and
//! reports each completion as it happens.

pub mod pinger;
pub mod prober;

pub use pinger::{FAILED_MEASUREMENT, Pinger, TcpPinger};
pub use prober::{ProbeOutcome, Prober};
