//! Core engine for the latmon latency-probing service.
//!
//! The engine probes a configured set of IP addresses for network latency,
//! tracks per-run progress in an in-memory task registry, persists
//! successful samples, and derives per-address aggregate statistics from
//! the sample history. The HTTP layer in `apps/server` is a thin mapping
//! onto this crate.

pub mod config;
pub mod pool;
pub mod probe;
pub mod records;
pub mod stats;
pub mod storage;
pub mod tasks;

pub use probe::{Pinger, Prober, TcpPinger};
pub use records::{AggregateRecord, aggregate};
pub use storage::{LibsqlStorage, Storage};
pub use tasks::{Admission, Task, TaskRegistry, TaskScheduler};
