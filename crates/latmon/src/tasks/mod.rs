//! Run tracking and scheduling.
//!
//! A "run" is one full pass of probing every configured target, tracked as
//! a single [`Task`] in the [`TaskRegistry`]. The [`TaskScheduler`] admits
//! at most one run at a time and drives it on a background worker.

pub mod registry;
pub mod scheduler;

pub use registry::{Task, TaskRegistry};
pub use scheduler::{Admission, TaskScheduler};
