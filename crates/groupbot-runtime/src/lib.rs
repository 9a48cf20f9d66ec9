//! # GroupBot Runtime
//!
//! The execution substrate shared by channel provisioning and the
//! notification sweep: an unbounded multi-producer work queue, a
//! single-consumer runner that executes one task at a time, and the
//! jittered retry policy for transient external calls.
//!
//! Running everything through one runner serializes the two workflows in
//! time, so the rate-limited directory API is never hit from both at once.

pub mod queue;
pub mod retry;
pub mod runner;

pub use queue::{Task, TaskReceiver, WorkQueue};
pub use retry::RetryPolicy;
pub use runner::{RunnerHandle, TaskRunner};
