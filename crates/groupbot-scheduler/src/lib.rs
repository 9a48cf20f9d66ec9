//! # GroupBot Scheduler
//!
//! Cron-driven reminder delivery: a lightweight 5-field cron parser, the
//! loop that turns due cron times into deferred work-queue jobs, and the
//! sweep that posts reminders into every channel of every active activity.

pub mod cron;
pub mod scheduler;
pub mod sweep;

pub use cron::{CronSchedule, DEFAULT_NOTIFICATION_CRON};
pub use scheduler::NotificationScheduler;
pub use sweep::NotificationSweep;
