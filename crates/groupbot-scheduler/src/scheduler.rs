//! The scheduling loop: sleeps until the next cron occurrence, enqueues
//! one sweep job on the shared work queue, and re-arms.
//!
//! The loop never runs the sweep inline. Deferring through the queue keeps
//! sweeps serialized with provisioning runs on the single task runner.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;

use groupbot_runtime::{Task, WorkQueue};

use crate::cron::CronSchedule;

/// Produces one sweep job per cron occurrence.
pub struct NotificationScheduler {
    schedule: CronSchedule,
    queue: WorkQueue,
    /// Factory for the deferred job; called once per occurrence.
    job: Arc<dyn Fn() -> Task + Send + Sync>,
}

impl NotificationScheduler {
    pub fn new<F>(schedule: CronSchedule, queue: WorkQueue, job: F) -> Self
    where
        F: Fn() -> Task + Send + Sync + 'static,
    {
        Self {
            schedule,
            queue,
            job: Arc::new(job),
        }
    }

    /// Run until the shutdown signal fires. Each iteration computes the
    /// next occurrence from the wall clock, so a long sweep never shifts
    /// the cadence.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(cron = %self.schedule.expression(), "notification scheduler started");

        loop {
            let now = Utc::now();
            let Some(delay) = self.schedule.delay_from(now) else {
                tracing::warn!(
                    cron = %self.schedule.expression(),
                    "no next cron occurrence, scheduler stopping"
                );
                return;
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if self.queue.is_closed() {
                        tracing::warn!("work queue is gone, scheduler stopping");
                        return;
                    }
                    tracing::info!("cron fired, enqueueing notification sweep");
                    self.queue.enqueue((self.job)());
                }
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown, same as the
                    // task receiver's dequeue.
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("notification scheduler stopped");
                        return;
                    }
                }
            }
        }
    }
}
