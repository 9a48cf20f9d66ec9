//! Long-lived single-consumer loop over the work queue.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::queue::TaskReceiver;

/// Dequeues one task at a time and awaits it to completion before touching
/// the queue again. Provisioning runs and notification sweeps are therefore
/// mutually exclusive in time.
pub struct TaskRunner {
    rx: TaskReceiver,
    shutdown: watch::Receiver<bool>,
}

impl TaskRunner {
    pub fn new(rx: TaskReceiver, shutdown: watch::Receiver<bool>) -> Self {
        Self { rx, shutdown }
    }

    /// Run until shutdown fires or all producers are gone. An in-flight
    /// task always runs to completion; the shutdown signal is only observed
    /// at the dequeue point.
    pub async fn run(mut self) {
        tracing::info!("task runner started");
        loop {
            match self.rx.dequeue(&mut self.shutdown).await {
                Some(task) => {
                    task.await;
                }
                None => {
                    tracing::info!("task runner stopping");
                    return;
                }
            }
        }
    }

    /// Spawn the runner onto the tokio runtime, returning a handle that can
    /// signal shutdown and wait for the drain.
    pub fn spawn(rx: TaskReceiver) -> RunnerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let join = tokio::spawn(TaskRunner::new(rx, stop_rx).run());
        RunnerHandle { stop_tx, join }
    }
}

/// Handle for stopping a spawned runner.
pub struct RunnerHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RunnerHandle {
    /// Signal shutdown without waiting.
    pub fn shutdown(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Signal shutdown, let the in-flight task finish bounded by `drain`,
    /// then abort whatever is left.
    pub async fn shutdown_and_wait(mut self, drain: Duration) {
        let _ = self.stop_tx.send(true);
        if tokio::time::timeout(drain, &mut self.join).await.is_err() {
            tracing::warn!("task runner did not drain in {:?}, aborting", drain);
            self.join.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::WorkQueue;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn runner_executes_tasks_in_order_one_at_a_time() {
        let (queue, rx) = WorkQueue::new();
        let log = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        for i in 0..3u32 {
            let log = log.clone();
            queue.enqueue(async move {
                log.lock().await.push(format!("start-{i}"));
                // Yield so an overlapping runner would interleave.
                tokio::task::yield_now().await;
                log.lock().await.push(format!("end-{i}"));
            });
        }

        let handle = TaskRunner::spawn(rx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown_and_wait(Duration::from_secs(1)).await;

        let log = log.lock().await;
        assert_eq!(
            *log,
            vec!["start-0", "end-0", "start-1", "end-1", "start-2", "end-2"]
        );
    }

    #[tokio::test]
    async fn shutdown_stops_idle_runner() {
        let (_queue, rx) = WorkQueue::new();
        let handle = TaskRunner::spawn(rx);
        handle.shutdown_and_wait(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn in_flight_task_finishes_before_exit() {
        let (queue, rx) = WorkQueue::new();
        let done = Arc::new(AtomicUsize::new(0));
        let d = done.clone();
        queue.enqueue(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            d.fetch_add(1, Ordering::SeqCst);
        });

        let handle = TaskRunner::spawn(rx);
        // Give the runner a beat to pick the task up, then stop.
        tokio::time::sleep(Duration::from_millis(5)).await;
        handle.shutdown_and_wait(Duration::from_secs(1)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn runner_exits_when_producers_drop() {
        let (queue, rx) = WorkQueue::new();
        let handle = TaskRunner::spawn(rx);
        drop(queue);
        // recv() returns None once every sender is gone.
        tokio::time::timeout(Duration::from_secs(1), async {
            handle.shutdown_and_wait(Duration::from_secs(1)).await;
        })
        .await
        .unwrap();
    }
}
