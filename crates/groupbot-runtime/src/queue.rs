//! Unbounded multi-producer, single-consumer queue of deferred tasks.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, watch};

/// An opaque deferred unit of asynchronous work with no return value.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Producer handle. Cloneable; any component may enqueue work.
#[derive(Clone)]
pub struct WorkQueue {
    tx: mpsc::UnboundedSender<Task>,
}

impl WorkQueue {
    /// Create a queue, returning the producer handle and the single
    /// consumer end.
    pub fn new() -> (Self, TaskReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, TaskReceiver { rx })
    }

    /// Enqueue a task. Non-blocking; a task enqueued after the consumer is
    /// gone is dropped with a warning.
    pub fn enqueue<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.tx.send(Box::pin(task)).is_err() {
            tracing::warn!("work queue consumer is gone, dropping task");
        }
    }

    /// Whether the consumer end has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer end. Owned exclusively by the task runner.
pub struct TaskReceiver {
    rx: mpsc::UnboundedReceiver<Task>,
}

impl TaskReceiver {
    /// Suspend until a task is available or the shutdown signal fires.
    /// Returns `None` on shutdown or when all producers are gone.
    pub async fn dequeue(&mut self, shutdown: &mut watch::Receiver<bool>) -> Option<Task> {
        tokio::select! {
            task = self.rx.recv() => task,
            _ = shutdown.changed() => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn dequeue_returns_enqueued_task() {
        let (queue, mut rx) = WorkQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        queue.enqueue(async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let (_stop_tx, mut stop_rx) = watch::channel(false);
        let task = rx.dequeue(&mut stop_rx).await.unwrap();
        task.await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dequeue_preserves_fifo_order() {
        let (queue, mut rx) = WorkQueue::new();
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            queue.enqueue(async move {
                order.lock().await.push(i);
            });
        }

        let (_stop_tx, mut stop_rx) = watch::channel(false);
        for _ in 0..3 {
            rx.dequeue(&mut stop_rx).await.unwrap().await;
        }
        assert_eq!(*order.lock().await, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn shutdown_cancels_waiting_dequeue() {
        let (_queue, mut rx) = WorkQueue::new();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let waiter = tokio::spawn(async move { rx.dequeue(&mut stop_rx).await.is_none() });
        stop_tx.send(true).unwrap();
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn enqueue_after_consumer_drop_does_not_panic() {
        let (queue, rx) = WorkQueue::new();
        drop(rx);
        queue.enqueue(async {});
        assert!(queue.is_closed());
    }
}
