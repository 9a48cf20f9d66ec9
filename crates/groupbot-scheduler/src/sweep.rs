//! The notification sweep: load every active activity, fan out a reminder
//! to each of its channels, and retry individual deliveries.
//!
//! The sweep is deliberately infallible as a whole. One channel failing
//! its delivery budget is logged and skipped; the next cron occurrence
//! tries again anyway.

use std::sync::Arc;

use chrono::Utc;

use groupbot_core::traits::{ActivityStore, Messenger};
use groupbot_core::types::{ActivityRecord, ChannelMessage, ConversationRef};
use groupbot_runtime::{RetryPolicy, Task};

/// Delivers due reminders across all active activities.
pub struct NotificationSweep<S, M> {
    store: Arc<S>,
    messenger: Arc<M>,
    retry: RetryPolicy,
    tenant_id: String,
}

impl<S, M> NotificationSweep<S, M>
where
    S: ActivityStore + 'static,
    M: Messenger + 'static,
{
    pub fn new(store: Arc<S>, messenger: Arc<M>, retry: RetryPolicy, tenant_id: String) -> Self {
        Self {
            store,
            messenger,
            retry,
            tenant_id,
        }
    }

    /// Run one full sweep. Delivery failures are contained per channel.
    pub async fn run_sweep(&self) {
        let now = Utc::now();
        let activities = match self.store.active_activities(now).await {
            Ok(activities) => activities,
            Err(err) => {
                tracing::error!("could not load active activities, skipping sweep: {err}");
                return;
            }
        };

        if activities.is_empty() {
            tracing::debug!("no active activities, sweep is a no-op");
            return;
        }

        let mut delivered = 0usize;
        let mut failed = 0usize;

        for activity in &activities {
            let channels = match self.store.notification_channels(&activity.activity_id).await {
                Ok(channels) => channels,
                Err(err) => {
                    tracing::error!(
                        activity_id = %activity.activity_id,
                        "could not load channel records: {err}"
                    );
                    continue;
                }
            };

            for channel in &channels {
                let conversation = ConversationRef {
                    channel_id: channel.channel_id.clone(),
                    service_url: activity.service_url.clone(),
                    tenant_id: self.tenant_id.clone(),
                };
                let message = reminder(activity, &channel.channel_name);

                let outcome = self
                    .retry
                    .run(|| self.messenger.continue_conversation(&conversation, &message))
                    .await;
                match outcome {
                    Ok(()) => delivered += 1,
                    Err(err) => {
                        failed += 1;
                        tracing::error!(
                            activity_id = %activity.activity_id,
                            channel = %channel.channel_name,
                            "reminder delivery failed after retries: {err}"
                        );
                    }
                }
            }
        }

        tracing::info!(
            activities = activities.len(),
            delivered,
            failed,
            "notification sweep finished"
        );
    }

    /// Package one sweep as a deferred work-queue job, for the scheduler's
    /// job factory.
    pub fn task(self: &Arc<Self>) -> Task {
        let sweep = Arc::clone(self);
        Box::pin(async move { sweep.run_sweep().await })
    }
}

/// Render the reminder posted into one group channel.
fn reminder(activity: &ActivityRecord, channel_name: &str) -> ChannelMessage {
    ChannelMessage {
        text: format!(
            "**Reminder: {}**\n\n{}\n\nGroup channel: {}\nDue: {}\nCreated by: {}",
            activity.title.trim(),
            activity.description.trim(),
            channel_name,
            activity.due_date.format("%d %b %Y"),
            activity.created_by,
        ),
        mentions: Vec::new(),
    }
}
