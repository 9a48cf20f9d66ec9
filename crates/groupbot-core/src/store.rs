//! In-memory `ActivityStore` backend. Used for local runs and as the test
//! double across the workspace; the durable implementation lives with the
//! hosting service.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::traits::ActivityStore;
use crate::types::{ActivityRecord, ChannelNotificationRecord};

#[derive(Default)]
struct Inner {
    activities: HashMap<String, ActivityRecord>,
    /// activity id -> channel records, keyed per channel id.
    channels: HashMap<String, Vec<ChannelNotificationRecord>>,
}

/// Mutex-guarded in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total channel records held, across all activities.
    pub async fn channel_record_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.channels.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn upsert_activity(&self, record: &ActivityRecord) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        inner
            .activities
            .insert(record.activity_id.clone(), record.clone());
        Ok(true)
    }

    async fn activities_by_team(&self, team_id: &str) -> Result<Vec<ActivityRecord>> {
        let inner = self.inner.lock().await;
        let mut records: Vec<ActivityRecord> = inner
            .activities
            .values()
            .filter(|a| a.team_id == team_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.activity_id.cmp(&b.activity_id));
        Ok(records)
    }

    async fn active_activities(&self, now: DateTime<Utc>) -> Result<Vec<ActivityRecord>> {
        let today = now.date_naive();
        let inner = self.inner.lock().await;
        let mut records: Vec<ActivityRecord> = inner
            .activities
            .values()
            .filter(|a| a.notification_active && a.due_date.date_naive() >= today)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.activity_id.cmp(&b.activity_id));
        Ok(records)
    }

    async fn upsert_notification_channels(
        &self,
        records: &[ChannelNotificationRecord],
    ) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        for record in records {
            let entry = inner
                .channels
                .entry(record.activity_id.clone())
                .or_default();
            match entry.iter_mut().find(|c| c.channel_id == record.channel_id) {
                Some(existing) => *existing = record.clone(),
                None => entry.push(record.clone()),
            }
        }
        Ok(true)
    }

    async fn notification_channels(
        &self,
        activity_id: &str,
    ) -> Result<Vec<ChannelNotificationRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.channels.get(activity_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn activity(id: &str, active: bool, due_in_days: i64) -> ActivityRecord {
        ActivityRecord {
            activity_id: id.into(),
            team_id: "team-1".into(),
            title: "Reading group".into(),
            description: "Chapter 4".into(),
            due_date: Utc::now() + Duration::days(due_in_days),
            created_by: "Alice".into(),
            created_on: Utc::now(),
            notification_active: active,
            conversation_id: "conv-1".into(),
            service_url: "https://example.test".into(),
        }
    }

    fn channel(activity_id: &str, channel_id: &str) -> ChannelNotificationRecord {
        ChannelNotificationRecord {
            activity_id: activity_id.into(),
            channel_id: channel_id.into(),
            channel_name: format!("Reading group-{channel_id}"),
            team_id: "team-1".into(),
        }
    }

    #[tokio::test]
    async fn active_filter_requires_flag_and_unexpired_due_date() {
        let store = MemoryStore::new();
        store.upsert_activity(&activity("a1", true, 3)).await.unwrap();
        store.upsert_activity(&activity("a2", false, 3)).await.unwrap();
        store.upsert_activity(&activity("a3", true, -2)).await.unwrap();
        // Due earlier today still counts: the filter is day-granular.
        store.upsert_activity(&activity("a4", true, 0)).await.unwrap();

        let active = store.active_activities(Utc::now()).await.unwrap();
        let ids: Vec<&str> = active.iter().map(|a| a.activity_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a4"]);
    }

    #[tokio::test]
    async fn channel_upsert_replaces_by_channel_id() {
        let store = MemoryStore::new();
        store
            .upsert_notification_channels(&[channel("a1", "c1"), channel("a1", "c2")])
            .await
            .unwrap();
        let mut updated = channel("a1", "c1");
        updated.channel_name = "Renamed".into();
        store
            .upsert_notification_channels(&[updated])
            .await
            .unwrap();

        let channels = store.notification_channels("a1").await.unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].channel_name, "Renamed");
    }

    #[tokio::test]
    async fn unknown_activity_has_no_channels() {
        let store = MemoryStore::new();
        assert!(store.notification_channels("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn activities_by_team_filters_on_team() {
        let store = MemoryStore::new();
        store.upsert_activity(&activity("a1", true, 1)).await.unwrap();
        let mut other = activity("b1", true, 1);
        other.team_id = "team-2".into();
        store.upsert_activity(&other).await.unwrap();

        let records = store.activities_by_team("team-1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].activity_id, "a1");
    }
}
