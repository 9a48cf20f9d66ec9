//! Contracts for the external collaborators. The core never talks to the
//! directory, the record store, or the messaging transport except through
//! these traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    ActivityRecord, ChannelInfo, ChannelNotificationRecord, ChannelSpec, ChannelMessage,
    ConversationRef, CreatedChannel, TeamOwner,
};

/// Directory / collaboration API surface. All calls require a bearer token
/// supplied by the caller; the auth flow itself lives outside the core.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// List all channels of a team.
    async fn list_channels(&self, token: &str, group_id: &str) -> Result<Vec<ChannelInfo>>;

    /// Create a public ("standard") channel.
    async fn create_public_channel(
        &self,
        token: &str,
        group_id: &str,
        display_name: &str,
        description: &str,
    ) -> Result<CreatedChannel>;

    /// Create a private channel with an explicit member role list.
    async fn create_private_channel(
        &self,
        token: &str,
        group_id: &str,
        spec: &ChannelSpec,
    ) -> Result<CreatedChannel>;

    /// List the owners of a team.
    async fn list_owners(&self, token: &str, group_id: &str) -> Result<Vec<TeamOwner>>;
}

/// Durable record store for activities and channel-notification records.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Insert or replace a group activity. Returns whether the write landed.
    async fn upsert_activity(&self, record: &ActivityRecord) -> Result<bool>;

    /// All activities owned by a team.
    async fn activities_by_team(&self, team_id: &str) -> Result<Vec<ActivityRecord>>;

    /// Activities with the notification flag set and a due date on or after
    /// the day of `now`.
    async fn active_activities(&self, now: DateTime<Utc>) -> Result<Vec<ActivityRecord>>;

    /// Write one batch of channel-notification records. Callers chunk large
    /// outcomes at 100 records per call.
    async fn upsert_notification_channels(
        &self,
        records: &[ChannelNotificationRecord],
    ) -> Result<bool>;

    /// All channel records belonging to one activity.
    async fn notification_channels(
        &self,
        activity_id: &str,
    ) -> Result<Vec<ChannelNotificationRecord>>;
}

/// Messaging transport — posts cards into channels. Fire-and-forget beyond
/// success/failure signalling.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a message into a channel as a new conversation.
    async fn post_to_channel(&self, channel_id: &str, message: &ChannelMessage) -> Result<()>;

    /// Deliver a message by continuing an existing channel conversation.
    async fn continue_conversation(
        &self,
        conversation: &ConversationRef,
        message: &ChannelMessage,
    ) -> Result<()>;
}
