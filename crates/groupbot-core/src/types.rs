//! Domain model — members, group assignments, channel specs, and the
//! persisted record shapes shared with the store collaborator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GroupBotError, Result};

/// Maximum number of public channels a team may hold.
pub const PUBLIC_CHANNEL_CAP: usize = 200;

/// Maximum number of private channels a team may hold.
pub const PRIVATE_CHANNEL_CAP: usize = 30;

/// Smallest accepted splitting unit (group size or group count).
pub const MIN_UNIT_COUNT: usize = 2;

/// Largest accepted splitting unit (group size or group count).
pub const MAX_UNIT_COUNT: usize = 30;

/// A roster participant: an opaque identity with a display name and a
/// directory object id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Conversation-level account id.
    pub id: String,
    /// Human-readable name shown in cards and summaries.
    pub display_name: String,
    /// Directory (AAD) object id used for channel membership.
    pub object_id: String,
}

/// Channel visibility / audience model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Public,
    Private,
}

impl ChannelType {
    /// Membership type string used by the directory API.
    pub fn membership_type(&self) -> &'static str {
        match self {
            ChannelType::Public => "standard",
            ChannelType::Private => "private",
        }
    }

    /// Directory-imposed maximum channel count for this type.
    pub fn quota(&self) -> usize {
        match self {
            ChannelType::Public => PUBLIC_CHANNEL_CAP,
            ChannelType::Private => PRIVATE_CHANNEL_CAP,
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelType::Public => write!(f, "public"),
            ChannelType::Private => write!(f, "private"),
        }
    }
}

/// Group activity details entered by the creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDetail {
    pub title: String,
    pub description: String,
    pub channel_type: ChannelType,
    pub due_date: DateTime<Utc>,
    /// Whether the requester asked for recurring reminders.
    pub auto_reminders: bool,
}

impl GroupDetail {
    /// Validate the fields entered for a new group activity.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(GroupBotError::InvalidSplit("group title is empty".into()));
        }
        if self.description.trim().is_empty() {
            return Err(GroupBotError::InvalidSplit(
                "group description is empty".into(),
            ));
        }
        if !has_no_special_characters(&self.title) {
            return Err(GroupBotError::InvalidSplit(format!(
                "group title '{}' contains special characters",
                self.title
            )));
        }
        if self.due_date < now {
            return Err(GroupBotError::InvalidSplit(
                "due date is in the past".into(),
            ));
        }
        Ok(())
    }
}

/// Titles allow alphanumerics, spaces and dashes only.
pub fn has_no_special_characters(input: &str) -> bool {
    input
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
}

/// Validate the numeric splitting parameter (group size or group count).
pub fn validate_unit_count(unit: usize) -> Result<()> {
    if !(MIN_UNIT_COUNT..=MAX_UNIT_COUNT).contains(&unit) {
        return Err(GroupBotError::InvalidSplit(format!(
            "unit count {unit} is out of range [{MIN_UNIT_COUNT}, {MAX_UNIT_COUNT}]"
        )));
    }
    Ok(())
}

/// Output of the grouping engine: an ordered mapping from a zero-based
/// group index to the members assigned to that group, each list terminated
/// by the activity creator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAssignment {
    groups: BTreeMap<usize, Vec<Member>>,
}

impl GroupAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal the next group. Indices are contiguous starting at 0.
    pub fn push_group(&mut self, members: Vec<Member>) {
        let index = self.groups.len();
        self.groups.insert(index, members);
    }

    /// Append one more member to an already-sealed group.
    pub fn append_to_group(&mut self, index: usize, member: Member) -> Result<()> {
        match self.groups.get_mut(&index) {
            Some(group) => {
                group.push(member);
                Ok(())
            }
            None => Err(GroupBotError::InvalidSplit(format!(
                "no sealed group at index {index} to receive a remainder member"
            ))),
        }
    }

    pub fn groups(&self) -> &BTreeMap<usize, Vec<Member>> {
        &self.groups
    }

    /// Number of groups produced.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total members across groups, excluding per-group creator entries.
    pub fn member_total(&self, creator: &Member) -> usize {
        self.groups
            .values()
            .map(|g| g.iter().filter(|m| m.object_id != creator.object_id).count())
            .sum()
    }
}

/// Role of a member inside a private channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Member => "member",
        }
    }
}

/// One member entry of a private channel spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMemberSpec {
    pub object_id: String,
    pub role: MemberRole,
}

/// Everything needed to create one channel for one group.
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    /// Base title plus 1-based group counter, e.g. `Sprint Review-3`.
    pub display_name: String,
    pub description: String,
    pub channel_type: ChannelType,
    /// Role list for private channels; empty for public.
    pub members: Vec<ChannelMemberSpec>,
}

/// A channel listing entry returned by the directory API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub display_name: String,
    pub membership_type: String,
}

/// A successfully created channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedChannel {
    pub id: String,
    pub display_name: String,
}

/// Aggregated result of one provisioning invocation. Every submitted
/// channel spec appears in exactly one of the two lists.
#[derive(Debug, Clone, Default)]
pub struct ProvisioningOutcome {
    pub created: Vec<CreatedChannel>,
    /// Display names of channels that failed creation.
    pub failed: Vec<String>,
}

impl ProvisioningOutcome {
    pub fn is_full_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Persisted group activity, created once when provisioning starts and
/// read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub activity_id: String,
    pub team_id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub created_by: String,
    pub created_on: DateTime<Utc>,
    /// False for private channels or when the requester declined reminders.
    pub notification_active: bool,
    /// Reference to the announcement message.
    pub conversation_id: String,
    pub service_url: String,
}

/// One record per successfully created channel, consumed by the
/// notification sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelNotificationRecord {
    pub activity_id: String,
    pub channel_id: String,
    pub channel_name: String,
    pub team_id: String,
}

/// A user to @-mention in a channel message.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub id: String,
    pub name: String,
}

/// Payload handed to the messaging transport.
#[derive(Debug, Clone, Default)]
pub struct ChannelMessage {
    pub text: String,
    pub mentions: Vec<Mention>,
}

/// Addressing information for continuing a conversation in a channel.
#[derive(Debug, Clone)]
pub struct ConversationRef {
    pub channel_id: String,
    pub service_url: String,
    pub tenant_id: String,
}

/// An owner entry returned by the directory API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamOwner {
    pub id: String,
    pub display_name: String,
}
