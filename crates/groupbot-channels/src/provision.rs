//! Channel provisioning pipeline: quota validation, per-group creation
//! with announcement side effects, and persistence of the created-channel
//! records.
//!
//! Pipeline per invocation:
//! `Validating -> {Aborted, Creating} -> Persisting -> Done`.
//! The pipeline itself is never retried; only the announcement posts are,
//! under the injected retry policy. A single group's failure never aborts
//! the batch.

use std::sync::Arc;

use chrono::Utc;

use groupbot_core::error::Result;
use groupbot_core::traits::{ActivityStore, DirectoryApi, Messenger};
use groupbot_core::types::{
    ActivityRecord, ChannelMemberSpec, ChannelNotificationRecord, ChannelSpec, ChannelType,
    GroupAssignment, GroupDetail, Member, MemberRole, ProvisioningOutcome,
};
use groupbot_runtime::{RetryPolicy, WorkQueue};

use crate::cards;

/// Records per underlying store batch write.
const RECORDS_PER_BATCH: usize = 100;

/// Result of the quota validation. `Indeterminate` means the channel
/// listing itself failed; callers must treat it as "abort, do not create".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaCheck {
    Allowed,
    Exceeded,
    Indeterminate,
}

/// Phase the pipeline is in; logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionPhase {
    Validating,
    Creating,
    Persisting,
    Done,
}

/// Why a run aborted before any side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    QuotaExceeded,
    QuotaIndeterminate,
}

/// Terminal state of one provisioning run.
#[derive(Debug)]
pub enum ProvisionRun {
    /// Validation refused or could not decide; nothing was created.
    Aborted { reason: AbortReason },
    /// Creation ran to completion, possibly with per-group failures.
    Completed {
        activity_id: String,
        outcome: ProvisioningOutcome,
        /// False when the record batch write failed after channels were
        /// already created — a reconciliation-required condition.
        persisted: bool,
    },
}

/// Everything one deferred provisioning run needs to own.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub token: String,
    /// Directory object id of the team.
    pub group_id: String,
    pub team_id: String,
    /// Reference to the announcement message in the invoking channel.
    pub conversation_id: String,
    pub service_url: String,
    pub detail: GroupDetail,
    pub assignment: GroupAssignment,
    pub creator: Member,
}

/// Validates quota, creates one channel per group, and persists the
/// notification records for the sweep.
pub struct ChannelProvisioner<D, S, M> {
    directory: Arc<D>,
    store: Arc<S>,
    messenger: Arc<M>,
    retry: RetryPolicy,
}

impl<D, S, M> ChannelProvisioner<D, S, M>
where
    D: DirectoryApi + 'static,
    S: ActivityStore + 'static,
    M: Messenger + 'static,
{
    pub fn new(directory: Arc<D>, store: Arc<S>, messenger: Arc<M>, retry: RetryPolicy) -> Self {
        Self {
            directory,
            store,
            messenger,
            retry,
        }
    }

    /// Check whether `requested` more channels of the given type fit under
    /// the directory quota (public 200, private 30).
    pub async fn validate_channel_count(
        &self,
        token: &str,
        group_id: &str,
        channel_type: ChannelType,
        requested: usize,
    ) -> QuotaCheck {
        let channels = match self.directory.list_channels(token, group_id).await {
            Ok(channels) => channels,
            Err(err) => {
                tracing::error!(group_id, "channel listing failed, quota unknown: {err}");
                return QuotaCheck::Indeterminate;
            }
        };

        let existing = channels
            .iter()
            .filter(|c| c.membership_type == channel_type.membership_type())
            .count();

        if channel_type.quota().saturating_sub(existing) > requested {
            QuotaCheck::Allowed
        } else {
            tracing::info!(
                group_id,
                existing,
                requested,
                quota = channel_type.quota(),
                "channel quota would be exceeded"
            );
            QuotaCheck::Exceeded
        }
    }

    /// Persist the activity record once, as provisioning starts.
    /// Notifications stay inactive for private channels and when the
    /// requester declined reminders.
    pub async fn store_activity(&self, request: &ProvisionRequest, activity_id: &str) -> bool {
        let record = ActivityRecord {
            activity_id: activity_id.to_string(),
            team_id: request.team_id.clone(),
            title: request.detail.title.clone(),
            description: request.detail.description.clone(),
            due_date: request.detail.due_date,
            created_by: request.creator.display_name.clone(),
            created_on: Utc::now(),
            notification_active: match request.detail.channel_type {
                ChannelType::Private => false,
                ChannelType::Public => request.detail.auto_reminders,
            },
            conversation_id: request.conversation_id.clone(),
            service_url: request.service_url.clone(),
        };

        match self.store.upsert_activity(&record).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::error!(
                    team_id = %request.team_id,
                    "activity record write was rejected"
                );
                false
            }
            Err(err) => {
                tracing::error!(team_id = %request.team_id, "activity record write failed: {err}");
                false
            }
        }
    }

    /// Build the spec for one group's channel. The 1-based counter keeps
    /// channel names aligned with the grouping summary.
    fn build_channel_spec(
        detail: &GroupDetail,
        counter: usize,
        group: &[Member],
        creator: &Member,
    ) -> ChannelSpec {
        let members = match detail.channel_type {
            ChannelType::Public => Vec::new(),
            ChannelType::Private => group
                .iter()
                .map(|m| ChannelMemberSpec {
                    object_id: m.object_id.clone(),
                    role: if m.object_id == creator.object_id {
                        MemberRole::Owner
                    } else {
                        MemberRole::Member
                    },
                })
                .collect(),
        };

        ChannelSpec {
            display_name: format!("{}-{}", detail.title.trim(), counter),
            description: detail.description.clone(),
            channel_type: detail.channel_type,
            members,
        }
    }

    /// Create one channel per group, strictly in index order. Creation
    /// calls are not retried: a failure records the display name and moves
    /// on. Each success immediately posts the announcement under the retry
    /// policy; an exhausted announcement never undoes the creation.
    pub async fn create_channels(
        &self,
        token: &str,
        group_id: &str,
        assignment: &GroupAssignment,
        detail: &GroupDetail,
        creator: &Member,
    ) -> ProvisioningOutcome {
        let mut outcome = ProvisioningOutcome::default();

        for (index, group) in assignment.groups() {
            let spec = Self::build_channel_spec(detail, index + 1, group, creator);
            let created = match detail.channel_type {
                ChannelType::Public => {
                    self.directory
                        .create_public_channel(token, group_id, &spec.display_name, &spec.description)
                        .await
                }
                ChannelType::Private => {
                    self.directory
                        .create_private_channel(token, group_id, &spec)
                        .await
                }
            };

            match created {
                Ok(channel) => {
                    let message = cards::announcement(detail, &creator.display_name, group);
                    let post = self
                        .retry
                        .run(|| self.messenger.post_to_channel(&channel.id, &message))
                        .await;
                    if let Err(err) = post {
                        tracing::error!(
                            channel = %channel.display_name,
                            "announcement failed after retries: {err}"
                        );
                    }
                    outcome.created.push(channel);
                }
                Err(err) => {
                    tracing::warn!(
                        channel = %spec.display_name,
                        "channel creation failed: {err}"
                    );
                    outcome.failed.push(spec.display_name);
                }
            }
        }

        tracing::info!(
            created = outcome.created.len(),
            failed = outcome.failed.len(),
            "channel creation pass finished"
        );
        outcome
    }

    /// Map every created channel into a notification record and write them
    /// in batches of at most 100. A failed write is surfaced (false) but
    /// never undoes the channels; operators reconcile manually.
    pub async fn persist_outcome(
        &self,
        outcome: &ProvisioningOutcome,
        activity_id: &str,
        team_id: &str,
    ) -> bool {
        if outcome.created.is_empty() {
            return true;
        }

        let records: Vec<ChannelNotificationRecord> = outcome
            .created
            .iter()
            .map(|channel| ChannelNotificationRecord {
                activity_id: activity_id.to_string(),
                channel_id: channel.id.clone(),
                channel_name: channel.display_name.clone(),
                team_id: team_id.to_string(),
            })
            .collect();

        for chunk in records.chunks(RECORDS_PER_BATCH) {
            match self.store.upsert_notification_channels(chunk).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::error!(
                        activity_id,
                        "notification record batch was rejected; manual reconciliation required"
                    );
                    return false;
                }
                Err(err) => {
                    tracing::error!(
                        activity_id,
                        "notification record batch failed, manual reconciliation required: {err}"
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Run the whole pipeline for one request.
    pub async fn provision(&self, request: &ProvisionRequest) -> ProvisionRun {
        let mut phase = ProvisionPhase::Validating;
        tracing::debug!(?phase, team_id = %request.team_id, "provisioning started");

        let quota = self
            .validate_channel_count(
                &request.token,
                &request.group_id,
                request.detail.channel_type,
                request.assignment.len(),
            )
            .await;
        match quota {
            QuotaCheck::Allowed => {}
            QuotaCheck::Exceeded => {
                return ProvisionRun::Aborted {
                    reason: AbortReason::QuotaExceeded,
                };
            }
            QuotaCheck::Indeterminate => {
                return ProvisionRun::Aborted {
                    reason: AbortReason::QuotaIndeterminate,
                };
            }
        }

        phase = ProvisionPhase::Creating;
        tracing::debug!(?phase, team_id = %request.team_id, "quota validated");

        let activity_id = uuid::Uuid::new_v4().to_string();
        self.store_activity(request, &activity_id).await;

        let outcome = self
            .create_channels(
                &request.token,
                &request.group_id,
                &request.assignment,
                &request.detail,
                &request.creator,
            )
            .await;

        phase = ProvisionPhase::Persisting;
        tracing::debug!(?phase, activity_id, "persisting created channels");
        let persisted = self
            .persist_outcome(&outcome, &activity_id, &request.team_id)
            .await;

        phase = ProvisionPhase::Done;
        tracing::debug!(?phase, activity_id, persisted, "provisioning finished");
        ProvisionRun::Completed {
            activity_id,
            outcome,
            persisted,
        }
    }

    /// Defer the whole pipeline onto the work queue, serialized with every
    /// other provisioning run and notification sweep.
    pub fn enqueue(self: &Arc<Self>, queue: &WorkQueue, request: ProvisionRequest) {
        let provisioner = Arc::clone(self);
        queue.enqueue(async move {
            match provisioner.provision(&request).await {
                ProvisionRun::Aborted { reason } => {
                    tracing::warn!(?reason, team_id = %request.team_id, "provisioning aborted");
                }
                ProvisionRun::Completed { outcome, .. } => {
                    if !outcome.is_full_success() {
                        tracing::warn!(
                            failed = outcome.failed.len(),
                            team_id = %request.team_id,
                            "some channels were not created"
                        );
                    }
                }
            }
        });
    }
}
