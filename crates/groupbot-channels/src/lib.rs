//! # GroupBot Channels
//!
//! The channel-provisioning pipeline: directory (Graph) API client, quota
//! validation, per-group channel creation with announcement side effects,
//! and persistence of the created-channel records the notification sweep
//! consumes later.

pub mod cards;
pub mod graph;
pub mod provision;
pub mod team;

pub use graph::GraphClient;
pub use provision::{
    AbortReason, ChannelProvisioner, ProvisionPhase, ProvisionRequest, ProvisionRun, QuotaCheck,
};
