//! # GroupBot Core
//!
//! Shared foundation for the GroupBot workspace: the error type, the
//! configuration system, the domain model (members, group assignments,
//! activity and notification records), and the narrow contracts for the
//! three external collaborators — the directory API, the record store,
//! and the messaging transport.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod traits;
pub mod types;

pub use config::BotConfig;
pub use error::{GroupBotError, Result};
pub use store::MemoryStore;
pub use traits::{ActivityStore, DirectoryApi, Messenger};
