//! # GroupBot Grouping
//!
//! Pure partitioning of a member roster into balanced groups. Randomness is
//! injected so callers (and tests) control the shuffle source; everything
//! downstream of the shuffle is deterministic.

pub mod split;
pub mod summary;

pub use split::{split_by_group_count, split_by_group_size};
pub use summary::render_summary;
