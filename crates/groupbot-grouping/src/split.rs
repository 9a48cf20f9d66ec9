//! Splitting strategies: fixed group size and fixed group count.
//!
//! Both shuffle the candidate list once, up front, then walk it
//! sequentially. The creator is excluded from the candidate set and
//! appended to every group as it seals.

use rand::Rng;
use rand::seq::SliceRandom;

use groupbot_core::error::{GroupBotError, Result};
use groupbot_core::types::{GroupAssignment, Member, validate_unit_count};

/// Partition candidates into groups of `unit_size` members each; the final
/// group absorbs any remainder even if smaller. Produces ceil(N / unit_size)
/// groups, creator appended to every one.
pub fn split_by_group_size<R: Rng>(
    members: &[Member],
    creator: &Member,
    unit_size: usize,
    rng: &mut R,
) -> Result<GroupAssignment> {
    validate_unit_count(unit_size)?;
    if members.is_empty() {
        return Err(GroupBotError::InvalidSplit(
            "no candidate members to group".into(),
        ));
    }

    let mut shuffled = members.to_vec();
    shuffled.shuffle(rng);

    let mut assignment = GroupAssignment::new();
    let mut bucket: Vec<Member> = Vec::with_capacity(unit_size + 1);

    for member in shuffled {
        if bucket.len() == unit_size {
            bucket.push(creator.clone());
            assignment.push_group(std::mem::take(&mut bucket));
        }
        bucket.push(member);
    }

    // Remainder seals as a final short group.
    if !bucket.is_empty() {
        bucket.push(creator.clone());
        assignment.push_group(bucket);
    }

    tracing::debug!(
        groups = assignment.len(),
        unit_size,
        "split roster by group size"
    );
    Ok(assignment)
}

/// Partition candidates into exactly `group_count` groups of
/// `members_per_group` each (precomputed by the caller as floor(N / G)).
/// The `N mod G` leftover members are distributed round-robin across the
/// sealed groups, one extra member per group, in remainder order.
///
/// Refuses up front when `N <= group_count`: that shape would degenerate
/// into single-member groups.
pub fn split_by_group_count<R: Rng>(
    members: &[Member],
    creator: &Member,
    group_count: usize,
    members_per_group: usize,
    rng: &mut R,
) -> Result<GroupAssignment> {
    validate_unit_count(group_count)?;
    if members.len() <= group_count {
        return Err(GroupBotError::InvalidSplit(format!(
            "{} members cannot fill {} groups",
            members.len(),
            group_count
        )));
    }
    if members_per_group == 0 || members_per_group != members.len() / group_count {
        return Err(GroupBotError::InvalidSplit(format!(
            "members-per-group {} does not match {} members over {} groups",
            members_per_group,
            members.len(),
            group_count
        )));
    }

    let mut shuffled = members.to_vec();
    shuffled.shuffle(rng);

    let mut assignment = GroupAssignment::new();
    let mut bucket: Vec<Member> = Vec::with_capacity(members_per_group + 2);
    let mut remainder: Vec<Member> = Vec::new();

    for member in shuffled {
        if assignment.len() == group_count {
            remainder.push(member);
            continue;
        }
        bucket.push(member);
        if bucket.len() == members_per_group {
            bucket.push(creator.clone());
            assignment.push_group(std::mem::take(&mut bucket));
        }
    }

    // remainder = N mod G, always strictly less than the group count; if
    // that does not hold the shape math above is broken.
    if remainder.len() >= group_count {
        return Err(GroupBotError::InvalidSplit(format!(
            "remainder {} overflows {} groups",
            remainder.len(),
            group_count
        )));
    }

    for (index, member) in remainder.into_iter().enumerate() {
        assignment.append_to_group(index, member)?;
    }

    tracing::debug!(
        groups = assignment.len(),
        members_per_group,
        "split roster by group count"
    );
    Ok(assignment)
}
