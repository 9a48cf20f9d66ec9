//! Team-owner helpers: owner verification and candidate filtering.

use groupbot_core::error::Result;
use groupbot_core::traits::DirectoryApi;
use groupbot_core::types::Member;

/// Whether the given user is an owner of the team. Errors from the owner
/// listing propagate so callers abort rather than guess.
pub async fn verify_team_owner<D: DirectoryApi>(
    directory: &D,
    token: &str,
    group_id: &str,
    user_object_id: &str,
) -> Result<bool> {
    let owners = directory.list_owners(token, group_id).await?;
    Ok(owners.iter().any(|o| o.id == user_object_id))
}

/// Candidate roster for grouping: every team member except the owners.
pub async fn grouping_candidates<D: DirectoryApi>(
    directory: &D,
    token: &str,
    group_id: &str,
    team_members: &[Member],
) -> Result<Vec<Member>> {
    let owners = directory.list_owners(token, group_id).await?;
    let candidates: Vec<Member> = team_members
        .iter()
        .filter(|m| !owners.iter().any(|o| o.id == m.object_id))
        .cloned()
        .collect();
    tracing::info!(
        total = team_members.len(),
        candidates = candidates.len(),
        "filtered team owners out of grouping roster"
    );
    Ok(candidates)
}
