//! Announcement message rendering for freshly created channels.

use groupbot_core::types::{ChannelMessage, GroupDetail, Member, Mention};

/// Build the announcement posted into a new channel: the activity details
/// plus an @-mention of every member grouped into it.
pub fn announcement(
    detail: &GroupDetail,
    creator_name: &str,
    group_members: &[Member],
) -> ChannelMessage {
    let mut text = format!(
        "**{}**\n\n{}\n\nCreated by: {}\nDue: {}\n\n",
        detail.title.trim(),
        detail.description.trim(),
        creator_name,
        detail.due_date.format("%d %b %Y"),
    );

    let mut mentions = Vec::with_capacity(group_members.len());
    let mut mention_texts = Vec::with_capacity(group_members.len());
    for member in group_members {
        mention_texts.push(format!("<at>{}</at>", member.display_name));
        mentions.push(Mention {
            id: member.id.clone(),
            name: member.display_name.clone(),
        });
    }
    text.push_str(&mention_texts.join(", "));

    ChannelMessage { text, mentions }
}
