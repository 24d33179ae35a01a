use poise::serenity_prelude as serenity;
use poise::serenity_prelude::Permissions;
use tracing::debug;

/// Capability required to post the verification panel
pub const PANEL_PERMISSION: Permissions = Permissions::MANAGE_MESSAGES;

/// Whether the resolved permissions allow posting the panel.
///
/// Unknown permissions (no member, cache miss) are treated as denied.
pub fn can_post_panel(permissions: Option<Permissions>) -> bool {
    permissions.is_some_and(|p| p.administrator() || p.contains(PANEL_PERMISSION))
}

/// Resolve the author's permissions in the channel a message was sent in
pub async fn message_author_permissions(
    ctx: &serenity::Context,
    msg: &serenity::Message,
) -> Option<Permissions> {
    let guild_id = msg.guild_id?;

    let member = match guild_id.member(ctx, msg.author.id).await {
        Ok(member) => member,
        Err(e) => {
            debug!("Could not fetch member {} in {}: {}", msg.author.id, guild_id, e);
            return None;
        }
    };

    let guild_channel = match msg.channel(ctx).await {
        Ok(channel) => channel.guild()?,
        Err(e) => {
            debug!("Could not fetch channel {}: {}", msg.channel_id, e);
            return None;
        }
    };

    let guild = guild_id.to_guild_cached(&ctx.cache)?;
    Some(guild.user_permissions_in(&guild_channel, &member))
}
