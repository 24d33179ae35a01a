use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::panel::{send_panel, PanelOutcome};
use crate::permissions::{can_post_panel, message_author_permissions};
use crate::{Data, Error};

/// Legacy text trigger, matched case-insensitively at the start of a message
pub const LEGACY_TRIGGER: &str = "!verify";

/// Whether a message should be treated as a legacy `!verify` invocation
pub fn is_legacy_trigger(content: &str, author_is_bot: bool) -> bool {
    !author_is_bot && content.to_lowercase().starts_with(LEGACY_TRIGGER)
}

/// Handle incoming messages
pub async fn handle_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    if !is_legacy_trigger(&msg.content, msg.author.bot) {
        return Ok(());
    }

    info!(
        "Legacy !verify from {} ({}) in channel {}",
        msg.author.name, msg.author.id, msg.channel_id
    );

    let outcome = post_panel_for_message(ctx, msg, data).await;
    msg.reply(&ctx.http, outcome.prefix_reply()).await?;

    Ok(())
}

async fn post_panel_for_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> PanelOutcome {
    let permissions = message_author_permissions(ctx, msg).await;
    if !can_post_panel(permissions) {
        info!("{} lacks Manage Messages, not posting panel", msg.author.name);
        return PanelOutcome::Denied;
    }

    match msg.channel(ctx).await {
        Ok(channel) => send_panel(ctx, &channel, &data.config).await,
        Err(e) => {
            error!("Failed to fetch channel {}: {}", msg.channel_id, e);
            PanelOutcome::TransportError(e.to_string())
        }
    }
}
