use tracing::{error, info, warn};

use crate::panel::{send_panel, PanelOutcome};
use crate::permissions::can_post_panel;
use crate::{Context, Error};

/// Post the collab.land-style verification panel
///
/// Requires the Manage Messages permission. The panel is posted in the
/// channel the command was used in.
#[poise::command(slash_command, guild_only)]
pub async fn verify(ctx: Context<'_>) -> Result<(), Error> {
    let permissions = ctx.author_member().await.and_then(|member| member.permissions);

    if !can_post_panel(permissions) {
        info!(
            "{} ({}) lacks Manage Messages, not posting panel",
            ctx.author().name,
            ctx.author().id
        );
        ctx.send(
            poise::CreateReply::default()
                .content(PanelOutcome::Denied.slash_reply())
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let outcome = match ctx.channel_id().to_channel(ctx.serenity_context()).await {
        Ok(channel) => send_panel(ctx.serenity_context(), &channel, &ctx.data().config).await,
        Err(e) => {
            error!("Failed to fetch channel {}: {}", ctx.channel_id(), e);
            PanelOutcome::TransportError(e.to_string())
        }
    };

    if !outcome.is_success() {
        warn!("Verification panel not posted in {}: {:?}", ctx.channel_id(), outcome);
    }

    ctx.send(
        poise::CreateReply::default()
            .content(outcome.slash_reply())
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
