use chrono::Utc;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info};

use crate::link::{ConnectLink, GuildInfo, LinkOutcome};
use crate::panel::LETS_GO_BUTTON_ID;
use crate::{Data, Error};

const NOT_IN_GUILD_REPLY: &str = "This button only works inside a server.";
const LINK_FAILED_REPLY: &str = "Failed to create your connect link. Please try again later.";

/// Component interactions this bot answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRoute {
    ConnectLink,
}

impl ComponentRoute {
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        match custom_id {
            LETS_GO_BUTTON_ID => Some(ComponentRoute::ConnectLink),
            _ => None,
        }
    }
}

/// Handle button presses and other component interactions
pub async fn handle_component(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    match ComponentRoute::from_custom_id(&interaction.data.custom_id) {
        Some(ComponentRoute::ConnectLink) => {
            let outcome = issue_connect_link(ctx, interaction, data).await;
            debug!("Connect link for {}: {:?}", interaction.user.id, outcome);
        }
        None => {
            debug!("Ignoring component '{}'", interaction.data.custom_id);
        }
    }
    Ok(())
}

async fn issue_connect_link(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> LinkOutcome {
    if let Err(e) = interaction.defer_ephemeral(&ctx.http).await {
        error!("Failed to defer connect link interaction {}: {}", interaction.id, e);
        return LinkOutcome::TransportError(e.to_string());
    }

    let Some(guild_id) = interaction.guild_id else {
        edit_with_content(ctx, interaction, NOT_IN_GUILD_REPLY).await;
        return LinkOutcome::NotInGuild;
    };

    let user = interaction
        .member
        .as_ref()
        .map(|member| &member.user)
        .unwrap_or(&interaction.user);

    let link = match GuildInfo::fetch(ctx, guild_id).await.and_then(|guild| {
        ConnectLink::build(&data.config, user, &guild, interaction.id, Utc::now())
    }) {
        Ok(link) => link,
        Err(e) => {
            error!("Failed to build connect link for {}: {}", user.id, e);
            edit_with_content(ctx, interaction, LINK_FAILED_REPLY).await;
            return LinkOutcome::TransportError(e.to_string());
        }
    };

    let response = serenity::EditInteractionResponse::new()
        .embed(link.embed())
        .components(link.components());

    match interaction.edit_response(&ctx.http, response).await {
        Ok(_) => {
            info!("Issued connect link to {} in guild {}", user.id, guild_id);
            LinkOutcome::Issued
        }
        Err(e) => {
            error!("Failed to send connect link to {}: {}", user.id, e);
            LinkOutcome::TransportError(e.to_string())
        }
    }
}

async fn edit_with_content(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) {
    if let Err(e) = interaction
        .edit_response(
            &ctx.http,
            serenity::EditInteractionResponse::new().content(content),
        )
        .await
    {
        error!("Failed to reply to interaction {}: {}", interaction.id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_routes() {
        assert_eq!(
            ComponentRoute::from_custom_id("verify_letsgo"),
            Some(ComponentRoute::ConnectLink)
        );
        assert_eq!(ComponentRoute::from_custom_id("verify_letsgo_"), None);
        assert_eq!(ComponentRoute::from_custom_id("config_global"), None);
        assert_eq!(ComponentRoute::from_custom_id(""), None);
    }
}
