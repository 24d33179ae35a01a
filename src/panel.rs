//! The verification panel: embed, button row and the send path shared by
//! the slash command and the legacy `!verify` trigger.

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::config::BotConfig;

/// Custom ID of the "Let's go!" button
pub const LETS_GO_BUTTON_ID: &str = "verify_letsgo";
pub const DOCS_URL: &str = "https://dev.collab.land/";
pub const DONATE_URL: &str = "https://donate.collab.land/";

pub const PANEL_AUTHOR: &str = "Collab.Land";
pub const PANEL_TITLE: &str = "**Verify your assets**";
pub const PANEL_DESCRIPTION: &str = "This is a read-only connection. Do not share your private keys.\n\
    We will never ask for your seed phrase. We will never DM you.";
pub const PANEL_COLOR: u32 = 0xe67e22;

/// Result of a request to post the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelOutcome {
    Posted,
    /// Invoker lacks the manage messages capability
    Denied,
    UnsupportedChannel,
    TransportError(String),
}

impl PanelOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PanelOutcome::Posted)
    }

    /// Ephemeral reply for the `/verify` command
    pub fn slash_reply(&self) -> &'static str {
        match self {
            PanelOutcome::Posted => "Verification panel posted successfully!",
            PanelOutcome::Denied => {
                "You need **Manage Messages** permission to use this command."
            }
            PanelOutcome::UnsupportedChannel | PanelOutcome::TransportError(_) => {
                "Failed to post verification panel — check bot permissions and console."
            }
        }
    }

    /// Channel reply for the legacy `!verify` trigger
    pub fn prefix_reply(&self) -> &'static str {
        match self {
            PanelOutcome::Posted => "Verification panel posted!",
            PanelOutcome::Denied => "You need Manage Messages permission.",
            PanelOutcome::UnsupportedChannel | PanelOutcome::TransportError(_) => {
                "Failed to post panel — check permissions."
            }
        }
    }
}

/// A button on the panel row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelButton {
    /// Stateful button, answered by the interaction handler
    Action {
        custom_id: &'static str,
        label: &'static str,
    },
    /// Outbound link
    Link {
        label: &'static str,
        url: &'static str,
    },
}

impl PanelButton {
    pub fn to_button(&self) -> serenity::CreateButton {
        match self {
            PanelButton::Action { custom_id, label } => serenity::CreateButton::new(*custom_id)
                .label(*label)
                .style(serenity::ButtonStyle::Primary),
            PanelButton::Link { label, url } => {
                serenity::CreateButton::new_link(*url).label(*label)
            }
        }
    }
}

/// The three panel buttons in display order
pub fn panel_buttons() -> [PanelButton; 3] {
    [
        PanelButton::Action {
            custom_id: LETS_GO_BUTTON_ID,
            label: "Let's go!",
        },
        PanelButton::Link {
            label: "Docs",
            url: DOCS_URL,
        },
        PanelButton::Link {
            label: "Donate",
            url: DONATE_URL,
        },
    ]
}

pub fn panel_embed(config: &BotConfig) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(PANEL_COLOR)
        .author(serenity::CreateEmbedAuthor::new(PANEL_AUTHOR).icon_url(&config.panel_icon_url))
        .title(PANEL_TITLE)
        .description(PANEL_DESCRIPTION)
        .thumbnail(&config.panel_icon_url)
}

pub fn panel_components() -> Vec<serenity::CreateActionRow> {
    let buttons = panel_buttons().iter().map(PanelButton::to_button).collect();
    vec![serenity::CreateActionRow::Buttons(buttons)]
}

/// Only plain text and announcement channels can hold the panel
pub fn is_panel_channel(kind: serenity::ChannelType) -> bool {
    matches!(
        kind,
        serenity::ChannelType::Text | serenity::ChannelType::News
    )
}

/// Channel kind for guild channels, `None` for DMs
pub fn channel_kind(channel: &serenity::Channel) -> Option<serenity::ChannelType> {
    match channel {
        serenity::Channel::Guild(guild_channel) => Some(guild_channel.kind),
        _ => None,
    }
}

/// Post the panel into `channel`.
///
/// Errors are logged and folded into the returned outcome.
pub async fn send_panel(
    http: impl serenity::CacheHttp,
    channel: &serenity::Channel,
    config: &BotConfig,
) -> PanelOutcome {
    if !channel_kind(channel).is_some_and(is_panel_channel) {
        info!("Cannot send to non-text channel {}", channel.id());
        return PanelOutcome::UnsupportedChannel;
    }

    let message = serenity::CreateMessage::new()
        .embed(panel_embed(config))
        .components(panel_components());

    match channel.id().send_message(http, message).await {
        Ok(sent) => {
            info!("Posted verification panel {} in channel {}", sent.id, channel.id());
            PanelOutcome::Posted
        }
        Err(e) => {
            error!("Failed to send verification embed to {}: {}", channel.id(), e);
            PanelOutcome::TransportError(e.to_string())
        }
    }
}
