//! Startup configuration read from the environment.
//!
//! Built once in `main` and shared read-only through the framework data.

use base64::Engine;
use poise::serenity_prelude::GuildId;

use crate::error::{BotError, Result};

pub const DEFAULT_AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
pub const DEFAULT_PANEL_ICON_URL: &str = "https://i.imgur.com/opTOeER.png";

/// Immutable bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub client_id: String,
    pub redirect_uri: String,
    /// Guild to register `/verify` in. `None` registers globally.
    pub guild_id: Option<GuildId>,
    pub authorize_url: String,
    pub panel_icon_url: String,
}

impl BotConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("DISCORD_TOKEN").ok_or(BotError::MissingEnv {
            name: "DISCORD_TOKEN",
            hint: "Set it in .env or the host environment.",
        })?;
        let client_id = get("CLIENT_ID").ok_or(BotError::MissingEnv {
            name: "CLIENT_ID",
            hint: "Set it in .env or the host environment.",
        })?;
        let redirect_uri = get("REDIRECT_URI").ok_or(BotError::MissingEnv {
            name: "REDIRECT_URI",
            hint: "Set it to your public callback URL (for example https://example.com/callback).",
        })?;

        let guild_id = get("GUILD_ID")
            .map(|raw| parse_guild_id("GUILD_ID", &raw))
            .transpose()?;

        Ok(Self {
            token,
            client_id,
            redirect_uri,
            guild_id,
            authorize_url: get("OAUTH_AUTHORIZE_URL")
                .unwrap_or_else(|| DEFAULT_AUTHORIZE_URL.to_string()),
            panel_icon_url: get("PANEL_ICON_URL")
                .unwrap_or_else(|| DEFAULT_PANEL_ICON_URL.to_string()),
        })
    }

    /// Replace the registration guild, e.g. from a command line flag
    pub fn with_guild_id(mut self, guild_id: Option<u64>) -> Result<Self> {
        match guild_id {
            Some(0) => {
                return Err(BotError::InvalidConfig {
                    name: "--guild-id",
                    message: "guild id cannot be 0".to_string(),
                })
            }
            Some(raw) => self.guild_id = Some(GuildId::new(raw)),
            None => {}
        }
        Ok(self)
    }
}

fn parse_guild_id(name: &'static str, raw: &str) -> Result<GuildId> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(BotError::InvalidConfig {
            name,
            message: "guild id cannot be 0".to_string(),
        }),
        Ok(id) => Ok(GuildId::new(id)),
        Err(e) => Err(BotError::InvalidConfig {
            name,
            message: format!("'{}' is not a guild id ({})", raw, e),
        }),
    }
}

/// Extract the application ID embedded in a bot token.
///
/// The first token segment is the base64 encoded ID, usually without padding.
pub fn application_id_from_token(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let decoded = base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(segment)
        .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(segment))
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(segment))
        .ok()?;
    let id = String::from_utf8(decoded).ok()?;
    id.chars().all(|c| c.is_ascii_digit()).then_some(id)
}
