//! Connect link issued when a member presses "Let's go!".
//!
//! The session data travels inside the OAuth `state` parameter; nothing is
//! kept on our side.

use chrono::{DateTime, SecondsFormat, Utc};
use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};

use crate::config::BotConfig;
use crate::error::Result;

pub const INSTRUCTIONS_TITLE: &str = "**Please read instructions carefully before connecting**";
pub const INSTRUCTIONS_COLOR: u32 = 0xe74c3c;
pub const CONNECT_LABEL: &str = "Connect Wallet";
const FALLBACK_COMMUNITY_NAME: &str = "Your Community";

/// Result of a "Let's go!" press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Issued,
    /// Button pressed outside a guild, e.g. a forwarded panel in DMs
    NotInGuild,
    TransportError(String),
}

/// Session data handed to the OAuth callback through `state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationState {
    pub user_id: String,
    pub guild_id: String,
    pub guild_name: String,
    pub user_name: String,
    /// Empty when the user has no custom avatar
    pub user_avatar_hash: String,
    /// Empty when the guild has no icon
    pub server_avatar_hash: String,
}

impl VerificationState {
    pub fn new(user: &serenity::User, guild: &GuildInfo) -> Self {
        Self {
            user_id: user.id.to_string(),
            guild_id: guild.id.to_string(),
            guild_name: guild.name.clone(),
            user_name: user.name.clone(),
            user_avatar_hash: user
                .avatar
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            server_avatar_hash: guild.icon.clone().unwrap_or_default(),
        }
    }
}

/// The guild fields the link needs, resolved from cache or HTTP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildInfo {
    pub id: serenity::GuildId,
    pub name: String,
    pub icon: Option<String>,
}

impl GuildInfo {
    pub async fn fetch(ctx: &serenity::Context, guild_id: serenity::GuildId) -> Result<Self> {
        let cached = guild_id.to_guild_cached(&ctx.cache).map(|guild| Self {
            id: guild.id,
            name: guild.name.clone(),
            icon: guild.icon.as_ref().map(ToString::to_string),
        });
        if let Some(info) = cached {
            return Ok(info);
        }

        let guild = guild_id.to_partial_guild(&ctx.http).await?;
        Ok(Self {
            id: guild.id,
            name: guild.name,
            icon: guild.icon.as_ref().map(ToString::to_string),
        })
    }

    pub fn community_name(&self) -> &str {
        if self.name.is_empty() {
            FALLBACK_COMMUNITY_NAME
        } else {
            &self.name
        }
    }
}

/// Build the OAuth authorization URL carrying `state`
pub fn authorization_url(config: &BotConfig, state: &VerificationState) -> Result<String> {
    let state_json = serde_json::to_string(state)?;

    Ok(format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope=identify&state={}",
        config.authorize_url,
        config.client_id,
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&state_json)
    ))
}

/// The message the member will be asked to sign
pub fn signing_message(
    community: &str,
    user_tag: &str,
    interaction_id: serenity::InteractionId,
    timestamp: DateTime<Utc>,
) -> String {
    format!(
        "Collab.Land asks you to sign this message for the purpose of verifying your account ownership. \
        This is READ-ONLY access and will NOT trigger any blockchain transactions or incur any fees.\n\n\
        - Community: {}\n\
        - User: {}\n\
        - Discord Interaction: {}\n\
        - Timestamp: {}\n\n",
        community,
        user_tag,
        interaction_id,
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

pub fn instructions_description(
    guild_id: serenity::GuildId,
    member_id: serenity::UserId,
    signing_message: &str,
) -> String {
    format!(
        "Use this custom link to connect (valid for 5 minutes)\n\n\
        **Guild:** {} | **Member:** {}\n\n\
        You should expect to sign the following message when prompted:\n\n\
        ```{}```\
        **Make sure you sign the EXACT message and NEVER share your seed phrase or private key.**",
        guild_id, member_id, signing_message
    )
}

/// Everything needed to answer the button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectLink {
    pub description: String,
    pub url: String,
}

impl ConnectLink {
    pub fn build(
        config: &BotConfig,
        user: &serenity::User,
        guild: &GuildInfo,
        interaction_id: serenity::InteractionId,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let state = VerificationState::new(user, guild);
        let url = authorization_url(config, &state)?;
        let message = signing_message(guild.community_name(), &user.tag(), interaction_id, timestamp);

        Ok(Self {
            description: instructions_description(guild.id, user.id, &message),
            url,
        })
    }

    pub fn embed(&self) -> serenity::CreateEmbed {
        serenity::CreateEmbed::new()
            .color(INSTRUCTIONS_COLOR)
            .title(INSTRUCTIONS_TITLE)
            .description(&self.description)
    }

    pub fn components(&self) -> Vec<serenity::CreateActionRow> {
        vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new_link(&self.url).label(CONNECT_LABEL),
        ])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config() -> BotConfig {
        BotConfig {
            token: "token".to_string(),
            client_id: "112233".to_string(),
            redirect_uri: "https://verify.example.com/callback?src=discord&x=1".to_string(),
            guild_id: None,
            authorize_url: crate::config::DEFAULT_AUTHORIZE_URL.to_string(),
            panel_icon_url: crate::config::DEFAULT_PANEL_ICON_URL.to_string(),
        }
    }

    fn user(avatar: Option<&str>) -> serenity::User {
        serde_json::from_value(serde_json::json!({
            "id": "444555666",
            "username": "satoshi",
            "discriminator": "0",
            "global_name": null,
            "avatar": avatar,
            "bot": false,
        }))
        .unwrap()
    }

    fn guild(icon: Option<&str>) -> GuildInfo {
        GuildInfo {
            id: serenity::GuildId::new(777888999),
            name: "Token & Friends".to_string(),
            icon: icon.map(str::to_string),
        }
    }

    fn query_params(url: &str) -> HashMap<String, String> {
        let (_, query) = url.split_once('?').unwrap();
        query
            .split('&')
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap();
                (k.to_string(), urlencoding::decode(v).unwrap().into_owned())
            })
            .collect()
    }

    #[test]
    fn test_state_has_exactly_six_keys() {
        let state = VerificationState::new(&user(None), &guild(None));
        let value = serde_json::to_value(&state).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "guild_id",
                "guild_name",
                "server_avatar_hash",
                "user_avatar_hash",
                "user_id",
                "user_name"
            ]
        );
        assert_eq!(object["user_avatar_hash"], "");
        assert_eq!(object["server_avatar_hash"], "");
    }

    #[test]
    fn test_state_carries_avatar_hashes() {
        let state = VerificationState::new(
            &user(Some("a_0123456789abcdef0123456789abcdef")),
            &guild(Some("fedcba9876543210fedcba9876543210")),
        );
        assert_eq!(state.user_avatar_hash, "a_0123456789abcdef0123456789abcdef");
        assert_eq!(state.server_avatar_hash, "fedcba9876543210fedcba9876543210");
    }

    #[test]
    fn test_authorization_url_params() {
        let config = config();
        let state = VerificationState::new(&user(None), &guild(None));
        let url = authorization_url(&config, &state).unwrap();

        assert!(url.starts_with("https://discord.com/oauth2/authorize?client_id=112233&"));
        let params = query_params(&url);
        assert_eq!(params.len(), 5);
        assert_eq!(params["client_id"], "112233");
        assert_eq!(params["redirect_uri"], config.redirect_uri);
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "identify");

        let decoded: VerificationState = serde_json::from_str(&params["state"]).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.user_id, "444555666");
        assert_eq!(decoded.guild_id, "777888999");
        assert_eq!(decoded.guild_name, "Token & Friends");
    }

    #[test]
    fn test_signing_message() {
        let timestamp = DateTime::parse_from_rfc3339("2024-05-01T12:30:45.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let message = signing_message(
            "Token & Friends",
            "satoshi",
            serenity::InteractionId::new(1234567890),
            timestamp,
        );

        assert!(message.starts_with("Collab.Land asks you to sign this message"));
        assert!(message.contains("- Community: Token & Friends\n"));
        assert!(message.contains("- User: satoshi\n"));
        assert!(message.contains("- Discord Interaction: 1234567890\n"));
        assert!(message.contains("- Timestamp: 2024-05-01T12:30:45.123Z\n"));
    }

    #[test]
    fn test_community_name_fallback() {
        let mut info = guild(None);
        assert_eq!(info.community_name(), "Token & Friends");
        info.name.clear();
        assert_eq!(info.community_name(), "Your Community");
    }

    #[test]
    fn test_connect_link() {
        let link = ConnectLink::build(
            &config(),
            &user(None),
            &guild(None),
            serenity::InteractionId::new(42),
            Utc::now(),
        )
        .unwrap();

        assert!(link.description.contains("**Guild:** 777888999 | **Member:** 444555666"));
        assert!(link.description.contains("valid for 5 minutes"));
        assert!(link.description.contains("NEVER share your seed phrase or private key"));
        assert!(link.description.contains("- Discord Interaction: 42"));

        let params = query_params(&link.url);
        let decoded: VerificationState = serde_json::from_str(&params["state"]).unwrap();
        assert_eq!(decoded.user_id, "444555666");
        assert_eq!(decoded.guild_id, "777888999");
        assert_eq!(link.components().len(), 1);
    }
}
