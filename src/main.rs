use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

/// Discord bot that posts a wallet verification panel and hands out connect links
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Register /verify in this guild only (faster for testing). Overrides GUILD_ID
    #[arg(long)]
    guild_id: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

mod commands;
mod config;
mod error;
mod events;
mod link;
mod logging;
mod panel;
mod permissions;

use commands::{verify, RegistrationScope};
use config::{application_id_from_token, BotConfig};
use events::{handle_component, handle_message};

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared application state
pub struct Data {
    pub config: BotConfig,
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = handle_message(ctx, new_message, data).await {
                error!("Failed to handle message: {}", e);
            }
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            if let Some(component) = interaction.as_message_component() {
                if let Err(e) = handle_component(ctx, component, data).await {
                    error!("Failed to handle component interaction: {}", e);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Reply shown to the invoker when a command handler returns an error
fn command_error_reply(error: &dyn std::fmt::Display) -> String {
    format!("An error occurred: {}", error)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    logging::init(logging::parse_level(&args.log_level));

    let config = match BotConfig::from_env().and_then(|c| c.with_guild_id(args.guild_id)) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Some(app_id) = application_id_from_token(&config.token) {
        info!(
            "Bot ID: {} (configure intents at https://discord.com/developers/applications/{}/bot)",
            app_id, app_id
        );
    }

    let scope = RegistrationScope::from(config.guild_id);
    match scope {
        RegistrationScope::Guild(gid) => info!("Will register /verify in guild {}", gid),
        RegistrationScope::Global => {
            info!("Registering /verify globally (takes up to 1 hour to propagate)")
        }
    }

    let token = config.token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![verify()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' invoked by {} (ID: {}) in {}",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.author().id,
                        ctx.guild_id().map(|g| g.to_string()).unwrap_or_else(|| "DM".to_string())
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' completed for {}",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Error in command '{}': {}", ctx.command().qualified_name, error);
                            let _ = ctx
                                .send(
                                    poise::CreateReply::default()
                                        .content(command_error_reply(&error))
                                        .ephemeral(true),
                                )
                                .await;
                        }
                        poise::FrameworkError::GuildOnly { ctx, .. } => {
                            warn!("Command '{}' is guild-only, used in DM by {}", ctx.command().qualified_name, ctx.author().name);
                        }
                        poise::FrameworkError::Setup { error, .. } => {
                            error!("Framework setup failed: {}", error);
                        }
                        other => {
                            error!("Other framework error: {}", other);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot logged in as: {}", ready.user.tag());

                let commands = &framework.options().commands;
                match scope {
                    RegistrationScope::Guild(guild_id) => {
                        match poise::builtins::register_in_guild(ctx, commands, guild_id).await {
                            Ok(()) => info!("/verify command registered in guild {}", guild_id),
                            Err(e) => error!("Failed to register slash command in guild {}: {}", guild_id, e),
                        }
                    }
                    RegistrationScope::Global => {
                        match poise::builtins::register_globally(ctx, commands).await {
                            Ok(()) => info!("/verify command registered globally (may take up to 1h)"),
                            Err(e) => error!("Failed to register slash command: {}", e),
                        }
                    }
                }

                Ok(Data { config })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let privileged_intents: Vec<&str> = [
        (serenity::GatewayIntents::MESSAGE_CONTENT, "MESSAGE_CONTENT"),
        (serenity::GatewayIntents::GUILD_MEMBERS, "GUILD_MEMBERS"),
        (serenity::GatewayIntents::GUILD_PRESENCES, "GUILD_PRESENCES"),
    ]
    .into_iter()
    .filter(|(intent, _)| intents.contains(*intent))
    .map(|(_, name)| name)
    .collect();

    info!("Requesting privileged intents: {:?}", privileged_intents);

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    if let Err(e) = client.start().await {
        let err_str = e.to_string();
        if err_str.contains("Disallowed") || err_str.contains("intents") {
            error!("Failed to start bot: {}", e);
            error!("The following privileged intents need to be enabled in the Discord Developer Portal:");
            for intent in &privileged_intents {
                error!("  - {}", intent);
            }
            return Err(anyhow::anyhow!(
                "Disallowed gateway intents. Enable these in Discord Developer Portal: {:?}",
                privileged_intents
            ));
        }
        return Err(e.into());
    }
    warn!("Bot ended.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_reply() {
        let error: Error = "channel fetch failed".into();
        assert_eq!(
            command_error_reply(&error),
            "An error occurred: channel fetch failed"
        );
    }
}
