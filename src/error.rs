use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    // Configuration errors
    #[error("{name} is missing! {hint}")]
    MissingEnv { name: &'static str, hint: &'static str },

    #[error("Invalid value for {name}: {message}")]
    InvalidConfig { name: &'static str, message: String },

    // Discord errors
    #[error("Discord API error: {message}")]
    Discord { message: String },

    // Link building errors
    #[error("Failed to serialize verification state: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        BotError::Discord {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Serialization { source: err }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

use poise::serenity_prelude as serenity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_message_names_variable() {
        let err = BotError::MissingEnv {
            name: "CLIENT_ID",
            hint: "Set it in .env or the host environment.",
        };
        assert_eq!(
            err.to_string(),
            "CLIENT_ID is missing! Set it in .env or the host environment."
        );
    }

    #[test]
    fn test_serde_error_converts_to_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BotError = parse_err.into();
        assert!(matches!(err, BotError::Serialization { .. }));
    }
}
