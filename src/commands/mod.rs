pub mod verify;

pub use verify::verify;

use poise::serenity_prelude as serenity;

/// Where slash commands get registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationScope {
    /// Single guild, propagates immediately
    Guild(serenity::GuildId),
    /// All guilds, may take up to an hour to propagate
    Global,
}

impl From<Option<serenity::GuildId>> for RegistrationScope {
    fn from(guild_id: Option<serenity::GuildId>) -> Self {
        match guild_id {
            Some(id) => RegistrationScope::Guild(id),
            None => RegistrationScope::Global,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_scope() {
        let guild = serenity::GuildId::new(42);
        assert_eq!(RegistrationScope::from(Some(guild)), RegistrationScope::Guild(guild));
        assert_eq!(RegistrationScope::from(None), RegistrationScope::Global);
    }

    #[test]
    fn test_verify_command_definition() {
        let command = verify();
        assert_eq!(command.name, "verify");
        assert_eq!(
            command.description.as_deref(),
            Some("Post the collab.land-style verification panel")
        );
        assert!(command.slash_action.is_some());
        assert!(command.parameters.is_empty());
    }
}
