use std::{fmt, sync::Arc};

use twilight_model::{
    application::interaction::{
        Interaction, InteractionData, InteractionType,
        application_command::{CommandDataOption, CommandOptionValue},
    },
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, GuildMarker, UserMarker},
    },
    util::Timestamp,
};

use super::context::InteractionResponder;

/// Milliseconds between the Unix epoch and the first snowflake.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Execute,
    Autocomplete,
}

/// The `(command, group, subcommand)` triple an event addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandPath {
    pub command: String,
    pub group: Option<String>,
    pub subcommand: Option<String>,
}

impl CommandPath {
    pub fn new(command: &str) -> Self {
        CommandPath {
            command: command.to_string(),
            group: None,
            subcommand: None,
        }
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn subcommand(mut self, subcommand: &str) -> Self {
        self.subcommand = Some(subcommand.to_string());
        self
    }
}

impl fmt::Display for CommandPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)?;
        for part in [&self.group, &self.subcommand].into_iter().flatten() {
            write!(f, " {part}")?;
        }
        Ok(())
    }
}

/// Who invoked the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Id<UserMarker>,
    pub name: String,
    /// Resolved permissions of the member in the invoking channel.
    pub permissions: Permissions,
}

/// One inbound command or autocomplete interaction.
pub struct InteractionEvent {
    pub kind: InteractionKind,
    pub path: CommandPath,
    /// Leaf-level options, already unwrapped from any group/sub-command layer.
    pub options: Vec<CommandDataOption>,
    pub guild_id: Option<Id<GuildMarker>>,
    pub channel_id: Option<Id<ChannelMarker>>,
    pub caller: Caller,
    pub bot_permissions: Permissions,
    pub created_at: Option<Timestamp>,
    pub responder: Arc<dyn InteractionResponder>,
}

impl fmt::Debug for InteractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionEvent")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("options", &self.options)
            .field("guild_id", &self.guild_id)
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

impl InteractionEvent {
    pub fn new(
        kind: InteractionKind,
        path: CommandPath,
        caller: Caller,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        InteractionEvent {
            kind,
            path,
            options: Vec::new(),
            guild_id: None,
            channel_id: None,
            caller,
            bot_permissions: Permissions::empty(),
            created_at: None,
            responder,
        }
    }

    /// Converts a gateway interaction. Returns `None` for interactions that are
    /// neither slash commands nor autocomplete requests.
    pub fn from_interaction(
        interaction: Interaction,
        responder: Arc<dyn InteractionResponder>,
    ) -> Option<Self> {
        let kind = match interaction.kind {
            InteractionType::ApplicationCommand => InteractionKind::Execute,
            InteractionType::ApplicationCommandAutocomplete => InteractionKind::Autocomplete,
            _ => return None,
        };

        let author = interaction.author()?;
        let caller = Caller {
            id: author.id,
            name: author.name.clone(),
            permissions: interaction
                .member
                .as_ref()
                .and_then(|member| member.permissions)
                .unwrap_or_else(Permissions::empty),
        };
        let guild_id = interaction.guild_id;
        let channel_id = interaction.channel.as_ref().map(|channel| channel.id);
        let bot_permissions = interaction
            .app_permissions
            .unwrap_or_else(Permissions::empty);
        let created_at = snowflake_timestamp(interaction.id.get());

        let Some(InteractionData::ApplicationCommand(data)) = interaction.data else {
            return None;
        };
        let (group, subcommand, options) = split_options(data.options);

        Some(InteractionEvent {
            kind,
            path: CommandPath {
                command: data.name,
                group,
                subcommand,
            },
            options,
            guild_id,
            channel_id,
            caller,
            bot_permissions,
            created_at,
            responder,
        })
    }
}

/// Peels the sub-command group and sub-command layers off the option list.
fn split_options(
    options: Vec<CommandDataOption>,
) -> (Option<String>, Option<String>, Vec<CommandDataOption>) {
    match <[CommandDataOption; 1]>::try_from(options) {
        Ok([CommandDataOption {
            name,
            value: CommandOptionValue::SubCommandGroup(inner),
        }]) => {
            let (_, subcommand, leaf) = split_options(inner);
            (Some(name), subcommand, leaf)
        }
        Ok([CommandDataOption {
            name,
            value: CommandOptionValue::SubCommand(inner),
        }]) => (None, Some(name), inner),
        Ok([single]) => (None, None, vec![single]),
        Err(options) => (None, None, options),
    }
}

fn snowflake_timestamp(id: u64) -> Option<Timestamp> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    let micros = i64::try_from(millis).ok()?.checked_mul(1000)?;
    Timestamp::from_micros(micros).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use twilight_model::application::command::CommandOptionType;

    fn option(name: &str, value: CommandOptionValue) -> CommandDataOption {
        CommandDataOption {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn splits_group_and_subcommand() {
        let options = vec![option(
            "config",
            CommandOptionValue::SubCommandGroup(vec![option(
                "set",
                CommandOptionValue::SubCommand(vec![option(
                    "key",
                    CommandOptionValue::String("prefix".to_string()),
                )]),
            )]),
        )];

        let (group, subcommand, leaf) = split_options(options);
        assert_eq!(group.as_deref(), Some("config"));
        assert_eq!(subcommand.as_deref(), Some("set"));
        assert_eq!(leaf.len(), 1);
        assert_eq!(leaf[0].name, "key");
    }

    #[test]
    fn splits_bare_subcommand() {
        let options = vec![option(
            "price",
            CommandOptionValue::SubCommand(vec![option(
                "security_symbol",
                CommandOptionValue::String("AAPL".to_string()),
            )]),
        )];

        let (group, subcommand, leaf) = split_options(options);
        assert_eq!(group, None);
        assert_eq!(subcommand.as_deref(), Some("price"));
        assert_eq!(leaf[0].value, CommandOptionValue::String("AAPL".to_string()));
    }

    #[test]
    fn leaves_plain_options_untouched() {
        let options = vec![
            option("model", CommandOptionValue::String("gpt".to_string())),
            option(
                "prompt",
                CommandOptionValue::Focused("hel".to_string(), CommandOptionType::String),
            ),
        ];

        let (group, subcommand, leaf) = split_options(options);
        assert_eq!((group, subcommand), (None, None));
        assert_eq!(leaf.len(), 2);
    }

    #[test]
    fn path_display_joins_segments() {
        let path = CommandPath::new("security").subcommand("price");
        assert_eq!(path.to_string(), "security price");
        let path = CommandPath::new("admin").group("config").subcommand("set");
        assert_eq!(path.to_string(), "admin config set");
    }

    #[test]
    fn snowflake_maps_to_creation_time() {
        // 2015-01-01T00:00:01Z
        let ts = snowflake_timestamp(1000 << 22).unwrap();
        assert_eq!(ts.as_secs(), 1_420_070_401);
    }
}
