use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use twilight_model::{
    application::{
        command::{CommandOptionChoice, CommandOptionChoiceValue},
        interaction::application_command::{CommandDataOption, CommandOptionValue},
    },
    channel::message::{Embed, MessageFlags},
    guild::Permissions,
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    id::{
        Id,
        marker::{ChannelMarker, GuildMarker, UserMarker},
    },
    util::Timestamp,
};
use twilight_util::builder::message::{ContainerBuilder, TextDisplayBuilder};

use crate::{
    arguments::{Arguments, OptionMap, OptionalArgumentConverter},
    commands::{CommandNode, MAX_ENTRIES, Node},
    error::ValidationError,
};

use super::event::{Caller, CommandPath, InteractionEvent};

/// Accent used for error containers.
const ERROR_ACCENT: u32 = 0xAA0000;

/// Outbound side of one interaction.
///
/// The first acknowledgement goes through `create_response`. After a deferral
/// the original response is edited with `update_response`; anything sent
/// after a full reply becomes a follow-up.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    async fn create_response(&self, response: InteractionResponse) -> anyhow::Result<()>;

    async fn update_response(&self, data: InteractionResponseData) -> anyhow::Result<()>;

    async fn create_followup(&self, data: InteractionResponseData) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AckState {
    Pending,
    Deferred,
    Replied,
}

/// Read-only view of the event shared by both context kinds.
pub struct Invocation {
    node: CommandNode,
    path: CommandPath,
    options: Vec<CommandDataOption>,
    guild_id: Option<Id<GuildMarker>>,
    channel_id: Option<Id<ChannelMarker>>,
    caller: Caller,
    bot_permissions: Permissions,
    created_at: Option<Timestamp>,
    responder: Arc<dyn InteractionResponder>,
}

impl Invocation {
    fn new(node: CommandNode, event: InteractionEvent) -> Self {
        Invocation {
            node,
            path: event.path,
            options: event.options,
            guild_id: event.guild_id,
            channel_id: event.channel_id,
            caller: event.caller,
            bot_permissions: event.bot_permissions,
            created_at: event.created_at,
            responder: event.responder,
        }
    }

    pub fn node(&self) -> &CommandNode {
        &self.node
    }

    pub fn command_path(&self) -> &CommandPath {
        &self.path
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    pub fn user_id(&self) -> Id<UserMarker> {
        self.caller.id
    }

    pub fn guild_id(&self) -> Option<Id<GuildMarker>> {
        self.guild_id
    }

    pub fn channel_id(&self) -> Option<Id<ChannelMarker>> {
        self.channel_id
    }

    pub fn member_permissions(&self) -> Permissions {
        self.caller.permissions
    }

    pub fn bot_permissions(&self) -> Permissions {
        self.bot_permissions
    }

    pub fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    pub fn raw_option(&self, name: &str) -> Option<&CommandOptionValue> {
        self.options
            .iter()
            .find(|option| option.name.eq_ignore_ascii_case(name))
            .map(|option| &option.value)
    }

    pub fn sent_with_option(&self, name: &str) -> bool {
        self.raw_option(name).is_some()
    }

    pub fn sent_with_any_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Decodes one declared option. Absent options yield `None` from an
    /// `Option<T>` target and [`crate::arguments::Error::Missing`] otherwise.
    pub fn option<T: OptionalArgumentConverter>(&self, name: &str) -> Result<T, ValidationError> {
        let descriptor = self
            .node
            .options()
            .iter()
            .find(|option| option.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ValidationError::Undeclared(name.to_string()))?;

        let value = self
            .raw_option(name)
            .map(|raw| descriptor.decode(raw))
            .transpose()?;

        T::convert(value.as_ref()).map_err(|source| ValidationError::Argument {
            option: descriptor.name.clone(),
            source,
        })
    }

    /// Decodes every sent option against its descriptor and builds `A` from
    /// the result. Focused options are left out.
    pub fn arguments<A: Arguments>(&self) -> Result<A, ValidationError> {
        A::from_options(&self.decoded_options()?)
    }

    pub fn decoded_options(&self) -> Result<OptionMap, ValidationError> {
        let mut decoded = OptionMap::new();
        for raw in &self.options {
            if matches!(raw.value, CommandOptionValue::Focused(..)) {
                continue;
            }
            let descriptor = self
                .node
                .options()
                .iter()
                .find(|option| option.name.eq_ignore_ascii_case(&raw.name))
                .ok_or_else(|| ValidationError::Undeclared(raw.name.clone()))?;
            decoded.insert(descriptor.name.to_lowercase(), descriptor.decode(&raw.value)?);
        }
        Ok(decoded)
    }
}

/// Context handed to [`crate::commands::CommandHandler::execute`].
pub struct CommandContext {
    invocation: Invocation,
    state: AckState,
}

impl Deref for CommandContext {
    type Target = Invocation;

    fn deref(&self) -> &Invocation {
        &self.invocation
    }
}

impl CommandContext {
    pub fn new(node: CommandNode, event: InteractionEvent) -> Self {
        CommandContext {
            invocation: Invocation::new(node, event),
            state: AckState::Pending,
        }
    }

    /// Whether the interaction has been deferred or replied to.
    pub fn is_acknowledged(&self) -> bool {
        self.state != AckState::Pending
    }

    /// Whether a visible reply has been sent.
    pub fn has_replied(&self) -> bool {
        self.state == AckState::Replied
    }

    /// Acknowledges the interaction without content. No-op once acknowledged.
    pub async fn defer(&mut self) -> anyhow::Result<()> {
        if self.state != AckState::Pending {
            return Ok(());
        }
        self.responder
            .create_response(InteractionResponse {
                kind: InteractionResponseType::DeferredChannelMessageWithSource,
                data: None,
            })
            .await?;
        self.state = AckState::Deferred;
        Ok(())
    }

    pub async fn reply(&mut self, data: InteractionResponseData) -> anyhow::Result<()> {
        match self.state {
            AckState::Pending => {
                self.responder
                    .create_response(InteractionResponse {
                        kind: InteractionResponseType::ChannelMessageWithSource,
                        data: Some(data),
                    })
                    .await?
            }
            AckState::Deferred => self.responder.update_response(data).await?,
            AckState::Replied => self.responder.create_followup(data).await?,
        }
        self.state = AckState::Replied;
        Ok(())
    }

    pub async fn reply_message(&mut self, content: impl Into<String>) -> anyhow::Result<()> {
        self.reply(InteractionResponseData {
            content: Some(content.into()),
            ..Default::default()
        })
        .await
    }

    pub async fn reply_embed(&mut self, embed: Embed) -> anyhow::Result<()> {
        self.reply_embeds(vec![embed]).await
    }

    pub async fn reply_embeds(&mut self, embeds: Vec<Embed>) -> anyhow::Result<()> {
        self.reply(InteractionResponseData {
            embeds: Some(embeds),
            ..Default::default()
        })
        .await
    }

    /// Ephemeral red container with a title line and a detail line.
    pub async fn reply_error(&mut self, title: &str, detail: &str) -> anyhow::Result<()> {
        let container = ContainerBuilder::new()
            .accent_color(Some(ERROR_ACCENT))
            .component(TextDisplayBuilder::new(format!("### {title}")).build())
            .component(TextDisplayBuilder::new(detail).build())
            .build();

        self.reply(InteractionResponseData {
            components: Some(vec![container.into()]),
            flags: Some(MessageFlags::EPHEMERAL | MessageFlags::IS_COMPONENTS_V2),
            ..Default::default()
        })
        .await
    }
}

/// Context handed to [`crate::commands::CommandHandler::autocomplete`].
pub struct AutocompleteContext {
    invocation: Invocation,
    responded: bool,
}

impl Deref for AutocompleteContext {
    type Target = Invocation;

    fn deref(&self) -> &Invocation {
        &self.invocation
    }
}

impl AutocompleteContext {
    pub fn new(node: CommandNode, event: InteractionEvent) -> Self {
        AutocompleteContext {
            invocation: Invocation::new(node, event),
            responded: false,
        }
    }

    /// Name of the option being typed into.
    pub fn focused_option(&self) -> Option<&str> {
        self.focused().map(|(name, _)| name)
    }

    /// Text typed so far, empty when nothing is focused.
    pub fn focused_value(&self) -> &str {
        self.focused().map(|(_, value)| value).unwrap_or_default()
    }

    fn focused(&self) -> Option<(&str, &str)> {
        self.options.iter().find_map(|option| match &option.value {
            CommandOptionValue::Focused(value, _) => Some((option.name.as_str(), value.as_str())),
            _ => None,
        })
    }

    pub fn has_responded(&self) -> bool {
        self.responded
    }

    /// Sends the choices whose name starts with the focused value, ignoring
    /// case, capped at the platform limit.
    pub async fn suggest(&mut self, choices: Vec<CommandOptionChoice>) -> anyhow::Result<()> {
        let choices = filter_choices(choices, self.focused_value());
        self.responder
            .create_response(InteractionResponse {
                kind: InteractionResponseType::ApplicationCommandAutocompleteResult,
                data: Some(InteractionResponseData {
                    choices: Some(choices),
                    ..Default::default()
                }),
            })
            .await?;
        self.responded = true;
        Ok(())
    }

    /// [`Self::suggest`] for plain strings used as both name and value.
    pub async fn suggest_strings<I, S>(&mut self, values: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices = values
            .into_iter()
            .map(|value| {
                let value = value.into();
                CommandOptionChoice {
                    name: value.clone(),
                    name_localizations: None,
                    value: CommandOptionChoiceValue::String(value),
                }
            })
            .collect();
        self.suggest(choices).await
    }
}

pub(crate) fn filter_choices(
    choices: Vec<CommandOptionChoice>,
    typed: &str,
) -> Vec<CommandOptionChoice> {
    let typed = typed.to_lowercase();
    choices
        .into_iter()
        .filter(|choice| choice.name.to_lowercase().starts_with(&typed))
        .take(MAX_ENTRIES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::{RootCommand, SubCommand},
        executor::event::InteractionKind,
        options::{OptionDescriptor, OptionValue, SemanticType},
    };
    use std::sync::Mutex;
    use twilight_model::application::command::CommandOptionType;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<&'static str>>,
        last: Mutex<Option<InteractionResponseData>>,
    }

    #[async_trait]
    impl InteractionResponder for Recorder {
        async fn create_response(&self, response: InteractionResponse) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(match response.kind {
                InteractionResponseType::DeferredChannelMessageWithSource => "defer",
                InteractionResponseType::ApplicationCommandAutocompleteResult => "autocomplete",
                _ => "create",
            });
            *self.last.lock().unwrap() = response.data;
            Ok(())
        }

        async fn update_response(&self, data: InteractionResponseData) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push("update");
            *self.last.lock().unwrap() = Some(data);
            Ok(())
        }

        async fn create_followup(&self, data: InteractionResponseData) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push("followup");
            *self.last.lock().unwrap() = Some(data);
            Ok(())
        }
    }

    fn node() -> CommandNode {
        let sub = SubCommand::builder("price", "Gives a price of a given security")
            .option(
                OptionDescriptor::new(SemanticType::String)
                    .name("security_symbol")
                    .description("Security you want to get a price of"),
            )
            .option(
                OptionDescriptor::new(SemanticType::Long)
                    .name("limit")
                    .description("How many")
                    .required(false),
            )
            .build()
            .unwrap();
        let root = RootCommand::builder("security", "Securities")
            .child(sub)
            .build()
            .unwrap();
        CommandNode::Sub(Arc::clone(&root.children()[0]))
    }

    fn event(
        kind: InteractionKind,
        options: Vec<CommandDataOption>,
        responder: Arc<Recorder>,
    ) -> InteractionEvent {
        let caller = Caller {
            id: Id::new(1),
            name: "trader".to_string(),
            permissions: Permissions::empty(),
        };
        let mut event = InteractionEvent::new(
            kind,
            CommandPath::new("security").subcommand("price"),
            caller,
            responder,
        );
        event.options = options;
        event
    }

    fn symbol(value: CommandOptionValue) -> CommandDataOption {
        CommandDataOption {
            name: "security_symbol".to_string(),
            value,
        }
    }

    #[tokio::test]
    async fn first_reply_creates_then_follow_ups() {
        let recorder = Arc::new(Recorder::default());
        let mut ctx = CommandContext::new(node(), event(InteractionKind::Execute, vec![], recorder.clone()));

        ctx.reply_message("one").await.unwrap();
        ctx.reply_message("two").await.unwrap();

        assert_eq!(*recorder.sent.lock().unwrap(), vec!["create", "followup"]);
    }

    #[tokio::test]
    async fn deferred_reply_edits_original() {
        let recorder = Arc::new(Recorder::default());
        let mut ctx = CommandContext::new(node(), event(InteractionKind::Execute, vec![], recorder.clone()));

        ctx.defer().await.unwrap();
        assert!(ctx.is_acknowledged());
        assert!(!ctx.has_replied());
        ctx.defer().await.unwrap();
        ctx.reply_error("Error has occurred", "boom").await.unwrap();

        assert_eq!(*recorder.sent.lock().unwrap(), vec!["defer", "update"]);
        let last = recorder.last.lock().unwrap().clone().unwrap();
        assert!(last.flags.unwrap().contains(MessageFlags::EPHEMERAL));
        assert_eq!(last.components.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn options_decode_through_descriptors() {
        let recorder = Arc::new(Recorder::default());
        let ctx = CommandContext::new(
            node(),
            event(
                InteractionKind::Execute,
                vec![symbol(CommandOptionValue::String("AAPL".to_string()))],
                recorder,
            ),
        );

        assert_eq!(ctx.option::<String>("security_symbol").unwrap(), "AAPL");
        assert_eq!(ctx.option::<Option<i64>>("limit").unwrap(), None);
        assert!(ctx.sent_with_option("security_symbol"));
        assert!(!ctx.sent_with_option("limit"));
        assert!(matches!(
            ctx.option::<String>("nope"),
            Err(ValidationError::Undeclared(_))
        ));
        assert_eq!(
            ctx.decoded_options().unwrap().get("security_symbol"),
            Some(&OptionValue::String("AAPL".to_string()))
        );
    }

    #[tokio::test]
    async fn suggestions_filter_by_prefix_and_cap() {
        let recorder = Arc::new(Recorder::default());
        let mut ctx = AutocompleteContext::new(
            node(),
            event(
                InteractionKind::Autocomplete,
                vec![symbol(CommandOptionValue::Focused(
                    "a".to_string(),
                    CommandOptionType::String,
                ))],
                recorder.clone(),
            ),
        );

        assert_eq!(ctx.focused_option(), Some("security_symbol"));
        let mut values: Vec<String> = (0..40).map(|i| format!("A{i}")).collect();
        values.push("MSFT".to_string());
        ctx.suggest_strings(values).await.unwrap();

        assert!(ctx.has_responded());
        let choices = recorder.last.lock().unwrap().clone().unwrap().choices.unwrap();
        assert_eq!(choices.len(), MAX_ENTRIES);
        assert!(choices.iter().all(|choice| choice.name.starts_with('A')));
    }
}
