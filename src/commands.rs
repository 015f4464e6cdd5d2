//! The static command tree: root commands, grouped or bare sub-commands, and
//! the handler contract they dispatch to.

use std::{collections::HashSet, fmt, sync::Arc};

use async_trait::async_trait;
use twilight_model::{
    application::{
        command::{Command, CommandOption, CommandType},
        interaction::InteractionContextType,
    },
    guild::Permissions,
};
use twilight_util::builder::command as platform;

use crate::{
    error::{DefinitionError, HandlerError},
    executor::context::{AutocompleteContext, CommandContext},
    options::OptionDescriptor,
    permissions::{self, PermissionResult},
};

/// Platform cap on options, sub-commands, groups and choices per list.
pub const MAX_ENTRIES: usize = 25;

/// Behaviour behind a command node.
///
/// Both methods have fallbacks that signal an unimplemented handler. Real
/// handlers override `execute` and must turn their own failures (including
/// data-source errors) into a reply; nodes with an autocomplete-enabled option
/// also override `autocomplete`.
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        ctx.reply_message("This command is not implemented yet.")
            .await?;
        Err(HandlerError::ExecuteUnimplemented(ctx.command_path().to_string()).into())
    }

    async fn autocomplete(&self, ctx: &mut AutocompleteContext) -> anyhow::Result<()> {
        Err(HandlerError::AutocompleteUnimplemented(ctx.command_path().to_string()).into())
    }
}

/// Handler used when a node declares none. Routers never receive execute
/// events from the platform, so they keep this.
pub struct Unimplemented;

impl CommandHandler for Unimplemented {}

/// Attributes shared by root commands and sub-commands.
#[derive(Clone)]
pub struct NodeInfo {
    pub name: String,
    pub description: String,
    pub caller_permissions: Permissions,
    pub bot_permissions: Permissions,
    pub deferred_reply: bool,
    /// Diagnostic identifier; never used for lookup.
    pub id: u32,
    handler: Arc<dyn CommandHandler>,
}

impl NodeInfo {
    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }
}

impl fmt::Debug for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInfo")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("caller_permissions", &self.caller_permissions)
            .field("bot_permissions", &self.bot_permissions)
            .field("deferred_reply", &self.deferred_reply)
            .finish()
    }
}

/// The capability set shared by every node variant.
pub trait Node {
    fn info(&self) -> &NodeInfo;

    /// Options accepted directly by this node. Routers have none.
    fn options(&self) -> &[OptionDescriptor];

    fn name(&self) -> &str {
        &self.info().name
    }

    fn deferred_reply_enabled(&self) -> bool {
        self.info().deferred_reply
    }

    fn check_permissions(&self, caller: Permissions, bot: Permissions) -> PermissionResult {
        let info = self.info();
        permissions::check(info.caller_permissions, info.bot_permissions, caller, bot)
    }
}

/// What a root command holds under it.
#[derive(Debug)]
pub enum RootBody {
    Leaf(Vec<OptionDescriptor>),
    Children(Vec<Arc<SubCommand>>),
    Groups(Vec<SubCommandGroup>),
}

#[derive(Debug)]
pub struct RootCommand {
    info: NodeInfo,
    body: RootBody,
}

#[derive(Debug)]
pub struct SubCommand {
    info: NodeInfo,
    options: Vec<OptionDescriptor>,
}

#[derive(Debug)]
pub struct SubCommandGroup {
    pub name: String,
    pub description: String,
    pub commands: Vec<Arc<SubCommand>>,
}

/// A resolved dispatch target.
#[derive(Debug, Clone)]
pub enum CommandNode {
    Root(Arc<RootCommand>),
    Sub(Arc<SubCommand>),
}

impl RootCommand {
    pub fn builder(name: &str, description: &str) -> RootCommandBuilder {
        RootCommandBuilder {
            common: Common::new(name, description),
            options: Vec::new(),
            children: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn body(&self) -> &RootBody {
        &self.body
    }

    pub fn children(&self) -> &[Arc<SubCommand>] {
        match &self.body {
            RootBody::Children(children) => children,
            _ => &[],
        }
    }

    pub fn groups(&self) -> &[SubCommandGroup] {
        match &self.body {
            RootBody::Groups(groups) => groups,
            _ => &[],
        }
    }

    pub fn child(&self, name: &str) -> Option<&Arc<SubCommand>> {
        find_named(self.children(), name)
    }

    pub fn group(&self, name: &str) -> Option<&SubCommandGroup> {
        self.groups()
            .iter()
            .find(|group| group.name.eq_ignore_ascii_case(name))
    }

    /// Registration payload for this command and everything under it.
    pub fn schema(&self) -> Command {
        let mut command = platform::CommandBuilder::new(
            self.info.name.to_lowercase(),
            self.info.description.clone(),
            CommandType::ChatInput,
        )
        .contexts(vec![InteractionContextType::Guild]);

        if !self.info.caller_permissions.is_empty() {
            command = command.default_member_permissions(self.info.caller_permissions);
        }

        match &self.body {
            RootBody::Leaf(options) => {
                for option in options {
                    command = command.option(CommandOption::from(option));
                }
            }
            RootBody::Children(children) => {
                for child in children {
                    command = command.option(child.schema());
                }
            }
            RootBody::Groups(groups) => {
                for group in groups {
                    command = command.option(group.schema());
                }
            }
        }

        command.build()
    }
}

impl Node for RootCommand {
    fn info(&self) -> &NodeInfo {
        &self.info
    }

    fn options(&self) -> &[OptionDescriptor] {
        match &self.body {
            RootBody::Leaf(options) => options,
            _ => &[],
        }
    }
}

impl SubCommand {
    pub fn builder(name: &str, description: &str) -> SubCommandBuilder {
        SubCommandBuilder {
            common: Common::new(name, description),
            options: Vec::new(),
        }
    }

    fn platform_builder(&self) -> platform::SubCommandBuilder {
        let mut subcommand = platform::SubCommandBuilder::new(
            self.info.name.to_lowercase(),
            self.info.description.clone(),
        );
        for option in &self.options {
            subcommand = subcommand.option(CommandOption::from(option));
        }
        subcommand
    }

    pub fn schema(&self) -> CommandOption {
        self.platform_builder().build()
    }
}

impl Node for SubCommand {
    fn info(&self) -> &NodeInfo {
        &self.info
    }

    fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }
}

impl SubCommandGroup {
    pub fn find(&self, name: &str) -> Option<&Arc<SubCommand>> {
        find_named(&self.commands, name)
    }

    pub fn schema(&self) -> CommandOption {
        platform::SubCommandGroupBuilder::new(self.name.to_lowercase(), self.description.clone())
            .subcommands(self.commands.iter().map(|command| command.platform_builder()))
            .build()
    }
}

impl Node for CommandNode {
    fn info(&self) -> &NodeInfo {
        match self {
            CommandNode::Root(root) => root.info(),
            CommandNode::Sub(sub) => sub.info(),
        }
    }

    fn options(&self) -> &[OptionDescriptor] {
        match self {
            CommandNode::Root(root) => root.options(),
            CommandNode::Sub(sub) => sub.options(),
        }
    }
}

fn find_named<'a>(nodes: &'a [Arc<SubCommand>], name: &str) -> Option<&'a Arc<SubCommand>> {
    nodes
        .iter()
        .find(|node| node.info.name.eq_ignore_ascii_case(name))
}

/// Builder state shared by both node kinds.
struct Common {
    name: String,
    description: String,
    caller_permissions: Permissions,
    bot_permissions: Permissions,
    deferred_reply: bool,
    handler: Arc<dyn CommandHandler>,
}

impl Common {
    fn new(name: &str, description: &str) -> Self {
        Common {
            name: name.to_string(),
            description: description.to_string(),
            caller_permissions: Permissions::empty(),
            bot_permissions: Permissions::empty(),
            deferred_reply: false,
            handler: Arc::new(Unimplemented),
        }
    }

    fn into_info<'a>(self, child_names: impl Iterator<Item = &'a str>) -> NodeInfo {
        NodeInfo {
            id: node_id(&self.name, child_names),
            name: self.name,
            description: self.description,
            caller_permissions: self.caller_permissions,
            bot_permissions: self.bot_permissions,
            deferred_reply: self.deferred_reply,
            handler: self.handler,
        }
    }
}

macro_rules! common_setters {
    () => {
        /// Permissions the invoking member must hold.
        pub fn caller_permissions(mut self, permissions: Permissions) -> Self {
            self.common.caller_permissions = permissions;
            self
        }

        /// Permissions the bot must hold in the guild.
        pub fn bot_permissions(mut self, permissions: Permissions) -> Self {
            self.common.bot_permissions = permissions;
            self
        }

        /// Acknowledge the interaction before the handler runs.
        pub fn deferred_reply(mut self, deferred: bool) -> Self {
            self.common.deferred_reply = deferred;
            self
        }

        pub fn handler(mut self, handler: impl CommandHandler) -> Self {
            self.common.handler = Arc::new(handler);
            self
        }

        pub fn option(mut self, option: OptionDescriptor) -> Self {
            self.options.push(option);
            self
        }
    };
}

pub struct RootCommandBuilder {
    common: Common,
    options: Vec<OptionDescriptor>,
    children: Vec<SubCommand>,
    groups: Vec<(String, String, Vec<SubCommand>)>,
}

impl RootCommandBuilder {
    common_setters!();

    pub fn child(mut self, child: SubCommand) -> Self {
        self.children.push(child);
        self
    }

    /// Adds a named group of sub-commands, described as `This {name}'s` in the
    /// schema.
    pub fn group(mut self, name: &str, commands: Vec<SubCommand>) -> Self {
        self.groups
            .push((name.to_string(), format!("This {name}'s"), commands));
        self
    }

    pub fn build(self) -> Result<RootCommand, DefinitionError> {
        let name = self.common.name.clone();
        validate_name(&name)?;

        let shapes = [
            !self.options.is_empty(),
            !self.children.is_empty(),
            !self.groups.is_empty(),
        ];
        if shapes.iter().filter(|active| **active).count() > 1 {
            return Err(DefinitionError::MixedShape(name));
        }

        let body = if !self.children.is_empty() {
            check_count(&name, "sub-commands", self.children.len())?;
            check_unique(&name, self.children.iter().map(|c| c.info.name.as_str()))?;
            RootBody::Children(self.children.into_iter().map(Arc::new).collect())
        } else if !self.groups.is_empty() {
            check_count(&name, "groups", self.groups.len())?;
            check_unique(&name, self.groups.iter().map(|(group, _, _)| group.as_str()))?;
            let mut groups = Vec::with_capacity(self.groups.len());
            for (group, description, commands) in self.groups {
                validate_name(&group)?;
                if commands.is_empty() {
                    return Err(DefinitionError::EmptyGroup {
                        parent: name.clone(),
                        group,
                    });
                }
                let parent = format!("{name} {group}");
                check_count(&parent, "sub-commands", commands.len())?;
                check_unique(&parent, commands.iter().map(|c| c.info.name.as_str()))?;
                groups.push(SubCommandGroup {
                    name: group,
                    description,
                    commands: commands.into_iter().map(Arc::new).collect(),
                });
            }
            RootBody::Groups(groups)
        } else {
            validate_options(&name, &self.options)?;
            RootBody::Leaf(self.options)
        };

        let child_names: Vec<String> = match &body {
            RootBody::Leaf(_) => Vec::new(),
            RootBody::Children(children) => children.iter().map(|c| c.info.name.clone()).collect(),
            RootBody::Groups(groups) => groups
                .iter()
                .flat_map(|g| g.commands.iter().map(|c| c.info.name.clone()))
                .collect(),
        };
        let info = self
            .common
            .into_info(child_names.iter().map(String::as_str));

        Ok(RootCommand { info, body })
    }
}

pub struct SubCommandBuilder {
    common: Common,
    options: Vec<OptionDescriptor>,
}

impl SubCommandBuilder {
    common_setters!();

    pub fn build(self) -> Result<SubCommand, DefinitionError> {
        validate_name(&self.common.name)?;
        validate_options(&self.common.name, &self.options)?;
        Ok(SubCommand {
            info: self.common.into_info(std::iter::empty()),
            options: self.options,
        })
    }
}

/// 31-multiplier string hash over the node name followed by its child names.
fn node_id<'a>(name: &str, children: impl Iterator<Item = &'a str>) -> u32 {
    children.fold(hash_str(0, name), hash_str)
}

fn hash_str(hash: u32, s: &str) -> u32 {
    s.chars()
        .fold(hash, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32))
}

pub(crate) fn validate_name(name: &str) -> Result<(), DefinitionError> {
    let valid = (1..=32).contains(&name.chars().count())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DefinitionError::InvalidName(name.to_string()))
    }
}

fn check_count(parent: &str, what: &'static str, count: usize) -> Result<(), DefinitionError> {
    if count > MAX_ENTRIES {
        return Err(DefinitionError::TooMany {
            parent: parent.to_string(),
            what,
            count,
        });
    }
    Ok(())
}

pub(crate) fn check_unique<'a>(
    parent: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), DefinitionError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_lowercase()) {
            return Err(DefinitionError::DuplicateName {
                parent: parent.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_options(node: &str, options: &[OptionDescriptor]) -> Result<(), DefinitionError> {
    check_count(node, "options", options.len())?;
    check_unique(node, options.iter().map(|o| o.name.as_str()))?;

    let mut seen_optional = false;
    for option in options {
        validate_name(&option.name)?;
        if !option.choices.is_empty() && option.autocomplete {
            return Err(DefinitionError::ChoicesWithAutocomplete(option.name.clone()));
        }
        check_count(&option.name, "choices", option.choices.len())?;
        if option.required && seen_optional {
            return Err(DefinitionError::RequiredAfterOptional {
                node: node.to_string(),
                option: option.name.clone(),
            });
        }
        seen_optional |= !option.required;
    }
    Ok(())
}
