use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};
use twilight_model::{
    channel::message::MessageFlags,
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
};

use crate::{
    commands::{CommandNode, Node},
    error::{DispatchError, ResolutionError},
    permissions::PermissionResult,
};

use super::{
    context::{AutocompleteContext, CommandContext},
    event::{CommandPath, InteractionEvent, InteractionKind},
    registry::{CommandRegistry, CommandUploader},
};

/// Title of the fallback reply sent when a handler fails without replying.
const FAILURE_TITLE: &str = "Error has occurred";

/// What became of an inbound event.
#[derive(Debug)]
pub enum Dispatch {
    /// A task is running the handler.
    Spawned(JoinHandle<()>),
    /// Refused before any handler ran.
    Rejected(DispatchError),
}

/// Routes inbound interactions to command handlers.
///
/// Resolution happens on the caller's task; permission checks, deferral and
/// the handler itself run on a spawned task so a slow handler never blocks
/// the event loop.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: CommandRegistry) -> Self {
        Dispatcher {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Gateway ready hook: uploads the schema on first call.
    pub async fn on_ready(&self, uploader: &dyn CommandUploader) -> anyhow::Result<usize> {
        self.registry.register(uploader).await
    }

    /// Group first, then sub-command, then the root itself.
    pub fn resolve(&self, path: &CommandPath) -> Result<CommandNode, ResolutionError> {
        let root = self.registry.resolve(&path.command)?;

        match (&path.group, &path.subcommand) {
            (Some(group), Some(subcommand)) => root
                .group(group)
                .and_then(|group| group.find(subcommand))
                .map(|sub| CommandNode::Sub(Arc::clone(sub)))
                .ok_or_else(|| ResolutionError::Group {
                    command: path.command.clone(),
                    group: group.clone(),
                    subcommand: subcommand.clone(),
                }),
            (None, Some(subcommand)) => root
                .child(subcommand)
                .map(|sub| CommandNode::Sub(Arc::clone(sub)))
                .ok_or_else(|| ResolutionError::SubCommand {
                    command: path.command.clone(),
                    subcommand: subcommand.clone(),
                }),
            // A group without a sub-command cannot be invoked.
            (Some(group), None) => Err(ResolutionError::SubCommand {
                command: path.command.clone(),
                subcommand: group.clone(),
            }),
            (None, None) => Ok(CommandNode::Root(Arc::clone(root))),
        }
    }

    pub async fn on_interaction(&self, event: InteractionEvent) -> Dispatch {
        match event.kind {
            InteractionKind::Execute => self.dispatch_execute(event).await,
            InteractionKind::Autocomplete => self.dispatch_autocomplete(event),
        }
    }

    async fn dispatch_execute(&self, event: InteractionEvent) -> Dispatch {
        if event.guild_id.is_none() {
            return reject(event, DispatchError::OutsideGuild).await;
        }

        match self.resolve(&event.path) {
            Ok(node) => Dispatch::Spawned(tokio::spawn(run_execute(node, event))),
            Err(err) => reject(event, err.into()).await,
        }
    }

    fn dispatch_autocomplete(&self, event: InteractionEvent) -> Dispatch {
        if event.guild_id.is_none() {
            debug!(path = %event.path, "ignoring autocomplete outside a guild");
            return Dispatch::Rejected(DispatchError::OutsideGuild);
        }

        match self.resolve(&event.path) {
            Ok(node) => Dispatch::Spawned(tokio::spawn(run_autocomplete(node, event))),
            Err(err) => {
                error!(error = %err, "autocomplete for unknown command");
                Dispatch::Rejected(err.into())
            }
        }
    }
}

async fn reject(event: InteractionEvent, error: DispatchError) -> Dispatch {
    warn!(path = %event.path, user = %event.caller.name, error = %error, "rejected interaction");

    let response = InteractionResponse {
        kind: InteractionResponseType::ChannelMessageWithSource,
        data: Some(InteractionResponseData {
            content: Some(error.to_string()),
            flags: Some(MessageFlags::EPHEMERAL),
            ..Default::default()
        }),
    };
    if let Err(err) = event.responder.create_response(response).await {
        error!(error = ?err, "failed to send rejection");
    }

    Dispatch::Rejected(error)
}

async fn run_execute(node: CommandNode, event: InteractionEvent) {
    let span = info_span!("command", id = node.info().id, path = %event.path);
    let mut ctx = CommandContext::new(node.clone(), event);

    async move {
        if let PermissionResult::Denied(denied) =
            node.check_permissions(ctx.member_permissions(), ctx.bot_permissions())
        {
            debug!(user = %ctx.caller().name, reason = %denied, "permission denied");
            if let Err(err) = ctx.reply_message(denied.to_string()).await {
                error!(error = ?err, "failed to send permission denial");
            }
            return;
        }

        if node.deferred_reply_enabled()
            && let Err(err) = ctx.defer().await
        {
            error!(error = ?err, "failed to defer reply");
        }

        info!(
            "{} executed command {}",
            ctx.caller().name,
            ctx.command_path()
        );

        let handler = Arc::clone(node.info().handler());
        let outcome = AssertUnwindSafe(handler.execute(&mut ctx))
            .catch_unwind()
            .await;
        let detail = match outcome {
            Ok(Ok(())) if ctx.has_replied() => return,
            Ok(Ok(())) => {
                error!("handler returned without replying");
                "The command finished without a response.".to_string()
            }
            Ok(Err(err)) => {
                error!(error = ?err, "command failed");
                err.to_string()
            }
            Err(_) => {
                error!("command handler panicked");
                "The command stopped unexpectedly.".to_string()
            }
        };

        if !ctx.has_replied()
            && let Err(err) = ctx.reply_error(FAILURE_TITLE, &detail).await
        {
            error!(error = ?err, "failed to send failure reply");
        }
    }
    .instrument(span)
    .await
}

async fn run_autocomplete(node: CommandNode, event: InteractionEvent) {
    let span = info_span!("autocomplete", id = node.info().id, path = %event.path);
    let mut ctx = AutocompleteContext::new(node.clone(), event);

    async move {
        let handler = Arc::clone(node.info().handler());
        match AssertUnwindSafe(handler.autocomplete(&mut ctx))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = ?err, "autocomplete failed"),
            Err(_) => error!("autocomplete handler panicked"),
        }
    }
    .instrument(span)
    .await
}
