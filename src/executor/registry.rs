use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;
use twilight_model::application::command::Command;

use crate::{
    commands::{Node, RootCommand, check_unique},
    error::{DefinitionError, ResolutionError},
};

/// Publishes the command schema to the platform.
#[async_trait]
pub trait CommandUploader: Send + Sync {
    /// Replaces the global command set.
    async fn set_global_commands(&self, commands: &[Command]) -> anyhow::Result<()>;
}

/// The fixed set of root commands, keyed by lowercased name.
#[derive(Debug)]
pub struct CommandRegistry {
    commands: Vec<Arc<RootCommand>>,
    by_name: HashMap<String, Arc<RootCommand>>,
    registered: OnceCell<usize>,
}

impl CommandRegistry {
    pub fn new(commands: Vec<RootCommand>) -> Result<Self, DefinitionError> {
        check_unique("registry", commands.iter().map(|command| command.name()))?;

        let commands: Vec<_> = commands.into_iter().map(Arc::new).collect();
        let by_name = commands
            .iter()
            .map(|command| (command.name().to_lowercase(), Arc::clone(command)))
            .collect();

        Ok(CommandRegistry {
            commands,
            by_name,
            registered: OnceCell::new(),
        })
    }

    pub fn resolve(&self, name: &str) -> Result<&Arc<RootCommand>, ResolutionError> {
        self.by_name
            .get(&name.to_lowercase())
            .ok_or_else(|| ResolutionError::Command(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RootCommand>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registration payload, in declaration order.
    pub fn schema(&self) -> Vec<Command> {
        self.into()
    }

    /// Uploads the schema once. Later calls return the first result without
    /// contacting the platform again; a failed upload may be retried.
    pub async fn register(&self, uploader: &dyn CommandUploader) -> anyhow::Result<usize> {
        let count = self
            .registered
            .get_or_try_init(|| async {
                let schema = self.schema();
                uploader.set_global_commands(&schema).await?;
                info!("{} commands have been successfully registered", schema.len());
                Ok::<_, anyhow::Error>(schema.len())
            })
            .await?;
        Ok(*count)
    }
}

impl From<&CommandRegistry> for Vec<Command> {
    fn from(registry: &CommandRegistry) -> Vec<Command> {
        registry.commands.iter().map(|command| command.schema()).collect()
    }
}
