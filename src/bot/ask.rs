use async_trait::async_trait;

use crate::{
    commands::{CommandHandler, RootCommand},
    error::DefinitionError,
    executor::{AutocompleteContext, CommandContext},
    options::{OptionDescriptor, SemanticType},
    sources::{ChatMessage, ChatRequest, ChatResponse, ModelInfo, ModelsRequest, Paste, PasteRequest},
};

use super::{Source, Sources, util};

pub struct Ask {
    chat: Source<ChatRequest, ChatResponse>,
    models: Source<ModelsRequest, Vec<ModelInfo>>,
    paste: Source<PasteRequest, Paste>,
}

#[async_trait]
impl CommandHandler for Ask {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let Some(prompt) = ctx.option::<Option<String>>("prompt")? else {
            return ctx.reply_message("You must provide a prompt.").await;
        };
        let Some(model) = ctx.option::<Option<String>>("model")? else {
            return ctx.reply_message("You must provide a model.").await;
        };

        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage::system(util::CHAT_SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ],
        };
        let response = match self.chat.fetch(request).await {
            Ok(response) => response,
            Err(err) => return util::source_failure(ctx, "a response", &err).await,
        };

        let Some(content) = response.content else {
            return ctx
                .reply_error(
                    "An error occurred while trying to get a response.",
                    "The model returned an empty response.",
                )
                .await;
        };

        util::reply_with_overflow(ctx, &self.paste, content).await
    }

    async fn autocomplete(&self, ctx: &mut AutocompleteContext) -> anyhow::Result<()> {
        util::suggest_models(ctx, &self.models).await
    }
}

pub(super) fn model_option() -> OptionDescriptor {
    OptionDescriptor::new(SemanticType::String)
        .name("model")
        .description("The model you want to use")
        .autocomplete(true)
}

pub(super) fn prompt_option() -> OptionDescriptor {
    OptionDescriptor::new(SemanticType::String)
        .name("prompt")
        .description("The prompt you want to ask the LLM")
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    RootCommand::builder("ask", "Uses an LLM to answer your question.")
        .deferred_reply(true)
        .option(model_option())
        .option(prompt_option())
        .handler(Ask {
            chat: sources.chat.clone(),
            models: sources.models.clone(),
            paste: sources.paste.clone(),
        })
        .build()
}
