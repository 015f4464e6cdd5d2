use std::time::Duration;

use tracing::{error, warn};
use twilight_model::{
    application::command::{CommandOptionChoice, CommandOptionChoiceValue},
    channel::message::Embed,
};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder};

use crate::{
    executor::{AutocompleteContext, CommandContext},
    sources::{FetchError, ModelInfo, ModelsRequest, Paste, PasteRequest, Quote},
};

use super::Source;

/// Longest plain message the platform accepts.
pub const MESSAGE_LIMIT: usize = 2000;

pub const RED: u32 = 0xE74C3C;
pub const GREEN: u32 = 0x2ECC71;
pub const BLURPLE: u32 = 0x5865F2;

pub const CHAT_SYSTEM_PROMPT: &str = "You are a friendly AI that is here to help to answer questions. \
Just a reminder you are responding in the context of a discord. So format your messages accordingly.";

/// Replies with an error container describing a failed lookup.
pub async fn source_failure(
    ctx: &mut CommandContext,
    what: &str,
    err: &FetchError,
) -> anyhow::Result<()> {
    warn!(error = ?err, path = %ctx.command_path(), "fetching {what} failed");
    ctx.reply_error(
        &format!("An error occurred while trying to get {what}."),
        &err.to_string(),
    )
    .await
}

/// Sends `content` as-is when it fits, otherwise uploads it and links it.
pub async fn reply_with_overflow(
    ctx: &mut CommandContext,
    paste: &Source<PasteRequest, Paste>,
    content: String,
) -> anyhow::Result<()> {
    if content.chars().count() <= MESSAGE_LIMIT {
        return ctx.reply_message(content).await;
    }

    match paste.fetch(PasteRequest { content }).await {
        Ok(paste) => {
            ctx.reply_message(format!(
                "The response was too long, so it has been uploaded to pastecord: {}",
                paste.url()
            ))
            .await
        }
        Err(err) => {
            error!(error = ?err, "uploading overflow failed");
            ctx.reply_message("An error occurred while trying to upload the response to pastecord.")
                .await
        }
    }
}

pub async fn suggest_models(
    ctx: &mut AutocompleteContext,
    models: &Source<ModelsRequest, Vec<ModelInfo>>,
) -> anyhow::Result<()> {
    let choices = models
        .fetch(ModelsRequest)
        .await?
        .into_iter()
        .map(|model| CommandOptionChoice {
            name: model.name,
            name_localizations: None,
            value: CommandOptionChoiceValue::String(model.id),
        })
        .collect();
    ctx.suggest(choices).await
}

pub fn requested_by(ctx: &CommandContext) -> EmbedFooterBuilder {
    EmbedFooterBuilder::new(format!("Requested by {}", ctx.caller().name))
}

/// Price card shared by securities and crypto.
pub fn quote_embed(symbol: &str, quote: &Quote) -> Embed {
    let change = quote
        .change_percent()
        .map_or_else(|| "N/A".to_string(), |change| format!("{change:+.2}%"));

    EmbedBuilder::new()
        .title(format!("The price of {symbol} is {:.2}", quote.close))
        .description(quote.name.clone())
        .color(if quote.is_up() { GREEN } else { RED })
        .field(EmbedFieldBuilder::new("Open", format!("{:.2}", quote.open)).inline())
        .field(EmbedFieldBuilder::new("High", format!("{:.2}", quote.high)).inline())
        .field(EmbedFieldBuilder::new("Low", format!("{:.2}", quote.low)).inline())
        .field(EmbedFieldBuilder::new("Volume", quote.volume.to_string()).inline())
        .field(EmbedFieldBuilder::new("Change", change).inline())
        .field(EmbedFieldBuilder::new("Date", quote.datetime.clone()).inline())
        .build()
}

pub fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |value| value.to_string())
}

/// `1 days, 2 hours, 5 seconds`; zero units are skipped.
pub fn human_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let parts = [
        (secs / 86_400, "days"),
        (secs % 86_400 / 3_600, "hours"),
        (secs % 3_600 / 60, "minutes"),
        (secs % 60, "seconds"),
    ];

    let text = parts
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| format!("{amount} {unit}"))
        .collect::<Vec<_>>()
        .join(", ");

    if text.is_empty() {
        "0 seconds".to_string()
    } else {
        text
    }
}
