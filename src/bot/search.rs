use async_trait::async_trait;
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::{
    commands::{CommandHandler, RootCommand},
    error::DefinitionError,
    executor::CommandContext,
    options::{OptionDescriptor, SemanticType},
    sources::{SearchRequest, SearchResult},
};

use super::{Source, Sources, util};

const MAX_QUERY_LEN: usize = 100;
const MAX_RESULTS: usize = 5;
const BANNED_WORDS: &[&str] = &["porn", "p0rn"];

pub struct Search {
    search: Source<SearchRequest, Vec<SearchResult>>,
}

impl Search {
    async fn reply_notice(ctx: &mut CommandContext, title: &str, description: &str) -> anyhow::Result<()> {
        let mut embed = EmbedBuilder::new()
            .title(title)
            .description(description)
            .color(util::RED)
            .footer(util::requested_by(ctx));
        if let Some(created_at) = ctx.created_at() {
            embed = embed.timestamp(created_at);
        }
        ctx.reply_embed(embed.build()).await
    }
}

#[async_trait]
impl CommandHandler for Search {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let query: String = match ctx.option("query") {
            Ok(query) => query,
            Err(err) => return Self::reply_notice(ctx, "Invalid query", &err.to_string()).await,
        };
        if let Err(reason) = check_query(&query) {
            return Self::reply_notice(ctx, "Invalid query", reason).await;
        }

        let results = match self.search.fetch(SearchRequest { query }).await {
            Ok(results) => results,
            Err(err) => return util::source_failure(ctx, "search results", &err).await,
        };
        if results.is_empty() {
            return Self::reply_notice(
                ctx,
                "No results found",
                "No results were found for the given query.",
            )
            .await;
        }

        let embeds = results.iter().take(MAX_RESULTS).map(result_embed).collect();
        ctx.reply_embeds(embeds).await
    }
}

fn check_query(query: &str) -> Result<(), &'static str> {
    if query.trim().is_empty() {
        return Err("Query is blank");
    }
    let lowered = query.to_lowercase();
    if BANNED_WORDS.iter().any(|word| lowered.contains(word)) {
        return Err("Query contains banned words");
    }
    Ok(())
}

fn result_embed(result: &SearchResult) -> Embed {
    let title = if result.title.is_empty() {
        "No title"
    } else {
        result.title.as_str()
    };
    EmbedBuilder::new()
        .title(title)
        .url(result.url.clone())
        .field(EmbedFieldBuilder::new("Snippet", result.snippet.clone()))
        .build()
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    let query = OptionDescriptor::new(SemanticType::String)
        .name("query")
        .description("The query you want to search for")
        .validator(
            |value| {
                value
                    .as_str()
                    .is_some_and(|query| (1..=MAX_QUERY_LEN).contains(&query.chars().count()))
            },
            "Query must be between 1 and 100 characters",
        );

    RootCommand::builder("search", "Searches for a given query on the internet")
        .deferred_reply(true)
        .option(query)
        .handler(Search {
            search: sources.search.clone(),
        })
        .build()
}
