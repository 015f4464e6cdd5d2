use async_trait::async_trait;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::{
    commands::{CommandHandler, RootCommand},
    error::DefinitionError,
    executor::CommandContext,
    sources::{GatewayStats, GatewayStatsRequest},
};

use super::{Source, Sources, util};

pub struct Ping {
    gateway: Source<GatewayStatsRequest, GatewayStats>,
}

#[async_trait]
impl CommandHandler for Ping {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let stats = match self.gateway.fetch(GatewayStatsRequest).await {
            Ok(stats) => stats,
            Err(err) => return util::source_failure(ctx, "latency", &err).await,
        };

        let gateway = stats.gateway_latency.map_or_else(
            || "N/A".to_string(),
            |latency| format!("{} ms", latency.as_millis()),
        );
        let embed = EmbedBuilder::new()
            .color(util::BLURPLE)
            .field(EmbedFieldBuilder::new("Gateway Ping", gateway))
            .field(EmbedFieldBuilder::new(
                "Rest Ping",
                format!("{} ms", stats.rest_latency.as_millis()),
            ))
            .build();

        ctx.reply_embed(embed).await
    }
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    RootCommand::builder("ping", "Responds with pong.")
        .handler(Ping {
            gateway: sources.gateway.clone(),
        })
        .build()
}
