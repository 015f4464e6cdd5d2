use std::{env::consts, time::Instant};

use async_trait::async_trait;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::{
    commands::{CommandHandler, RootCommand},
    error::DefinitionError,
    executor::CommandContext,
    sources::{GatewayStats, GatewayStatsRequest},
};

use super::{Source, Sources, util};

pub struct BotInfo {
    gateway: Source<GatewayStatsRequest, GatewayStats>,
    started: Instant,
}

#[async_trait]
impl CommandHandler for BotInfo {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let stats = match self.gateway.fetch(GatewayStatsRequest).await {
            Ok(stats) => stats,
            Err(err) => return util::source_failure(ctx, "bot statistics", &err).await,
        };

        let embed = EmbedBuilder::new()
            .title("Daymon Information")
            .color(util::BLURPLE)
            .field(EmbedFieldBuilder::new("Version", env!("CARGO_PKG_VERSION")))
            .field(EmbedFieldBuilder::new(
                "Host OS",
                format!("{} ({})", consts::OS, consts::ARCH),
            ))
            .field(EmbedFieldBuilder::new(
                "Guild Count",
                stats.guild_count.to_string(),
            ))
            .field(EmbedFieldBuilder::new("User Count", stats.user_count.to_string()))
            .field(EmbedFieldBuilder::new(
                "Uptime",
                util::human_duration(self.started.elapsed()),
            ))
            .build();

        ctx.reply_embed(embed).await
    }
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    RootCommand::builder("botinfo", "Shows bot information")
        .handler(BotInfo {
            gateway: sources.gateway.clone(),
            started: Instant::now(),
        })
        .build()
}
