use async_trait::async_trait;
use futures::future::try_join_all;
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::{
    commands::{CommandHandler, RootCommand, SubCommand},
    error::DefinitionError,
    executor::CommandContext,
    sources::{Indicator, IndicatorRequest, IndicatorSeries},
};

use super::{Source, Sources, util};

const OVERVIEW: [Indicator; 3] = [Indicator::Cpi, Indicator::RealGdp, Indicator::RealGdpPerCapita];

pub struct Overview {
    indicators: Source<IndicatorRequest, IndicatorSeries>,
}

#[async_trait]
impl CommandHandler for Overview {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let requests = OVERVIEW
            .into_iter()
            .map(|indicator| self.indicators.fetch(IndicatorRequest { indicator }));

        match try_join_all(requests).await {
            Ok(series) => ctx.reply_embed(overview_embed(&series)).await,
            Err(err) => util::source_failure(ctx, "economic indicators", &err).await,
        }
    }
}

fn overview_embed(series: &[IndicatorSeries]) -> Embed {
    series
        .iter()
        .fold(
            EmbedBuilder::new()
                .title("Economic Overview")
                .color(util::BLURPLE),
            |embed, series| {
                let latest = series.data.first().map_or_else(
                    || "No data".to_string(),
                    |point| format!("{} {} ({})", point.value, series.unit, point.date),
                );
                embed.field(EmbedFieldBuilder::new(series.name.clone(), latest).inline())
            },
        )
        .build()
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    let overview = SubCommand::builder("overview", "Allows you to see the overview of the economy.")
        .deferred_reply(true)
        .handler(Overview {
            indicators: sources.indicators.clone(),
        })
        .build()?;

    RootCommand::builder("economy", "Allows you to see the state of the economy")
        .child(overview)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::IndicatorPoint;

    #[test]
    fn shows_latest_point_per_series() {
        let series = vec![
            IndicatorSeries {
                name: "Consumer Price Index".to_string(),
                unit: "index 1982-1984=100".to_string(),
                data: vec![
                    IndicatorPoint {
                        date: "2024-04-01".to_string(),
                        value: 313.5,
                    },
                    IndicatorPoint {
                        date: "2024-03-01".to_string(),
                        value: 312.3,
                    },
                ],
            },
            IndicatorSeries {
                name: "Real GDP".to_string(),
                unit: "billions of dollars".to_string(),
                data: Vec::new(),
            },
        ];

        let embed = overview_embed(&series);
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].value, "313.5 index 1982-1984=100 (2024-04-01)");
        assert_eq!(embed.fields[1].value, "No data");
    }
}
