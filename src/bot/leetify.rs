use async_trait::async_trait;
use tracing::debug;
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder, ImageSource};

use crate::{
    commands::{CommandHandler, RootCommand, SubCommand},
    error::DefinitionError,
    executor::CommandContext,
    options::{OptionDescriptor, SemanticType},
    sources::{PlayerStats, PlayerStatsRequest},
};

use super::{Source, Sources, util};

pub struct Stats {
    player_stats: Source<PlayerStatsRequest, Option<PlayerStats>>,
}

#[async_trait]
impl CommandHandler for Stats {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let steam_id: String = ctx.option("steam_id")?;

        match self.player_stats.fetch(PlayerStatsRequest { steam_id }).await {
            Ok(Some(stats)) => ctx.reply_embed(stats_embed(&stats)).await,
            Ok(None) => {
                ctx.reply_message("Could not find stats for this user.")
                    .await
            }
            Err(err) => util::source_failure(ctx, "player stats", &err).await,
        }
    }
}

fn stats_embed(stats: &PlayerStats) -> Embed {
    let ratings = &stats.recent_game_ratings;
    let fields = [
        ("Aim", util::or_na(ratings.aim)),
        ("Positioning", util::or_na(ratings.positioning)),
        ("Utility", util::or_na(ratings.utility)),
        ("Games Played", util::or_na(ratings.games_played)),
        ("Clutch", util::or_na(ratings.clutch)),
        ("Leetify Rating", util::or_na(ratings.leetify)),
        ("Opening", util::or_na(ratings.opening)),
        ("T Leetify", util::or_na(ratings.t_leetify)),
    ];

    let mut embed = EmbedBuilder::new()
        .title(format!("{}'s stats", stats.name))
        .description(format!("Here are some stats for {}", stats.name))
        .color(util::BLURPLE);

    if let Some(avatar) = &stats.steam_avatar_url {
        match ImageSource::url(avatar) {
            Ok(source) => embed = embed.thumbnail(source),
            Err(err) => debug!(error = ?err, "skipping invalid avatar url"),
        }
    }

    fields
        .into_iter()
        .fold(embed, |embed, (name, value)| {
            embed.field(EmbedFieldBuilder::new(name, value).inline())
        })
        .build()
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    let stats = SubCommand::builder("stats", "Leetify stats")
        .option(
            OptionDescriptor::new(SemanticType::String)
                .name("steam_id")
                .description("Steam ID of the user you want to get stats for"),
        )
        .handler(Stats {
            player_stats: sources.player_stats.clone(),
        })
        .build()?;

    RootCommand::builder("leetify", "Counter-Strike stats from Leetify")
        .child(stats)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::PlayerRatings;

    #[test]
    fn missing_ratings_render_as_na() {
        let stats = PlayerStats {
            name: "s1mple".to_string(),
            steam_avatar_url: Some("https://avatars.steamstatic.com/abc.jpg".to_string()),
            recent_game_ratings: PlayerRatings {
                aim: Some(91.5),
                ..PlayerRatings::default()
            },
        };

        let embed = stats_embed(&stats);
        assert_eq!(embed.title.as_deref(), Some("s1mple's stats"));
        assert_eq!(embed.fields.len(), 8);
        assert_eq!(embed.fields[0].value, "91.5");
        assert_eq!(embed.fields[1].value, "N/A");
        assert!(embed.thumbnail.is_some());
    }
}
