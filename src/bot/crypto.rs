use async_trait::async_trait;
use twilight_model::guild::Permissions;

use crate::{
    commands::{CommandHandler, RootCommand, SubCommand},
    error::DefinitionError,
    executor::CommandContext,
    options::{OptionDescriptor, SemanticType},
    sources::{Quote, QuoteRequest},
};

use super::{Source, Sources, util};

pub struct CryptoPrice {
    quotes: Source<QuoteRequest, Quote>,
}

/// Crypto symbols are quoted against the US dollar.
fn usd_pair(symbol: &str) -> String {
    format!("{}/USD", symbol.trim().to_uppercase())
}

#[async_trait]
impl CommandHandler for CryptoPrice {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let pair = usd_pair(&ctx.option::<String>("crypto_symbol")?);
        let request = QuoteRequest {
            symbol: pair.clone(),
            interval: "1day".to_string(),
        };

        match self.quotes.fetch(request).await {
            Ok(quote) => ctx.reply_embed(util::quote_embed(&pair, &quote)).await,
            Err(err) => util::source_failure(ctx, &format!("a quote for {pair}"), &err).await,
        }
    }
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    let price = SubCommand::builder("price", "Gives a price of a given cryptocurrency")
        .deferred_reply(true)
        .bot_permissions(Permissions::EMBED_LINKS)
        .option(
            OptionDescriptor::new(SemanticType::String)
                .name("crypto_symbol")
                .description("Cryptocurrency you want to get a price of"),
        )
        .handler(CryptoPrice {
            quotes: sources.quotes.clone(),
        })
        .build()?;

    RootCommand::builder("crypto", "Allows you to see the price of a cryptocurrency")
        .child(price)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_symbol_with_usd() {
        assert_eq!(usd_pair(" btc "), "BTC/USD");
    }
}
