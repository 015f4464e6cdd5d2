//! `security price | financials | earnings`.

use async_trait::async_trait;
use twilight_model::{channel::message::Embed, guild::Permissions};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};

use crate::{
    Arguments, Choices,
    arguments::ToOption,
    commands::{CommandHandler, RootCommand, SubCommand},
    error::DefinitionError,
    executor::{AutocompleteContext, CommandContext},
    options::{OptionDescriptor, SemanticType},
    sources::{
        ChatMessage, ChatRequest, ChatResponse, EarningsEntry, EarningsRequest, Financials,
        FinancialsRequest, ModelInfo, ModelsRequest, Paste, PasteRequest, Quote, QuoteRequest,
        TickersRequest,
    },
};

use super::{Source, Sources, ask, util};

const MAX_EARNINGS_ROWS: usize = 10;

const FINANCIALS_SYSTEM_PROMPT: &str = "You are a friendly AI that is here to help to answer questions about a security's financials. \
Just a reminder you are responding in the context of a discord. So format your messages accordingly. \
Do not make anything up. \
All the numbers you see are in thousands, keep that in mind when you are looking at the financials. \
If the user uses any words like \"it\" or \"they\", they are referring to the security in question. \
Always cite where you got your information using numbered footnotes.";

/// Candle width used for the quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Choices)]
pub enum Interval {
    #[choice(name = "1 minute", value = "1min")]
    Minute,
    #[choice(name = "1 hour", value = "1h")]
    Hour,
    #[choice(name = "1 day", value = "1day")]
    Day,
    #[choice(name = "1 week", value = "1week")]
    Week,
    #[choice(name = "1 month", value = "1month")]
    Month,
}

#[derive(Debug, Arguments)]
pub struct PriceArgs {
    pub security_symbol: String,
    pub interval: Option<Interval>,
}

pub struct Price {
    quotes: Source<QuoteRequest, Quote>,
}

#[async_trait]
impl CommandHandler for Price {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let args = ctx.arguments::<PriceArgs>()?;
        let symbol = args.security_symbol.to_uppercase();
        let request = QuoteRequest {
            symbol: symbol.clone(),
            interval: args.interval.unwrap_or(Interval::Day).as_value().to_string(),
        };

        match self.quotes.fetch(request).await {
            Ok(quote) => ctx.reply_embed(util::quote_embed(&symbol, &quote)).await,
            Err(err) => util::source_failure(ctx, &format!("a quote for {symbol}"), &err).await,
        }
    }
}

pub struct AskFinancials {
    financials: Source<FinancialsRequest, Financials>,
    chat: Source<ChatRequest, ChatResponse>,
    tickers: Source<TickersRequest, Vec<String>>,
    models: Source<ModelsRequest, Vec<ModelInfo>>,
    paste: Source<PasteRequest, Paste>,
}

#[async_trait]
impl CommandHandler for AskFinancials {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let symbol = ctx.option::<String>("security_symbol")?.to_uppercase();
        let model: String = ctx.option("model")?;
        let prompt: String = ctx.option("prompt")?;

        let financials = match self
            .financials
            .fetch(FinancialsRequest {
                symbol: symbol.clone(),
            })
            .await
        {
            Ok(financials) => financials,
            Err(err) => {
                return util::source_failure(ctx, &format!("financials for {symbol}"), &err).await;
            }
        };

        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage::system(FINANCIALS_SYSTEM_PROMPT),
                ChatMessage::user(financials_prompt(&symbol, &financials, &prompt)),
            ],
        };
        let content = match self.chat.fetch(request).await {
            Ok(ChatResponse {
                content: Some(content),
            }) => content,
            Ok(ChatResponse { content: None }) => {
                return ctx
                    .reply_error(
                        "An error occurred while trying to get a response.",
                        "The model returned an empty response.",
                    )
                    .await;
            }
            Err(err) => return util::source_failure(ctx, "a response", &err).await,
        };

        util::reply_with_overflow(ctx, &self.paste, content).await
    }

    async fn autocomplete(&self, ctx: &mut AutocompleteContext) -> anyhow::Result<()> {
        match ctx.focused_option() {
            Some("security_symbol") => {
                let tickers = self.tickers.fetch(TickersRequest).await?;
                ctx.suggest_strings(tickers).await
            }
            Some("model") => util::suggest_models(ctx, &self.models).await,
            _ => Ok(()),
        }
    }
}

fn financials_prompt(symbol: &str, financials: &Financials, prompt: &str) -> String {
    format!(
        "The financials for {symbol} are as follows:\n\n\
         Cash Flow\n{}\n\n\
         Income Statement\n{}\n\n\
         Balance Sheet\n{}\n\n\
         User Prompt:\n{prompt}",
        financials.cash_flow, financials.income_statement, financials.balance_sheet
    )
}

pub struct Earnings {
    earnings: Source<EarningsRequest, Vec<EarningsEntry>>,
}

#[async_trait]
impl CommandHandler for Earnings {
    async fn execute(&self, ctx: &mut CommandContext) -> anyhow::Result<()> {
        let symbol = ctx.option::<String>("security_symbol")?.to_uppercase();
        let entries = match self
            .earnings
            .fetch(EarningsRequest {
                symbol: symbol.clone(),
            })
            .await
        {
            Ok(entries) => entries,
            Err(err) => {
                return util::source_failure(ctx, &format!("earnings for {symbol}"), &err).await;
            }
        };

        if entries.is_empty() {
            return ctx
                .reply_message(format!("No earnings data found for {symbol}."))
                .await;
        }
        ctx.reply_embed(earnings_embed(&symbol, &entries)).await
    }
}

fn earnings_embed(symbol: &str, entries: &[EarningsEntry]) -> Embed {
    entries
        .iter()
        .take(MAX_EARNINGS_ROWS)
        .fold(
            EmbedBuilder::new()
                .title(format!("Earnings calendar for {symbol}"))
                .color(util::BLURPLE),
            |embed, entry| {
                let surprise = entry
                    .surprise_percent
                    .map(|surprise| format!("{surprise:+.2}%"));
                embed.field(EmbedFieldBuilder::new(
                    format!("{} ({})", entry.date, entry.time),
                    format!(
                        "EPS estimate: {} | actual: {} | surprise: {}",
                        util::or_na(entry.eps_estimate),
                        util::or_na(entry.eps_actual),
                        util::or_na(surprise),
                    ),
                ))
            },
        )
        .build()
}

fn symbol_option(description: &str) -> OptionDescriptor {
    OptionDescriptor::new(SemanticType::String)
        .name("security_symbol")
        .description(description)
}

pub fn command(sources: &Sources) -> Result<RootCommand, DefinitionError> {
    let price = SubCommand::builder("price", "Gives a price of a given security")
        .deferred_reply(true)
        .bot_permissions(Permissions::EMBED_LINKS)
        .option(symbol_option("Security you want to get a price of"))
        .option(
            Option::<Interval>::to_option()
                .name("interval")
                .description("Candle interval of the quote"),
        )
        .handler(Price {
            quotes: sources.quotes.clone(),
        })
        .build()?;

    let financials = SubCommand::builder(
        "financials",
        "Uses an LLM to answer your question about a security's financials.",
    )
    .deferred_reply(true)
    .option(symbol_option("The security you want to get financials for").autocomplete(true))
    .option(ask::model_option())
    .option(ask::prompt_option())
    .handler(AskFinancials {
        financials: sources.financials.clone(),
        chat: sources.chat.clone(),
        tickers: sources.tickers.clone(),
        models: sources.models.clone(),
        paste: sources.paste.clone(),
    })
    .build()?;

    let earnings = SubCommand::builder("earnings", "Gives a earnings calendar of a given security")
        .deferred_reply(true)
        .bot_permissions(Permissions::EMBED_LINKS)
        .option(symbol_option("Security you want to get earnings of"))
        .handler(Earnings {
            earnings: sources.earnings.clone(),
        })
        .build()?;

    RootCommand::builder("security", "Allows you to see the price of a security")
        .child(price)
        .child(financials)
        .child(earnings)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::{Arguments as _, OptionMap};
    use crate::options::OptionValue;

    #[test]
    fn price_arguments_default_interval() {
        let options: OptionMap = [(
            "security_symbol".to_string(),
            OptionValue::String("aapl".to_string()),
        )]
        .into_iter()
        .collect();
        let args = PriceArgs::from_options(&options).unwrap();
        assert_eq!(args.security_symbol, "aapl");
        assert_eq!(args.interval, None);
    }

    #[test]
    fn interval_option_lists_every_choice() {
        let option = Option::<Interval>::to_option();
        assert!(!option.required);
        assert_eq!(option.choices.len(), 5);
        assert_eq!(Interval::Week.as_value(), "1week");
    }

    #[test]
    fn earnings_embed_caps_rows() {
        let entries: Vec<EarningsEntry> = (0..15)
            .map(|day| EarningsEntry {
                date: format!("2024-01-{:02}", day + 1),
                time: "After Hours".to_string(),
                eps_estimate: Some(1.5),
                eps_actual: None,
                surprise_percent: None,
            })
            .collect();
        let embed = earnings_embed("AAPL", &entries);
        assert_eq!(embed.fields.len(), MAX_EARNINGS_ROWS);
        assert_eq!(
            embed.fields[0].value,
            "EPS estimate: 1.5 | actual: N/A | surprise: N/A"
        );
    }

    #[test]
    fn financials_prompt_embeds_statements() {
        let financials = Financials {
            cash_flow: "CF".to_string(),
            income_statement: "IS".to_string(),
            balance_sheet: "BS".to_string(),
        };
        let prompt = financials_prompt("MSFT", &financials, "Is it profitable?");
        assert!(prompt.starts_with("The financials for MSFT are as follows:"));
        assert!(prompt.contains("Income Statement\nIS"));
        assert!(prompt.ends_with("User Prompt:\nIs it profitable?"));
    }
}
