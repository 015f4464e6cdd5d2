//! The bot's own command set, wired to injected data sources.

use std::sync::Arc;

use crate::{
    cache::{CacheKey, CachedSource},
    commands::RootCommand,
    error::DefinitionError,
    executor::CommandRegistry,
    sources::{
        ChatRequest, ChatResponse, DataSource, EarningsEntry, EarningsRequest, Financials,
        FinancialsRequest, GatewayStats, GatewayStatsRequest, IndicatorRequest, IndicatorSeries,
        ModelInfo, ModelsRequest, Paste, PasteRequest, PlayerStats, PlayerStatsRequest, Quote,
        QuoteRequest, SearchRequest, SearchResult, TickersRequest,
    },
};

pub mod ask;
pub mod crypto;
pub mod economy;
pub mod info;
pub mod leetify;
pub mod ping;
pub mod search;
pub mod security;
mod util;

/// A shared, type-erased data source.
pub type Source<Req, Out> = Arc<dyn DataSource<Req, Output = Out>>;

/// Every external service the commands read from.
#[derive(Clone)]
pub struct Sources {
    pub quotes: Source<QuoteRequest, Quote>,
    pub tickers: Source<TickersRequest, Vec<String>>,
    pub earnings: Source<EarningsRequest, Vec<EarningsEntry>>,
    pub financials: Source<FinancialsRequest, Financials>,
    pub chat: Source<ChatRequest, ChatResponse>,
    pub models: Source<ModelsRequest, Vec<ModelInfo>>,
    pub search: Source<SearchRequest, Vec<SearchResult>>,
    pub paste: Source<PasteRequest, Paste>,
    pub indicators: Source<IndicatorRequest, IndicatorSeries>,
    pub player_stats: Source<PlayerStatsRequest, Option<PlayerStats>>,
    pub gateway: Source<GatewayStatsRequest, GatewayStats>,
}

/// Wraps `source` in a process-lifetime cache.
pub fn cached<S, Req>(source: S) -> Source<Req, S::Output>
where
    S: DataSource<Req> + 'static,
    S::Output: Clone + Sync + 'static,
    Req: CacheKey + Send + 'static,
{
    Arc::new(CachedSource::new(source))
}

pub fn commands(sources: &Sources) -> Result<Vec<RootCommand>, DefinitionError> {
    Ok(vec![
        ping::command(sources)?,
        info::command(sources)?,
        ask::command(sources)?,
        search::command(sources)?,
        security::command(sources)?,
        crypto::command(sources)?,
        economy::command(sources)?,
        leetify::command(sources)?,
    ])
}

pub fn registry(sources: &Sources) -> Result<CommandRegistry, DefinitionError> {
    CommandRegistry::new(commands(sources)?)
}
