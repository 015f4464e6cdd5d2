//! Contract for the external services command handlers read from, plus the
//! request and response shapes each service exchanges.
//!
//! Implementations live outside this crate. Retry policy, if any, belongs to
//! the implementation; the core never retries a fetch.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// One asynchronous lookup against an external service.
#[async_trait]
pub trait DataSource<Req: Send + 'static>: Send + Sync {
    type Output: Send;

    async fn fetch(&self, request: Req) -> Result<Self::Output, FetchError>;
}

#[async_trait]
impl<Req, S> DataSource<Req> for Arc<S>
where
    Req: Send + 'static,
    S: DataSource<Req> + ?Sized,
{
    type Output = S::Output;

    async fn fetch(&self, request: Req) -> Result<S::Output, FetchError> {
        (**self).fetch(request).await
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("could not reach {service}: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("unexpected response from {service}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} was not found")]
    NotFound(String),
}

/// Parses a JSON body, tagging failures with the service name.
pub fn decode_json<T: DeserializeOwned>(service: &'static str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Decode { service, source })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuoteRequest {
    pub symbol: String,
    /// Candle width such as `1day`.
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub previous_close: f64,
    pub datetime: String,
}

impl Quote {
    pub fn is_up(&self) -> bool {
        self.close >= self.previous_close
    }

    /// Percent move from the previous close.
    pub fn change_percent(&self) -> Option<f64> {
        (self.previous_close != 0.0)
            .then(|| (self.close - self.previous_close) / self.previous_close * 100.0)
    }
}

/// Every listed ticker symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickersRequest;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EarningsRequest {
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsEntry {
    pub date: String,
    pub time: String,
    pub eps_estimate: Option<f64>,
    pub eps_actual: Option<f64>,
    pub surprise_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FinancialsRequest {
    pub symbol: String,
}

/// Raw statement tables, amounts in thousands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Financials {
    pub cash_flow: String,
    pub income_statement: String,
    pub balance_sheet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// First choice's content; `None` when the model returned nothing.
    pub content: Option<String>,
}

/// Models the chat service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelsRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub key: String,
}

impl Paste {
    pub fn url(&self) -> String {
        format!("https://pastecord.com/{}", self.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    Cpi,
    RealGdp,
    RealGdpPerCapita,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorRequest {
    pub indicator: Indicator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub unit: String,
    /// Newest first.
    pub data: Vec<IndicatorPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerStatsRequest {
    pub steam_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRatings {
    pub aim: Option<f64>,
    pub positioning: Option<f64>,
    pub utility: Option<f64>,
    pub games_played: Option<u32>,
    pub clutch: Option<f64>,
    pub leetify: Option<f64>,
    pub opening: Option<f64>,
    pub t_leetify: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub name: String,
    pub steam_avatar_url: Option<String>,
    pub recent_game_ratings: PlayerRatings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GatewayStatsRequest;

/// Connection health and reach of the running bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayStats {
    /// `None` until the first heartbeat is acknowledged.
    pub gateway_latency: Option<Duration>,
    pub rest_latency: Duration,
    pub guild_count: u64,
    pub user_count: u64,
}
