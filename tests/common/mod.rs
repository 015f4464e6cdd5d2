//! Shared fixtures: a responder that records every outbound call and data
//! sources that hand back canned values.

#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use daymon::{
    bot::{self, Source, Sources},
    executor::{Caller, CommandPath, InteractionEvent, InteractionKind, InteractionResponder},
    sources::{
        ChatRequest, ChatResponse, DataSource, EarningsEntry, EarningsRequest, FetchError,
        Financials, FinancialsRequest, GatewayStats, GatewayStatsRequest, IndicatorRequest,
        IndicatorSeries, ModelInfo, ModelsRequest, Paste, PasteRequest, PlayerStats,
        PlayerStatsRequest, Quote, QuoteRequest, SearchRequest, SearchResult, TickersRequest,
    },
};
use twilight_model::{
    application::{
        command::CommandOptionChoice,
        interaction::application_command::{CommandDataOption, CommandOptionValue},
    },
    guild::Permissions,
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
    id::Id,
};

#[derive(Debug, Clone)]
pub enum Sent {
    Defer,
    Create(InteractionResponseData),
    Update(InteractionResponseData),
    Followup(InteractionResponseData),
    Autocomplete(Vec<CommandOptionChoice>),
}

impl Sent {
    pub fn data(&self) -> Option<&InteractionResponseData> {
        match self {
            Sent::Create(data) | Sent::Update(data) | Sent::Followup(data) => Some(data),
            Sent::Defer | Sent::Autocomplete(_) => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        self.data().and_then(|data| data.content.as_deref())
    }
}

#[derive(Default)]
pub struct RecordingResponder {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingResponder {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl InteractionResponder for RecordingResponder {
    async fn create_response(&self, response: InteractionResponse) -> anyhow::Result<()> {
        let sent = match (response.kind, response.data) {
            (InteractionResponseType::DeferredChannelMessageWithSource, _) => Sent::Defer,
            (InteractionResponseType::ApplicationCommandAutocompleteResult, data) => {
                Sent::Autocomplete(data.and_then(|data| data.choices).unwrap_or_default())
            }
            (_, data) => Sent::Create(data.unwrap_or_default()),
        };
        self.push(sent);
        Ok(())
    }

    async fn update_response(&self, data: InteractionResponseData) -> anyhow::Result<()> {
        self.push(Sent::Update(data));
        Ok(())
    }

    async fn create_followup(&self, data: InteractionResponseData) -> anyhow::Result<()> {
        self.push(Sent::Followup(data));
        Ok(())
    }
}

/// Returns a fixed value and remembers every request it was asked for.
pub struct Fake<Req, T> {
    value: Result<T, &'static str>,
    requests: Mutex<Vec<Req>>,
}

impl<Req, T> Fake<Req, T> {
    pub fn ok(value: T) -> Arc<Self> {
        Arc::new(Fake {
            value: Ok(value),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(service: &'static str) -> Arc<Self> {
        Arc::new(Fake {
            value: Err(service),
            requests: Mutex::new(Vec::new()),
        })
    }
}

impl<Req: Clone, T> Fake<Req, T> {
    pub fn requests(&self) -> Vec<Req> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl<Req, T> DataSource<Req> for Fake<Req, T>
where
    Req: Send + 'static,
    T: Clone + Send + Sync,
{
    type Output = T;

    async fn fetch(&self, request: Req) -> Result<T, FetchError> {
        self.requests.lock().unwrap().push(request);
        match &self.value {
            Ok(value) => Ok(value.clone()),
            Err(service) => Err(FetchError::Status {
                service: *service,
                status: 503,
            }),
        }
    }
}

pub fn apple_quote() -> Quote {
    Quote {
        symbol: "AAPL".to_string(),
        name: "Apple Inc".to_string(),
        open: 170.0,
        high: 175.5,
        low: 169.2,
        close: 174.3,
        volume: 52_000_000,
        previous_close: 171.0,
        datetime: "2024-05-01".to_string(),
    }
}

pub fn models() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            id: "openai/gpt-4o".to_string(),
            name: "GPT-4o".to_string(),
        },
        ModelInfo {
            id: "anthropic/claude-3.5-sonnet".to_string(),
            name: "Claude 3.5 Sonnet".to_string(),
        },
    ]
}

/// Every source answers with something reasonable; tests override fields.
pub fn sources() -> Sources {
    Sources {
        quotes: Fake::<QuoteRequest, _>::ok(apple_quote()),
        tickers: bot::cached(Fake::<TickersRequest, Vec<String>>::ok(vec![
            "AAPL".to_string(),
            "AAL".to_string(),
            "MSFT".to_string(),
        ])),
        earnings: Fake::<EarningsRequest, Vec<EarningsEntry>>::ok(Vec::new()),
        financials: Fake::<FinancialsRequest, Financials>::failing("yahoo"),
        chat: Fake::<ChatRequest, ChatResponse>::failing("openrouter"),
        models: bot::cached(Fake::<ModelsRequest, Vec<ModelInfo>>::ok(models())),
        search: Fake::<SearchRequest, Vec<SearchResult>>::ok(Vec::new()),
        paste: Fake::<PasteRequest, _>::ok(Paste {
            key: "abc123".to_string(),
        }),
        indicators: Fake::<IndicatorRequest, IndicatorSeries>::failing("alphavantage"),
        player_stats: Fake::<PlayerStatsRequest, Option<PlayerStats>>::ok(None),
        gateway: Fake::<GatewayStatsRequest, _>::ok(GatewayStats {
            gateway_latency: Some(Duration::from_millis(42)),
            rest_latency: Duration::from_millis(120),
            guild_count: 3,
            user_count: 250,
        }),
    }
}

pub fn source<Req, T>(fake: &Arc<Fake<Req, T>>) -> Source<Req, T>
where
    Req: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fake.clone()
}

pub fn string(name: &str, value: &str) -> CommandDataOption {
    CommandDataOption {
        name: name.to_string(),
        value: CommandOptionValue::String(value.to_string()),
    }
}

pub fn focused(name: &str, value: &str) -> CommandDataOption {
    CommandDataOption {
        name: name.to_string(),
        value: CommandOptionValue::Focused(
            value.to_string(),
            twilight_model::application::command::CommandOptionType::String,
        ),
    }
}

/// An event from a guild member with no special permissions, to a bot that
/// can send messages and embeds.
pub fn event(
    kind: InteractionKind,
    path: CommandPath,
    options: Vec<CommandDataOption>,
    responder: Arc<RecordingResponder>,
) -> InteractionEvent {
    let caller = Caller {
        id: Id::new(7),
        name: "trader".to_string(),
        permissions: Permissions::SEND_MESSAGES,
    };
    let mut event = InteractionEvent::new(kind, path, caller, responder);
    event.options = options;
    event.guild_id = Some(Id::new(1));
    event.channel_id = Some(Id::new(2));
    event.bot_permissions = Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS;
    event
}
