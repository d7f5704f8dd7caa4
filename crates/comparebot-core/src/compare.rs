use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::aggregate::{ResponseStream, aggregate};
use crate::conversation::QueryRequest;
use crate::errors::CompareError;
use crate::model::{BotPair, Label};
use crate::multiplex::combine_streams;
use crate::preprocess::{bots_to_compare, preprocess_query};
use crate::provider::{ChunkSource, open_lazily};
use crate::settings::SettingsResponse;

pub(crate) struct CompareInner {
    default_source: Option<Arc<dyn ChunkSource>>,
    sources: HashMap<Label, Arc<dyn ChunkSource>>,
    default_pair: BotPair,
    settings: SettingsResponse,
}

impl CompareInner {
    fn source_for(&self, bot: &Label) -> Result<Arc<dyn ChunkSource>, CompareError> {
        self.sources
            .get(bot)
            .or(self.default_source.as_ref())
            .cloned()
            .ok_or_else(|| CompareError::SourceNotFound { bot: bot.clone() })
    }
}

/// Answers a query by streaming two bots side by side.
#[derive(Clone)]
pub struct CompareBot {
    pub(crate) inner: Arc<CompareInner>,
}

impl CompareBot {
    /// Starts a builder for registering chunk sources.
    pub fn builder() -> CompareBotBuilder {
        CompareBotBuilder::default()
    }

    /// The bots a query would be dispatched to.
    pub fn bots_for(&self, query: &QueryRequest) -> BotPair {
        bots_to_compare(&query.query, &self.inner.default_pair)
    }

    /// Capabilities advertised to the hosting platform.
    pub fn settings(&self) -> SettingsResponse {
        self.inner.settings.clone()
    }

    /// Streams the combined answer of both selected bots.
    ///
    /// Each bot gets its own preprocessed view of the conversation. Sources are
    /// opened lazily when the returned stream is first polled; a failing bot
    /// shows up as an error block in its section while the other keeps
    /// streaming. Only configuration problems (an unregistered bot, the same
    /// bot named twice) are returned as errors. An empty conversation goes to
    /// the default pair.
    pub fn get_response(&self, query: QueryRequest) -> Result<ResponseStream, CompareError> {
        let bots = self.bots_for(&query);
        info!(
            conversation_id = %query.conversation_id,
            first = %bots.first,
            second = %bots.second,
            "comparing bots"
        );

        let mut streams = Vec::with_capacity(2);
        for bot in bots.labels() {
            let source = self.inner.source_for(bot)?;
            debug!(bot = %bot, source = source.id(), "routing bot");
            let request = preprocess_query(&query, bot);
            streams.push((bot.clone(), open_lazily(source, bot.clone(), request)));
        }

        let events = combine_streams(streams)?;
        Ok(aggregate(events))
    }
}

/// Builder used to register chunk sources before creating a `CompareBot`.
#[derive(Default)]
pub struct CompareBotBuilder {
    default_source: Option<Arc<dyn ChunkSource>>,
    sources: Vec<(Label, Arc<dyn ChunkSource>)>,
    default_pair: Option<BotPair>,
    settings: Option<SettingsResponse>,
}

impl CompareBotBuilder {
    /// Source used for every bot without a dedicated registration.
    pub fn default_source(mut self, source: Arc<dyn ChunkSource>) -> Self {
        self.default_source = Some(source);
        self
    }

    /// Routes one bot to a dedicated source.
    pub fn register_source(mut self, bot: impl Into<Label>, source: Arc<dyn ChunkSource>) -> Self {
        self.sources.push((bot.into(), source));
        self
    }

    /// Bots compared when the conversation names none.
    pub fn default_pair(mut self, pair: BotPair) -> Self {
        self.default_pair = Some(pair);
        self
    }

    /// Overrides the advertised settings.
    pub fn settings(mut self, settings: SettingsResponse) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Builds the bot, rejecting duplicate registrations and empty routing.
    pub fn build(self) -> Result<CompareBot, CompareError> {
        let mut sources: HashMap<Label, Arc<dyn ChunkSource>> = HashMap::new();
        for (bot, source) in self.sources {
            if sources.contains_key(&bot) {
                return Err(CompareError::Config(format!(
                    "duplicate source registration for bot: {bot}"
                )));
            }
            sources.insert(bot, source);
        }
        if self.default_source.is_none() && sources.is_empty() {
            return Err(CompareError::Config(
                "at least one chunk source must be registered".into(),
            ));
        }
        Ok(CompareBot {
            inner: Arc::new(CompareInner {
                default_source: self.default_source,
                sources,
                default_pair: self.default_pair.unwrap_or_default(),
                settings: self.settings.unwrap_or_default(),
            }),
        })
    }
}
