use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::conversation::QueryRequest;
use crate::errors::{CompareError, SourceError};
use crate::model::Label;
use crate::provider::{Chunk, ChunkSource, ChunkStream};

use super::config::{PROTOCOL_VERSION, PoeClientConfig};
use super::options::PoeRequestOptions;
use super::transport::{FrameAction, SseDecoder, map_poe_frame};

const POE_SOURCE: &str = "poe";

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Chunk source speaking the bot server protocol (streaming).
pub struct PoeSource {
    client: reqwest::Client,
    config: PoeClientConfig,
    options: PoeRequestOptions,
}

impl PoeSource {
    /// Creates a source from explicit client configuration.
    pub fn new(config: PoeClientConfig) -> Result<Self, CompareError> {
        if config.api_key.trim().is_empty() {
            return Err(CompareError::Config(
                "bot protocol api_key must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompareError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            options: PoeRequestOptions::default(),
        })
    }

    /// Creates a source using `POE_API_KEY`.
    pub fn from_env() -> Result<Self, CompareError> {
        Self::new(PoeClientConfig::from_env()?)
    }

    /// Sets the generation options sent with every query.
    pub fn with_options(mut self, options: PoeRequestOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait::async_trait]
impl ChunkSource for PoeSource {
    fn id(&self) -> &str {
        POE_SOURCE
    }

    async fn open(&self, bot: &Label, request: QueryRequest) -> Result<ChunkStream, SourceError> {
        let body = build_request_body(bot, &request, &self.options)?;
        debug!(
            bot = %bot,
            conversation_id = %request.conversation_id,
            messages = request.query.len(),
            "opening bot stream"
        );

        let response = self
            .client
            .post(self.config.bot_url(bot.as_str()))
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::transport(bot.clone(), format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SourceError::Bot {
                bot: bot.clone(),
                message: format!("Error communicating with bot {bot} (status {status})"),
                cause: Box::new(SourceError::provider(bot.clone(), body, Some(status.as_u16()))),
            });
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(poe_chunk_stream(bot.clone(), bytes_stream).boxed())
    }
}

pub(crate) fn build_request_body(
    bot: &Label,
    request: &QueryRequest,
    options: &PoeRequestOptions,
) -> Result<serde_json::Value, SourceError> {
    let serialize_err = |e: serde_json::Error| {
        SourceError::protocol(bot.clone(), format!("failed to serialize query: {e}"))
    };
    let mut body = serde_json::to_value(request).map_err(serialize_err)?;
    body["version"] = serde_json::json!(PROTOCOL_VERSION);
    body["type"] = serde_json::json!("query");
    let extra = serde_json::to_value(options).map_err(serialize_err)?;
    if let serde_json::Value::Object(extra) = extra {
        for (key, value) in extra {
            body[key.as_str()] = value;
        }
    }
    Ok(body)
}

fn poe_chunk_stream(
    bot: Label,
    bytes_stream: ByteStream,
) -> impl futures::Stream<Item = Result<Chunk, SourceError>> + Send {
    struct State {
        bot: Label,
        bytes_stream: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<Chunk>,
        failed: Option<SourceError>,
        done: bool,
    }

    stream::try_unfold(
        State {
            bot,
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            failed: None,
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(chunk) = state.pending.pop_front() {
                    return Ok(Some((chunk, state)));
                }
                // Chunks decoded ahead of a failure in the same read go out first.
                if let Some(err) = state.failed.take() {
                    return Err(err);
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(bytes)) => {
                        for frame in state.decoder.push_chunk(&bytes) {
                            match map_poe_frame(&state.bot, &frame) {
                                Ok(FrameAction::Emit(chunk)) => state.pending.push_back(chunk),
                                Ok(FrameAction::Done) => {
                                    state.done = true;
                                    break;
                                }
                                Ok(FrameAction::Skip) => {}
                                Err(err) => {
                                    state.failed = Some(err);
                                    break;
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Err(SourceError::transport(
                            state.bot,
                            format!("streaming read failed: {e}"),
                        ));
                    }
                    None => {
                        return Err(SourceError::protocol(
                            state.bot,
                            "stream ended without a done event",
                        ));
                    }
                }
            }
        },
    )
}
