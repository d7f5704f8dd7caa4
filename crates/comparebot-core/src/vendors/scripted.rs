//! Scripted bots that stream canned answers without any network.

use std::collections::HashMap;
use std::time::Duration;

use futures::StreamExt as _;
use futures::stream;

use crate::conversation::QueryRequest;
use crate::errors::SourceError;
use crate::model::Label;
use crate::provider::{Chunk, ChunkSource, ChunkStream};

/// Items one scripted bot will stream, in order.
#[derive(Clone, Debug, Default)]
pub struct Script {
    steps: Vec<Result<Chunk, SourceError>>,
    delay: Duration,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk.
    pub fn chunk(mut self, chunk: Chunk) -> Self {
        self.steps.push(Ok(chunk));
        self
    }

    /// Appends a content chunk.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.chunk(Chunk::text(text))
    }

    /// Ends the script with a failure. Later steps are never reached.
    pub fn fail(mut self, error: SourceError) -> Self {
        self.steps.push(Err(error));
        self
    }

    /// Waits this long before every item.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn into_stream(self) -> ChunkStream {
        let Self { mut steps, delay } = self;
        if let Some(failure) = steps.iter().position(Result::is_err) {
            steps.truncate(failure + 1);
        }
        stream::iter(steps)
            .then(move |item| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                item
            })
            .boxed()
    }
}

/// Chunk source with per-bot scripts.
///
/// Bots without a script echo the latest user message back word by word.
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    scripts: HashMap<Label, Script>,
    echo_delay: Duration,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the script streamed for `bot`.
    pub fn script(mut self, bot: impl Into<Label>, script: Script) -> Self {
        self.scripts.insert(bot.into(), script);
        self
    }

    /// Delay between words of echoed answers.
    pub fn echo_delay(mut self, delay: Duration) -> Self {
        self.echo_delay = delay;
        self
    }

    fn echo_script(&self, bot: &Label, request: &QueryRequest) -> Script {
        let prompt = request
            .latest_user_message()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let reply = format!("{} heard: {prompt}", bot.title());
        reply
            .split_whitespace()
            .enumerate()
            .fold(Script::new().delay(self.echo_delay), |script, (i, word)| {
                if i == 0 {
                    script.text(word)
                } else {
                    script.text(format!(" {word}"))
                }
            })
    }
}

#[async_trait::async_trait]
impl ChunkSource for ScriptedSource {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn open(&self, bot: &Label, request: QueryRequest) -> Result<ChunkStream, SourceError> {
        let script = match self.scripts.get(bot) {
            Some(script) => script.clone(),
            None => self.echo_script(bot, &request),
        };
        Ok(script.into_stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ProtocolMessage;
    use futures::StreamExt as _;

    async fn drain(
        source: &ScriptedSource,
        bot: &str,
        prompt: &str,
    ) -> Vec<Result<Chunk, SourceError>> {
        source
            .open(
                &Label::new(bot),
                QueryRequest::new(vec![ProtocolMessage::user(prompt)]),
            )
            .await
            .expect("open")
            .collect()
            .await
    }

    #[tokio::test]
    async fn unscripted_bot_echoes_latest_user_message() {
        let items = drain(&ScriptedSource::new(), "gpt", "what is rust").await;
        let text: String = items.into_iter().map(|c| c.expect("chunk").text).collect();
        assert_eq!(text, "Gpt heard: what is rust");
    }

    #[tokio::test(start_paused = true)]
    async fn script_plays_chunks_then_failure() {
        let source = ScriptedSource::new().script(
            "claude",
            Script::new()
                .text("partial")
                .fail(SourceError::transport("claude", "reset"))
                .text("unreachable")
                .delay(Duration::from_millis(20)),
        );
        let mut chunks = source
            .open(&Label::new("claude"), QueryRequest::new(vec![]))
            .await
            .expect("open");
        let started = tokio::time::Instant::now();
        assert_eq!(chunks.next().await.expect("first").expect("chunk").text, "partial");
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(matches!(chunks.next().await, Some(Err(SourceError::Transport { .. }))));
        assert!(chunks.next().await.is_none());
    }
}
