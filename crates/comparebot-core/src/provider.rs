use std::pin::Pin;
use std::sync::Arc;

use futures::StreamExt as _;
use futures::stream;

use crate::conversation::QueryRequest;
use crate::errors::SourceError;
use crate::model::Label;

/// What a chunk carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChunkKind {
    /// Side-channel data (content type, linkification hints); never rendered.
    Metadata,
    /// Answer text.
    Content,
    /// A follow-up the bot suggests to the user.
    SuggestedReply,
}

/// Unit of streamed output from one bot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub kind: ChunkKind,
    /// When set, this chunk supersedes everything the bot sent before.
    pub replace: bool,
}

impl Chunk {
    /// Content chunk appended to the bot's answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ChunkKind::Content,
            replace: false,
        }
    }

    /// Content chunk that replaces the bot's answer so far.
    pub fn replace_response(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ChunkKind::Content,
            replace: true,
        }
    }

    /// Suggested follow-up reply.
    pub fn suggested_reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ChunkKind::SuggestedReply,
            replace: false,
        }
    }

    /// Metadata chunk.
    pub fn metadata(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ChunkKind::Metadata,
            replace: false,
        }
    }
}

/// Asynchronous chunk sequence for one bot.
///
/// Yields `None` on natural end or a terminal `Err` exactly once. Dropping the
/// stream cancels whatever request backs it.
pub type ChunkStream = Pin<Box<dyn futures::Stream<Item = Result<Chunk, SourceError>> + Send>>;

/// Transport that turns a bot name and a query into a chunk stream.
#[async_trait::async_trait]
pub trait ChunkSource: Send + Sync {
    /// Stable identifier used in logs (for example `poe`).
    fn id(&self) -> &str;

    /// Starts streaming `bot`'s answer to `request`.
    async fn open(&self, bot: &Label, request: QueryRequest) -> Result<ChunkStream, SourceError>;
}

/// Defers `source.open` until the returned stream is first polled.
///
/// A failed open shows up as the stream's first (and only) item, the same as a
/// failure on the first advance.
pub fn open_lazily(source: Arc<dyn ChunkSource>, bot: Label, request: QueryRequest) -> ChunkStream {
    stream::once(async move { source.open(&bot, request).await })
        .map(|opened| match opened {
            Ok(chunks) => chunks,
            Err(err) => stream::iter([Err(err)]).boxed(),
        })
        .flatten()
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        opens: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ChunkSource for CountingSource {
        fn id(&self) -> &str {
            "counting"
        }

        async fn open(
            &self,
            bot: &Label,
            _request: QueryRequest,
        ) -> Result<ChunkStream, SourceError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::transport(bot.clone(), "connect refused"));
            }
            Ok(stream::iter([Ok(Chunk::text("a")), Ok(Chunk::text("b"))]).boxed())
        }
    }

    #[tokio::test]
    async fn open_is_deferred_until_first_poll() {
        let opens = Arc::new(AtomicUsize::new(0));
        let source = Arc::new(CountingSource {
            opens: opens.clone(),
            fail: false,
        });
        let mut chunks = open_lazily(source, Label::new("x"), QueryRequest::new(vec![]));
        assert_eq!(opens.load(Ordering::SeqCst), 0);

        let first = chunks.next().await.expect("item").expect("chunk");
        assert_eq!(first.text, "a");
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        let rest: Vec<_> = chunks.collect().await;
        assert_eq!(rest.len(), 1);
    }

    #[tokio::test]
    async fn open_failure_is_the_only_item() {
        let source = Arc::new(CountingSource {
            opens: Arc::new(AtomicUsize::new(0)),
            fail: true,
        });
        let items: Vec<_> = open_lazily(source, Label::new("x"), QueryRequest::new(vec![]))
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(SourceError::Transport { .. })));
    }
}
