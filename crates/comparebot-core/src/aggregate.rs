use futures::StreamExt as _;
use futures::future;
use futures::stream::BoxStream;
use tracing::{debug, warn};

use crate::model::Label;
use crate::multiplex::{Outcome, StreamEvent};
use crate::provider::ChunkKind;
use crate::render::render_failure;

/// Event delivered to the caller of a comparison.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResponseEvent {
    /// Full combined answer so far. Replaces whatever was shown before.
    Replace { text: String },
    /// Follow-up suggested by one of the bots.
    SuggestedReply { text: String },
}

/// Caller-facing sequence of response events.
pub type ResponseStream = BoxStream<'static, ResponseEvent>;

/// Per-label accumulated answers of one comparison.
///
/// Sections keep the order in which labels first produced visible content and
/// are never removed.
#[derive(Debug, Default)]
pub struct ResponseAggregator {
    sections: Vec<(Label, Vec<String>)>,
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one multiplexed event and returns what the caller should see.
    pub fn apply(&mut self, event: StreamEvent) -> Option<ResponseEvent> {
        let StreamEvent { label, outcome } = event;
        match outcome {
            Outcome::End => {
                debug!(label = %label, "bot finished");
                return None;
            }
            Outcome::Failure(error) => {
                warn!(label = %label, error = %error, "bot failed");
                let rendered = render_failure(&label, &error);
                *self.fragments_mut(label) = vec![rendered];
            }
            Outcome::Chunk(chunk) => match chunk.kind {
                ChunkKind::Metadata => return None,
                ChunkKind::SuggestedReply => {
                    return Some(ResponseEvent::SuggestedReply { text: chunk.text });
                }
                ChunkKind::Content if chunk.replace => {
                    *self.fragments_mut(label) = vec![chunk.text];
                }
                ChunkKind::Content => self.fragments_mut(label).push(chunk.text),
            },
        }
        Some(ResponseEvent::Replace {
            text: self.snapshot(),
        })
    }

    /// Renders every section, in first-appearance order.
    pub fn snapshot(&self) -> String {
        self.sections
            .iter()
            .map(|(label, fragments)| {
                format!("**{}** says:\n{}", label.title(), fragments.concat())
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Labels seen so far, in first-appearance order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.sections.iter().map(|(label, _)| label)
    }

    fn fragments_mut(&mut self, label: Label) -> &mut Vec<String> {
        let idx = match self.sections.iter().position(|(l, _)| *l == label) {
            Some(idx) => idx,
            None => {
                self.sections.push((label, Vec::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[idx].1
    }
}

/// Turns multiplexed events into caller-facing response events.
///
/// A snapshot is produced synchronously for every visible event before the
/// next one is pulled from `events`.
pub fn aggregate<S>(events: S) -> ResponseStream
where
    S: futures::Stream<Item = StreamEvent> + Send + 'static,
{
    let mut aggregator = ResponseAggregator::new();
    events
        .filter_map(move |event| future::ready(aggregator.apply(event)))
        .boxed()
}
