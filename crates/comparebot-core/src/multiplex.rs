//! Round-based fan-in of several labeled chunk streams.
//!
//! Every round polls each active source for exactly one item. Completions are
//! delivered in the order they finish, so a fast bot is never held behind a
//! slow one, and the next round is only scheduled once the current round has
//! fully drained. Each source therefore has at most one advance in flight.

use std::collections::HashSet;

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, FuturesUnordered};
use futures::{FutureExt as _, StreamExt as _};
use tracing::debug;

use crate::errors::{CompareError, SourceError};
use crate::model::Label;
use crate::provider::{Chunk, ChunkStream};

/// Result of one advance of one source.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The source produced a chunk and stays active.
    Chunk(Chunk),
    /// The source ended cleanly and was retired.
    End,
    /// The source failed and was retired. It is never retried.
    Failure(SourceError),
}

/// One multiplexed event.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamEvent {
    pub label: Label,
    pub outcome: Outcome,
}

impl StreamEvent {
    pub fn chunk(label: Label, chunk: Chunk) -> Self {
        Self {
            label,
            outcome: Outcome::Chunk(chunk),
        }
    }

    pub fn end(label: Label) -> Self {
        Self {
            label,
            outcome: Outcome::End,
        }
    }

    pub fn failure(label: Label, error: SourceError) -> Self {
        Self {
            label,
            outcome: Outcome::Failure(error),
        }
    }

    /// Whether this is the last event the label will ever produce.
    pub fn is_terminal(&self) -> bool {
        !matches!(self.outcome, Outcome::Chunk(_))
    }
}

/// Lazily evaluated, non-restartable sequence of multiplexed events.
pub type EventStream = BoxStream<'static, StreamEvent>;

type Advance = BoxFuture<'static, (Label, ChunkStream, Option<Result<Chunk, SourceError>>)>;

fn advance(label: Label, mut chunks: ChunkStream) -> Advance {
    async move {
        let next = chunks.next().await;
        (label, chunks, next)
    }
    .boxed()
}

struct Rounds {
    in_flight: FuturesUnordered<Advance>,
    /// Sources that produced a chunk in the current round. Only read when the
    /// round has drained.
    survivors: Vec<(Label, ChunkStream)>,
    round: u64,
}

/// Merges labeled chunk streams into one event stream.
///
/// Labels must be unique and non-empty; violations are reported before any
/// source is polled. The returned stream ends once every source has ended or
/// failed. Dropping it cancels every in-flight advance and drops the sources.
pub fn combine_streams(streams: Vec<(Label, ChunkStream)>) -> Result<EventStream, CompareError> {
    let mut seen: HashSet<&Label> = HashSet::with_capacity(streams.len());
    for (label, _) in &streams {
        if label.as_str().trim().is_empty() {
            return Err(CompareError::Config("source label must not be empty".into()));
        }
        if !seen.insert(label) {
            return Err(CompareError::DuplicateLabel {
                label: label.clone(),
            });
        }
    }

    let state = Rounds {
        in_flight: FuturesUnordered::new(),
        survivors: streams,
        round: 0,
    };

    let events = stream::unfold(state, |mut state| async move {
        if state.in_flight.is_empty() {
            if state.survivors.is_empty() {
                return None;
            }
            state.round += 1;
            debug!(round = state.round, active = state.survivors.len(), "scheduling round");
            for (label, chunks) in state.survivors.drain(..) {
                state.in_flight.push(advance(label, chunks));
            }
        }

        let (label, chunks, next) = state.in_flight.next().await?;
        let event = match next {
            Some(Ok(chunk)) => {
                state.survivors.push((label.clone(), chunks));
                StreamEvent::chunk(label, chunk)
            }
            Some(Err(error)) => {
                debug!(
                    round = state.round,
                    label = %label,
                    error = %error,
                    "source failed, retiring"
                );
                StreamEvent::failure(label, error)
            }
            None => {
                debug!(round = state.round, label = %label, "source ended, retiring");
                StreamEvent::end(label)
            }
        };
        Some((event, state))
    });

    Ok(events.boxed())
}
