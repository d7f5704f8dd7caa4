//! Side-by-side streaming comparison of several bots.
//!
//! A query ending in `x vs y` is dispatched to both bots at once. Their
//! streamed answers are merged into one markdown document with a
//! `**Bot** says:` section per bot, and the caller receives the full document
//! again after every update. A failing bot shows an error in its own section
//! and never holds up the other.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use comparebot_core::prelude::*;
//! use comparebot_core::vendors::poe::PoeSource;
//! use futures::StreamExt as _;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), CompareError> {
//! let bot = CompareBot::builder()
//!     .default_source(Arc::new(PoeSource::from_env()?))
//!     .build()?;
//!
//! let prompt = "Explain borrowing. gpt-4o vs claude-3-haiku";
//! let query = QueryRequest::new(vec![ProtocolMessage::user(prompt)]);
//! let mut response = bot.get_response(query)?;
//! while let Some(event) = response.next().await {
//!     if let ResponseEvent::Replace { text } = event {
//!         println!("{text}\n---");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Caller-facing snapshots built from multiplexed events.
pub mod aggregate;
/// Comparison entry point and builder.
pub mod compare;
/// Conversation history types exchanged with bots.
pub mod conversation;
/// Public error types.
pub mod errors;
/// Labels and bot pairs.
pub mod model;
/// Round-based fan-in of labeled chunk streams.
pub mod multiplex;
/// Logging setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Per-bot rewriting of the conversation history.
pub mod preprocess;
/// Chunk source contract.
pub mod provider;
/// Failure rendering.
pub mod render;
/// Advertised bot settings.
pub mod settings;
/// Concrete chunk sources.
pub mod vendors;

pub use aggregate::{ResponseAggregator, ResponseEvent, ResponseStream, aggregate};
pub use compare::{CompareBot, CompareBotBuilder};
pub use conversation::{ProtocolMessage, QueryRequest, Role};
pub use errors::{CompareError, SourceError};
pub use model::{BotPair, Label};
pub use multiplex::{EventStream, Outcome, StreamEvent, combine_streams};
pub use preprocess::{bots_to_compare, preprocess_message, preprocess_query};
pub use provider::{Chunk, ChunkKind, ChunkSource, ChunkStream, open_lazily};
pub use render::render_failure;
pub use settings::SettingsResponse;
