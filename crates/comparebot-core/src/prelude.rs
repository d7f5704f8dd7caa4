//! Common imports for typical comparison usage.
pub use crate::{
    BotPair, Chunk, ChunkKind, ChunkSource, ChunkStream, CompareBot, CompareBotBuilder,
    CompareError, Label, ProtocolMessage, QueryRequest, ResponseEvent, ResponseStream, Role,
    SourceError,
};
