//! Chunk sources for concrete transports.

/// Bot server protocol over HTTP + server-sent events.
pub mod poe;
/// In-process scripted bots for demos and tests.
pub mod scripted;
