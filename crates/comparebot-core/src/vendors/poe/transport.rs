use crate::errors::SourceError;
use crate::model::Label;
use crate::provider::Chunk;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental server-sent-events decoder.
///
/// Bytes may arrive split anywhere; complete frames are returned as soon as
/// their blank-line terminator has been seen.
#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes: Vec<u8> = self.buf.drain(..idx + delim_len).take(idx).collect();
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    (0..buf.len()).find_map(|i| {
        let rest = &buf[i..];
        if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else {
            None
        }
    })
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<&str> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// What one protocol frame means for the bot's chunk stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FrameAction {
    Emit(Chunk),
    Done,
    Skip,
}

/// Maps a decoded frame to a chunk, end of stream, or failure.
///
/// `error` frames become `SourceError::Bot` carrying the raw JSON payload so
/// the renderer can show the bot's own message.
pub(crate) fn map_poe_frame(bot: &Label, frame: &SseFrame) -> Result<FrameAction, SourceError> {
    let Some(event) = frame.event.as_deref() else {
        return Ok(FrameAction::Skip);
    };
    match event {
        "text" => frame_text(bot, frame).map(Chunk::text).map(FrameAction::Emit),
        "replace_response" => frame_text(bot, frame)
            .map(Chunk::replace_response)
            .map(FrameAction::Emit),
        "suggested_reply" => frame_text(bot, frame)
            .map(Chunk::suggested_reply)
            .map(FrameAction::Emit),
        "meta" => Ok(FrameAction::Emit(Chunk::metadata(frame.data.clone()))),
        "error" => Err(SourceError::bot(
            bot.clone(),
            format!("Error communicating with bot {bot}"),
            frame.data.clone(),
        )),
        "done" => Ok(FrameAction::Done),
        _ => Ok(FrameAction::Skip),
    }
}

fn frame_text(bot: &Label, frame: &SseFrame) -> Result<String, SourceError> {
    let event = frame.event.as_deref().unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&frame.data).map_err(|e| {
        SourceError::protocol(bot.clone(), format!("invalid JSON in `{event}` event: {e}"))
    })?;
    value
        .get("text")
        .and_then(|v| v.as_str())
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            SourceError::protocol(bot.clone(), format!("`{event}` event without text field"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ChunkKind;

    fn frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: Some(event.into()),
            data: data.into(),
        }
    }

    #[test]
    fn sse_decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let frames1 = decoder.push_chunk(b"event: text\ndata: {\"text\":\"hel");
        assert!(frames1.is_empty());
        let frames2 = decoder.push_chunk(b"lo\"}\r\n\r\n: ping\n\nevent: done\ndata: {}\n\n");
        assert_eq!(
            frames2,
            vec![frame("text", "{\"text\":\"hello\"}"), frame("done", "{}")]
        );
    }

    #[test]
    fn maps_content_events() {
        let bot = Label::new("gpt");
        assert_eq!(
            map_poe_frame(&bot, &frame("text", r#"{"text":"Hi"}"#)).expect("text"),
            FrameAction::Emit(Chunk::text("Hi"))
        );
        assert_eq!(
            map_poe_frame(&bot, &frame("replace_response", r#"{"text":"All new"}"#))
                .expect("replace"),
            FrameAction::Emit(Chunk::replace_response("All new"))
        );
        let FrameAction::Emit(reply) =
            map_poe_frame(&bot, &frame("suggested_reply", r#"{"text":"More?"}"#)).expect("reply")
        else {
            panic!("suggested reply should emit");
        };
        assert_eq!(reply.kind, ChunkKind::SuggestedReply);
        let meta_frame = frame("meta", r#"{"content_type":"text/markdown"}"#);
        let FrameAction::Emit(meta) = map_poe_frame(&bot, &meta_frame).expect("meta") else {
            panic!("meta should emit");
        };
        assert_eq!(meta.kind, ChunkKind::Metadata);
    }

    #[test]
    fn maps_done_and_unknown_events() {
        let bot = Label::new("gpt");
        assert_eq!(map_poe_frame(&bot, &frame("done", "{}")).expect("done"), FrameAction::Done);
        assert_eq!(map_poe_frame(&bot, &frame("json", "{}")).expect("json"), FrameAction::Skip);
        let untyped = SseFrame {
            event: None,
            data: "{}".into(),
        };
        assert_eq!(map_poe_frame(&bot, &untyped).expect("untyped"), FrameAction::Skip);
    }

    #[test]
    fn error_event_keeps_payload_as_cause() {
        let bot = Label::new("claude");
        let error_frame = frame("error", r#"{"text":"rate limited","allow_retry":true}"#);
        let err = map_poe_frame(&bot, &error_frame).expect_err("should fail");
        let SourceError::Bot { cause, message, .. } = err else {
            panic!("expected bot error");
        };
        assert_eq!(message, "Error communicating with bot claude");
        assert_eq!(cause.message(), r#"{"text":"rate limited","allow_retry":true}"#);
    }

    #[test]
    fn malformed_text_event_is_protocol_error() {
        let bot = Label::new("gpt");
        let err = map_poe_frame(&bot, &frame("text", "not json")).expect_err("should fail");
        assert!(matches!(err, SourceError::Protocol { .. }));
        let err = map_poe_frame(&bot, &frame("text", "{}")).expect_err("should fail");
        assert!(matches!(err, SourceError::Protocol { .. }));
    }
}
