//! Per-bot views of a shared conversation.
//!
//! Users pick the bots to compare with a trailing `x vs y` directive, and the
//! combined answers in the history are stored as `**Bot** says:` sections.
//! Before dispatch each bot gets a history with the directive removed and only
//! its own section of every combined answer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::conversation::{ProtocolMessage, QueryRequest, Role};
use crate::model::{BotPair, Label};

static COMPARE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s([A-Za-z_\-\d]+)\s+vs\.?\s+([A-Za-z_\-\d]+)\s*$")
        .expect("compare directive pattern is valid")
});

static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([A-Za-z_\-\d]+)\*\* says:\n").expect("section heading pattern is valid")
});

/// Picks the two bots to compare.
///
/// Scans from the newest message back and returns the pair named by the first
/// user message ending in a directive, or `default_pair` when there is none.
pub fn bots_to_compare(messages: &[ProtocolMessage], default_pair: &BotPair) -> BotPair {
    messages
        .iter()
        .rev()
        .filter(|message| message.role == Role::User)
        .find_map(|message| {
            COMPARE_DIRECTIVE
                .captures(&message.content)
                .map(|caps| BotPair::new(&caps[1], &caps[2]))
        })
        .unwrap_or_else(|| default_pair.clone())
}

/// Rewrites one history message for `bot`.
///
/// User messages lose their trailing directive. Bot messages made of labeled
/// sections keep only `bot`'s section (matched ignoring case); if there is no
/// such section the message is returned unchanged.
pub fn preprocess_message(message: &ProtocolMessage, bot: &Label) -> ProtocolMessage {
    match message.role {
        Role::User => {
            let content = COMPARE_DIRECTIVE.replace(&message.content, "");
            message.with_content(content)
        }
        Role::Bot => match section_for(&message.content, bot) {
            Some(section) => message.with_content(section),
            None => message.clone(),
        },
        Role::System => message.clone(),
    }
}

/// Rewrites every message of `query` for `bot`. Ids are kept.
pub fn preprocess_query(query: &QueryRequest, bot: &Label) -> QueryRequest {
    QueryRequest {
        query: query
            .query
            .iter()
            .map(|message| preprocess_message(message, bot))
            .collect(),
        ..query.clone()
    }
}

fn section_for<'a>(content: &'a str, bot: &Label) -> Option<&'a str> {
    let headings: Vec<_> = SECTION_HEADING.captures_iter(content).collect();
    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !bot.matches_ignore_case(name.as_str()) {
            continue;
        }
        let end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(content.len(), |next| next.start());
        return Some(&content[whole.end()..end]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMBINED: &str =
        "**Gpt** says:\nParis is the capital.\n\n**Claude** says:\nThe capital is Paris.";

    #[test]
    fn directive_selects_named_pair() {
        let history = vec![ProtocolMessage::user(
            "what is the capital of France? compare gpt vs claude",
        )];
        assert_eq!(
            bots_to_compare(&history, &BotPair::default()),
            BotPair::new("gpt", "claude")
        );
    }

    #[test]
    fn newest_directive_wins_and_bot_messages_are_ignored() {
        let history = vec![
            ProtocolMessage::user("hi llama vs. mistral"),
            ProtocolMessage::bot("answer a vs b"),
            ProtocolMessage::user("and now gpt-4 vs claude_2  "),
            ProtocolMessage::bot("answer c vs d"),
            ProtocolMessage::user("follow-up without directive"),
        ];
        assert_eq!(
            bots_to_compare(&history, &BotPair::default()),
            BotPair::new("gpt-4", "claude_2")
        );
    }

    #[test]
    fn missing_directive_falls_back_to_default_pair() {
        let history = vec![ProtocolMessage::user("just a question")];
        assert_eq!(
            bots_to_compare(&history, &BotPair::default()),
            BotPair::new("assistant", "claude-instant")
        );
        assert_eq!(
            bots_to_compare(&[], &BotPair::new("x", "y")),
            BotPair::new("x", "y")
        );
    }

    #[test]
    fn user_directive_is_stripped() {
        let msg = ProtocolMessage::user("what is 2+2? gpt vs claude");
        let out = preprocess_message(&msg, &Label::new("gpt"));
        assert_eq!(out.content, "what is 2+2?");
        assert_eq!(out.role, Role::User);
    }

    #[test]
    fn bot_message_keeps_matching_section_ignoring_case() {
        let msg = ProtocolMessage::bot(COMBINED);
        let out = preprocess_message(&msg, &Label::new("claude"));
        assert_eq!(out.content, "The capital is Paris.");
        let out = preprocess_message(&msg, &Label::new("GPT"));
        assert_eq!(out.content, "Paris is the capital.\n\n");
    }

    #[test]
    fn bot_message_without_matching_section_is_unchanged() {
        let msg = ProtocolMessage::bot(COMBINED);
        assert_eq!(preprocess_message(&msg, &Label::new("llama")), msg);
        let plain = ProtocolMessage::bot("no sections here");
        assert_eq!(preprocess_message(&plain, &Label::new("gpt")), plain);
    }

    #[test]
    fn system_message_passes_through() {
        let msg = ProtocolMessage::system("be brief gpt vs claude");
        assert_eq!(preprocess_message(&msg, &Label::new("gpt")), msg);
    }

    #[test]
    fn preprocess_query_rewrites_every_message_and_keeps_ids() {
        let query = QueryRequest::new(vec![
            ProtocolMessage::user("first question gpt vs claude"),
            ProtocolMessage::bot(COMBINED),
            ProtocolMessage::user("second question"),
        ]);
        let out = preprocess_query(&query, &Label::new("claude"));
        assert_eq!(out.conversation_id, query.conversation_id);
        assert_eq!(out.message_id, query.message_id);
        let contents: Vec<_> = out.query.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["first question", "The capital is Paris.", "second question"]
        );
    }
}
