use crate::model::Label;

/// Failure of a single chunk source.
///
/// These never escape a comparison: the multiplexer retires the source and
/// the aggregator renders the failure in place of that bot's answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Upstream returned an application-level failure (HTTP status, auth, etc.).
    #[error("provider error ({bot}): {message}")]
    Provider {
        bot: Label,
        message: String,
        status_code: Option<u16>,
    },
    /// Transport or stream I/O failed.
    #[error("transport error ({bot}): {message}")]
    Transport { bot: Label, message: String },
    /// Response shape or event sequencing was invalid.
    #[error("protocol error ({bot}): {message}")]
    Protocol { bot: Label, message: String },
    /// The bot itself reported an error. `cause` carries the raw payload.
    #[error("bot error ({bot}): {message}")]
    Bot {
        bot: Label,
        message: String,
        #[source]
        cause: Box<SourceError>,
    },
}

impl SourceError {
    /// Creates a provider-level error.
    pub fn provider(
        bot: impl Into<Label>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Provider {
            bot: bot.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(bot: impl Into<Label>, message: impl Into<String>) -> Self {
        Self::Transport {
            bot: bot.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(bot: impl Into<Label>, message: impl Into<String>) -> Self {
        Self::Protocol {
            bot: bot.into(),
            message: message.into(),
        }
    }

    /// Creates a bot-reported error wrapping its raw payload.
    ///
    /// The payload usually is the JSON body the bot sent, for example
    /// `{"text": "rate limited", "allow_retry": true}`.
    pub fn bot(
        bot: impl Into<Label>,
        message: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        let bot = bot.into();
        Self::Bot {
            cause: Box::new(Self::provider(bot.clone(), payload, None)),
            bot,
            message: message.into(),
        }
    }

    /// Returns the bot associated with this error.
    pub fn bot_label(&self) -> &Label {
        match self {
            Self::Provider { bot, .. }
            | Self::Transport { bot, .. }
            | Self::Protocol { bot, .. }
            | Self::Bot { bot, .. } => bot,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Provider { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. }
            | Self::Bot { message, .. } => message,
        }
    }
}

/// Errors that abort a comparison before any source is polled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    /// Invalid bot/source configuration.
    #[error("config error: {0}")]
    Config(String),
    /// The same label was supplied for two concurrent sources.
    #[error("duplicate label: {label}")]
    DuplicateLabel { label: Label },
    /// No chunk source is registered for the requested bot.
    #[error("no source registered for bot: {bot}")]
    SourceNotFound { bot: Label },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn bot_error_exposes_payload_as_source() {
        let err = SourceError::bot("claude", "bot reported an error", r#"{"text":"busy"}"#);
        let source = err.source().expect("cause");
        assert_eq!(source.to_string(), r#"provider error (claude): {"text":"busy"}"#);
        assert_eq!(err.bot_label().as_str(), "claude");
        assert_eq!(err.message(), "bot reported an error");
    }
}
