use std::fmt;

/// Identifier for one bot's stream in the combined output (for example `gpt`).
///
/// Labels are unique among the sources of a single comparison and double as
/// the section heading in rendered snapshots.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Label(pub String);

impl Label {
    /// Creates a label from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the heading form of the label.
    ///
    /// Every run of letters starts uppercase and continues lowercase, so
    /// `claude-instant` becomes `Claude-Instant` and `GPT4o` becomes `Gpt4O`.
    pub fn title(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut prev_cased = false;
        for ch in self.0.chars() {
            if prev_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_cased = ch.is_alphabetic();
        }
        out
    }

    /// Compares two labels ignoring case.
    pub fn matches_ignore_case(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The two bots compared when the conversation carries no `x vs y` directive.
pub const DEFAULT_PAIR: (&str, &str) = ("assistant", "claude-instant");

/// Pair of bots selected for one comparison.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BotPair {
    pub first: Label,
    pub second: Label,
}

impl BotPair {
    /// Creates a pair from two labels.
    pub fn new(first: impl Into<Label>, second: impl Into<Label>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Returns both labels in comparison order.
    pub fn labels(&self) -> [&Label; 2] {
        [&self.first, &self.second]
    }
}

impl Default for BotPair {
    fn default() -> Self {
        Self::new(DEFAULT_PAIR.0, DEFAULT_PAIR.1)
    }
}

impl std::str::FromStr for BotPair {
    type Err = String;

    /// Parses `first,second` or `first vs second`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = if s.contains(',') {
            s.split(',').map(str::trim).collect()
        } else {
            s.split_whitespace()
                .filter(|p| !matches!(*p, "vs" | "vs."))
                .collect()
        };
        match parts.as_slice() {
            [first, second] if !first.is_empty() && !second.is_empty() => {
                Ok(Self::new(*first, *second))
            }
            _ => Err(format!("expected two bot names, got `{s}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_capitalizes_each_letter_run() {
        assert_eq!(Label::new("claude-instant").title(), "Claude-Instant");
        assert_eq!(Label::new("GPT4o").title(), "Gpt4O");
        assert_eq!(Label::new("a").title(), "A");
    }

    #[test]
    fn matches_ignore_case() {
        assert!(Label::new("Claude").matches_ignore_case("claude"));
        assert!(!Label::new("Claude").matches_ignore_case("llama"));
    }

    #[test]
    fn bot_pair_parses_both_spellings() {
        assert_eq!(
            "gpt, claude".parse::<BotPair>().expect("pair"),
            BotPair::new("gpt", "claude")
        );
        assert_eq!(
            "gpt vs. claude".parse::<BotPair>().expect("pair"),
            BotPair::new("gpt", "claude")
        );
        assert!("gpt".parse::<BotPair>().is_err());
    }
}
