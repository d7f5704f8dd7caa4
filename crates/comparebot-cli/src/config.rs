use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use comparebot_core::BotPair;
use comparebot_core::vendors::poe::PoeRequestOptions;

/// Load `.env` files before arguments are parsed so env fallbacks see them.
pub fn init() {
    let _ = dotenvy::from_path(Path::new(
        format!("{}/.env", env!("CARGO_MANIFEST_DIR")).as_str(),
    ));
    dotenvy::dotenv().ok();
}

/// Compare the streamed answers of two bots side by side.
///
/// End the prompt with `bot1 vs bot2` to pick the bots; otherwise the default
/// pair is used.
#[derive(Debug, Parser)]
#[command(name = "comparebot", version)]
pub struct Args {
    /// Message to send, optionally ending in `bot1 vs bot2`.
    #[arg(required_unless_present = "settings")]
    pub prompt: Option<String>,

    /// JSON file with earlier conversation messages (`[{"role": "user", "content": "..."}]`).
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Use in-process echo bots instead of the bot server protocol.
    #[arg(long)]
    pub scripted: bool,

    /// API key for the bot server protocol.
    #[arg(long, env = "POE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL bot names are appended to.
    #[arg(long, env = "COMPAREBOT_BASE_URL")]
    pub base_url: Option<String>,

    /// Bots compared when the prompt names none (`first,second`).
    #[arg(long, env = "COMPAREBOT_DEFAULT_PAIR")]
    pub default_pair: Option<BotPair>,

    /// Seconds to wait for each bot's whole answer.
    #[arg(long, default_value_t = 600)]
    pub timeout_secs: u64,

    /// Sampling temperature forwarded to both bots.
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Ask both bots to skip their own system prompt.
    #[arg(long)]
    pub skip_system_prompt: bool,

    /// Stop generating at this sequence (repeatable).
    #[arg(long = "stop", value_name = "SEQUENCE")]
    pub stop_sequences: Vec<String>,

    /// Print every intermediate snapshot instead of only the final answer.
    #[arg(long)]
    pub follow: bool,

    /// Print the advertised settings as JSON and exit.
    #[arg(long)]
    pub settings: bool,

    /// Log filter used when COMPAREBOT_LOG_LEVEL and RUST_LOG are unset.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Generation options sent with every bot query.
    pub fn request_options(&self) -> PoeRequestOptions {
        let mut options = PoeRequestOptions::default().skip_system_prompt(self.skip_system_prompt);
        if let Some(temperature) = self.temperature {
            options = options.temperature(temperature);
        }
        self.stop_sequences
            .iter()
            .fold(options, |options, stop| options.stop_sequence(stop.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_prompt_and_pair() {
        let args = Args::try_parse_from([
            "comparebot",
            "--scripted",
            "--default-pair",
            "gpt,claude",
            "hello there",
        ])
        .expect("args");
        assert_eq!(args.prompt.as_deref(), Some("hello there"));
        assert!(args.scripted);
        assert_eq!(args.default_pair, Some(BotPair::new("gpt", "claude")));
        assert_eq!(args.timeout(), Duration::from_secs(600));
    }

    #[test]
    fn generation_flags_become_request_options() {
        let args = Args::try_parse_from([
            "comparebot",
            "--temperature",
            "0.2",
            "--skip-system-prompt",
            "--stop",
            "END",
            "--stop",
            "Human:",
            "hi",
        ])
        .expect("args");
        assert_eq!(
            args.request_options(),
            PoeRequestOptions {
                temperature: Some(0.2),
                skip_system_prompt: true,
                stop_sequences: vec!["END".to_string(), "Human:".to_string()],
            }
        );

        let plain = Args::try_parse_from(["comparebot", "hi"]).expect("args");
        assert_eq!(plain.request_options(), PoeRequestOptions::default());
    }

    #[test]
    fn prompt_is_optional_only_for_settings() {
        assert!(Args::try_parse_from(["comparebot", "--settings"]).is_ok());
        assert!(Args::try_parse_from(["comparebot", "--scripted"]).is_err());
    }
}
