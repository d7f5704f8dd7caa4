use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const SWITCH_VAR: &str = "COMPAREBOT_OBSERVABILITY";
const LEVEL_VAR: &str = "COMPAREBOT_LOG_LEVEL";
const JSON_PATH_VAR: &str = "COMPAREBOT_JSON_LOG_PATH";
const DEFAULT_JSON_FILE: &str = "comparebot.logs.jsonl";

/// Where log records are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSink {
    /// Compact lines on stderr. Stdout is left to the combined answer.
    Stderr,
    /// One JSON object per line in `dir/file_name`.
    JsonFile { dir: PathBuf, file_name: String },
}

impl LogSink {
    fn json_file(raw: &str) -> Self {
        let path = Path::new(raw);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_JSON_FILE)
            .to_string();
        Self::JsonFile { dir, file_name }
    }
}

/// Logging setup resolved from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    /// `EnvFilter` directives.
    pub filter: String,
    pub sink: LogSink,
}

impl LogSettings {
    /// Reads the `COMPAREBOT_*` variables and `RUST_LOG`.
    ///
    /// - `COMPAREBOT_OBSERVABILITY`: on/off switch, enabled unless set to a false value.
    /// - `COMPAREBOT_LOG_LEVEL`, then `RUST_LOG`: first one that parses as a filter wins.
    /// - `COMPAREBOT_JSON_LOG_PATH`: write JSONL there instead of stderr.
    ///
    /// `default_level` applies when no filter variable is usable.
    pub fn from_env(default_level: &str) -> Self {
        Self::resolve(default_level, |key| std::env::var(key).ok())
    }

    fn resolve(default_level: &str, var: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = var(SWITCH_VAR)
            .and_then(|value| parse_switch(&value))
            .unwrap_or(true);
        let filter = [LEVEL_VAR, "RUST_LOG"]
            .into_iter()
            .filter_map(|key| var(key))
            .find(|directives| EnvFilter::try_new(directives).is_ok())
            .unwrap_or_else(|| default_level.to_string());
        let sink = var(JSON_PATH_VAR)
            .map(|raw| LogSink::json_file(&raw))
            .unwrap_or(LogSink::Stderr);
        Self {
            enabled,
            filter,
            sink,
        }
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Installs the global subscriber once per process; later calls are no-ops.
pub fn init_observability(default_level: &str) {
    INIT.get_or_init(|| install(LogSettings::from_env(default_level)));
}

fn install(settings: LogSettings) {
    if !settings.enabled {
        return;
    }
    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let (json, console) = match settings.sink {
        LogSink::JsonFile { dir, file_name } => {
            let _ = std::fs::create_dir_all(&dir);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(tracing_appender::rolling::never(dir, file_name));
            (Some(layer), None)
        }
        LogSink::Stderr => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(console)
        .try_init();
}
