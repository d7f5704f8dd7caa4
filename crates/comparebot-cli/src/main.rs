//! Command-line front end: sends one prompt to two bots and prints the
//! combined answer as it streams in.

mod config;

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;
use comparebot_core::observability::init_observability;
use comparebot_core::SettingsResponse;
use comparebot_core::prelude::*;
use comparebot_core::vendors::poe::{PoeClientConfig, PoeSource};
use comparebot_core::vendors::scripted::ScriptedSource;
use futures::StreamExt as _;
use tracing::info;

use crate::config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init();
    let args = Args::parse();
    init_observability(&args.log_level);

    if args.settings {
        println!("{}", serde_json::to_string_pretty(&SettingsResponse::default())?);
        return Ok(());
    }

    let bot = build_bot(&args)?;

    let query = build_query(&args)?;
    let pair = bot.bots_for(&query);
    info!(first = %pair.first, second = %pair.second, "dispatching prompt");

    let mut response = bot.get_response(query)?;
    let mut latest = String::new();
    while let Some(event) = response.next().await {
        match event {
            ResponseEvent::Replace { text } => {
                if args.follow {
                    println!("{text}\n");
                    println!("{}", "-".repeat(40));
                }
                latest = text;
            }
            ResponseEvent::SuggestedReply { text } => eprintln!("suggested reply: {text}"),
        }
    }
    if !args.follow {
        println!("{latest}");
    }
    Ok(())
}

fn build_bot(args: &Args) -> anyhow::Result<CompareBot> {
    let source: Arc<dyn ChunkSource> = if args.scripted {
        Arc::new(ScriptedSource::new().echo_delay(std::time::Duration::from_millis(30)))
    } else {
        let api_key = args
            .api_key
            .clone()
            .context("POE_API_KEY is not set (pass --api-key or use --scripted)")?;
        let mut config = PoeClientConfig::new(api_key).timeout(args.timeout());
        if let Some(base_url) = &args.base_url {
            config = config.base_url(base_url);
        }
        Arc::new(PoeSource::new(config)?.with_options(args.request_options()))
    };

    let mut builder = CompareBot::builder().default_source(source);
    if let Some(pair) = &args.default_pair {
        builder = builder.default_pair(pair.clone());
    }
    Ok(builder.build()?)
}

fn build_query(args: &Args) -> anyhow::Result<QueryRequest> {
    let mut messages: Vec<ProtocolMessage> = match &args.history {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading history from {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing history in {}", path.display()))?
        }
        None => Vec::new(),
    };
    if let Some(prompt) = &args.prompt {
        messages.push(ProtocolMessage::user(prompt.clone()));
    }
    Ok(QueryRequest::new(messages))
}
