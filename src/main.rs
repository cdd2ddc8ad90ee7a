//! # News Tutor
//!
//! A scheduled English-study pipeline: scrape the day's lead article from
//! a text-only news site, reduce it to a summary, a Korean translation,
//! and study keywords through an OpenAI-compatible LLM, then push a
//! slot-specific digest to Telegram.
//!
//! ## Usage
//!
//! ```sh
//! news_tutor morning_learning   # 7AM  full study material
//! news_tutor morning_study      # 11AM first keyword in a dialogue
//! news_tutor afternoon_study    # 4PM  second keyword in a dialogue
//! news_tutor evening_review     # 7PM  recap plus quiz
//! ```
//!
//! ## Architecture
//!
//! Each invocation is one run-to-completion pass:
//! 1. **Cache check**: reuse today's bundle if one was already validated
//! 2. **Acquisition + validation**: otherwise scrape, derive, and retry
//!    until the bundle has enough keywords or attempts run out
//! 3. **Digest**: render the slot's message from the bundle
//! 4. **Delivery**: hand the text to Telegram (or drop it with a warning
//!    when credentials are missing)

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};
use url::Url;

mod api;
mod cli;
mod derive;
mod digest;
mod models;
mod pipeline;
mod scrapers;
mod store;
mod tagging;
mod telegram;
mod utils;

use api::{OpenAiChat, RetryChat};
use cli::Cli;
use derive::Deriver;
use scrapers::lite::LiteSource;
use store::JsonFileStore;
use tagging::RuleTagger;
use telegram::{MessageSink, NoopSink, TelegramSink};
use utils::truncate_for_log;

/// Base delay between rate-limited generation attempts.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    info!(slot = %args.slot, "news_tutor starting up");

    // Structural misconfiguration halts the run before any network work.
    let Some(api_key) = args.api_key.as_deref().filter(|k| !k.is_empty()) else {
        error!("OPENAI_API_KEY is required");
        return Err("missing generation-service API key (set OPENAI_API_KEY)".into());
    };
    let index_url = Url::parse(&args.news_url).map_err(|e| {
        error!(url = %args.news_url, error = %e, "Invalid news index URL");
        e
    })?;

    // --- Wire up services ---
    let http = reqwest::Client::new();
    let chat = RetryChat::new(
        OpenAiChat::new(http.clone(), &args.api_base_url, api_key, &args.model),
        args.generation_retries,
        RETRY_BASE_DELAY,
    );
    let deriver = Deriver::new(chat, RuleTagger);
    let source = LiteSource::new(http.clone(), index_url);
    let store = JsonFileStore::new(&args.cache_path);

    // --- Today's bundle: cached, or acquired and validated ---
    let today = Local::now().date_naive();
    let bundle = pipeline::todays_bundle(&source, &deriver, &store, today, args.max_retries).await;
    info!(
        date = %bundle.date,
        title = %bundle.title,
        keywords = bundle.keywords.len(),
        sentinel = bundle.is_sentinel(),
        "Bundle ready"
    );

    // --- Slot digest ---
    let text = match digest::build_digest(&bundle, args.slot, &deriver).await {
        Ok(text) => text,
        Err(e) => {
            error!(slot = %args.slot, error = %e, "Failed to generate digest content");
            return Err(e.into());
        }
    };
    info!(
        slot = %args.slot,
        preview = %truncate_for_log(&text, 120),
        "Digest assembled"
    );

    // --- Delivery ---
    let delivery = match (
        args.telegram_bot_token.as_deref().filter(|t| !t.is_empty()),
        args.telegram_chat_id.as_deref().filter(|c| !c.is_empty()),
    ) {
        (Some(token), Some(chat_id)) => {
            TelegramSink::new(http, token, chat_id).send(&text).await
        }
        _ => NoopSink.send(&text).await,
    };
    // Messages are not queued for redelivery; a failed send is logged and
    // the run still exits cleanly.
    if let Err(e) = delivery {
        warn!(slot = %args.slot, error = %e, "Delivery failed; digest dropped");
    }

    let elapsed = start_time.elapsed();
    info!(
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        slot = %args.slot,
        "Execution complete"
    );
    Ok(())
}
