//! Command-line interface definitions for the study digest pipeline.
//!
//! One invocation builds and sends one slot's digest; the scheduler picks
//! the slot. Every option can come from the environment, which is how the
//! cron entries supply secrets.

use clap::Parser;

use crate::models::Slot;
use crate::pipeline::DEFAULT_MAX_RETRIES;

/// Command-line arguments for one scheduled invocation.
///
/// # Examples
///
/// ```sh
/// # 7AM cron entry
/// news_tutor morning_learning
///
/// # Evening recap against a self-hosted OpenAI-compatible endpoint
/// news_tutor evening_review --api-base-url http://localhost:8080/v1
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Which daily digest to build and send
    #[arg(value_enum)]
    pub slot: Slot,

    /// API key for the chat-completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub api_base_url: String,

    /// Model identifier for generation requests
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    /// News index page to scrape for today's lead article
    #[arg(long, env = "NEWS_URL", default_value = "https://lite.cnn.com")]
    pub news_url: String,

    /// Path of the daily bundle cache file
    #[arg(long, env = "NEWS_CACHE_PATH", default_value = "data/news.json")]
    pub cache_path: String,

    /// Telegram bot token (delivery is skipped when missing)
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    /// Telegram chat to deliver digests to
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: Option<String>,

    /// Acquisition attempts before falling back to the no-news notice
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: usize,

    /// Generation attempts per request before giving up
    #[arg(long, default_value_t = 3)]
    pub generation_retries: usize,
}
