//! Data models for the daily study bundle.
//!
//! This module defines the core data structures used throughout the
//! application:
//! - [`NewsBundle`]: the day's validated news-derived content, cached once
//!   per calendar date and shared by every slot
//! - [`Slot`]: the four fixed times of day a digest is generated
//!
//! A bundle that failed validation is represented by the sentinel bundle
//! (see [`NewsBundle::sentinel`]); callers detect it through
//! [`NewsBundle::is_sentinel`] before generating any slot content.

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headline used when no usable article could be acquired.
pub const NO_NEWS_TITLE: &str = "No News Available";
/// Summary used when no usable article could be acquired.
pub const NO_SUMMARY: &str = "No Summary Available";
/// Korean rendering of the missing summary.
pub const NO_SUMMARY_KO: &str = "요약할 뉴스 없음";

/// The day's unit of work: one validated article reduced to study material.
///
/// A bundle is produced at most once per calendar date by the validation
/// loop, persisted through a [`crate::store::BundleStore`], and read
/// (never mutated) by every later invocation on the same day so that all
/// four slots tell the same story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsBundle {
    /// Calendar date the bundle was derived on; acts as the cache key.
    pub date: NaiveDate,
    /// Source headline.
    pub title: String,
    /// Source article location, when acquisition succeeded.
    pub url: Option<String>,
    /// One-sentence English distillation of the article.
    pub summary: String,
    /// The summary rendered in Korean.
    pub summary_ko: String,
    /// Extracted study terms, in extraction order, at most five.
    pub keywords: Vec<String>,
    /// Idiom expressions generated independently of the article.
    #[serde(default)]
    pub expressions: Vec<String>,
}

impl NewsBundle {
    /// The well-defined fallback bundle returned when validation is
    /// exhausted. Never cached.
    pub fn sentinel(date: NaiveDate) -> Self {
        Self {
            date,
            title: NO_NEWS_TITLE.to_string(),
            url: None,
            summary: NO_SUMMARY.to_string(),
            summary_ko: NO_SUMMARY_KO.to_string(),
            keywords: Vec::new(),
            expressions: Vec::new(),
        }
    }

    /// A bundle with no keywords carries no study content; every slot
    /// must render the fallback notice instead.
    pub fn is_sentinel(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// One of the four fixed times of day a digest is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Slot {
    /// 7AM: full study material for the day.
    MorningLearning,
    /// 11AM: practice the first keyword in a dialogue.
    MorningStudy,
    /// 4PM: practice the second keyword in a dialogue.
    AfternoonStudy,
    /// 7PM: recap of the day plus a quiz.
    EveningReview,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::MorningLearning => "morning_learning",
            Slot::MorningStudy => "morning_study",
            Slot::AfternoonStudy => "afternoon_study",
            Slot::EveningReview => "evening_review",
        };
        f.write_str(name)
    }
}
