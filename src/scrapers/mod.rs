//! News acquisition from a text-only news index page.
//!
//! Acquisition follows a two-phase pattern:
//!
//! 1. **Indexing**: fetch the configured front page and locate the first
//!    article link
//! 2. **Fetching**: download that article and extract its headline plus
//!    the leading body paragraphs
//!
//! Failures carry the [`Stage`] they occurred in so the validation loop
//! can log where an attempt died. Acquisition never retries itself: a
//! failed fetch may simply mean "try a different moment", so retrying is
//! the validation loop's responsibility.

use thiserror::Error;

pub mod lite;

/// Which phase of acquisition a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Index,
    Article,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Index => f.write_str("index"),
            Stage::Article => f.write_str("article"),
        }
    }
}

/// Acquisition failure: network/HTTP error or missing expected markup.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("failed to fetch the {stage} page: {source}")]
    Fetch {
        stage: Stage,
        source: reqwest::Error,
    },
    #[error("no article link found on the index page")]
    NoArticleLink,
    #[error("could not resolve article link {href}: {source}")]
    BadLink {
        href: String,
        source: url::ParseError,
    },
}

impl AcquisitionError {
    pub fn stage(&self) -> Stage {
        match self {
            AcquisitionError::Fetch { stage, .. } => *stage,
            // Link discovery and resolution both happen while working the
            // index page.
            AcquisitionError::NoArticleLink | AcquisitionError::BadLink { .. } => Stage::Index,
        }
    }
}

/// A raw article as scraped from the source site.
///
/// `title` or `content` may be empty when the page lacked the expected
/// markup; the validation loop treats that as a failed attempt.
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    pub title: String,
    pub content: String,
    pub url: String,
}

/// Source of today's lead article.
///
/// The pipeline only ever asks for "the latest article"; everything about
/// how one is found lives behind this trait so tests can substitute a
/// scripted source.
pub trait ArticleSource {
    async fn fetch_latest(&self) -> Result<FetchedArticle, AcquisitionError>;
}
