//! Acquisition validation loop and daily cache orchestration.
//!
//! [`fetch_valid_news_data`] drives acquisition and derivation until a
//! bundle passes the acceptance predicate or the attempt budget runs out,
//! in which case the sentinel bundle is returned. [`todays_bundle`] wraps
//! it with the read-then-maybe-populate cache pattern: the first
//! invocation of a new day does the work, every later slot reads the
//! cached result.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::api::{ChatModel, GenerationError};
use crate::derive::Deriver;
use crate::models::NewsBundle;
use crate::scrapers::{ArticleSource, FetchedArticle};
use crate::store::BundleStore;
use crate::tagging::Tagger;

/// Minimum usable keywords for a bundle to be accepted and cached.
const MIN_KEYWORDS: usize = 2;

/// Default acquisition attempt budget.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Derive a full bundle from one fetched article.
async fn derive_bundle<C, T>(
    deriver: &Deriver<C, T>,
    date: NaiveDate,
    article: FetchedArticle,
) -> Result<NewsBundle, GenerationError>
where
    C: ChatModel,
    T: Tagger,
{
    let summary = deriver.summarize(&article.content).await?;
    let summary_ko = deriver.translate(&summary).await?;
    let keywords = deriver.extract_keywords(&summary);
    let expressions = deriver.generate_expressions().await?;

    Ok(NewsBundle {
        date,
        title: article.title,
        url: Some(article.url),
        summary,
        summary_ko,
        keywords,
        expressions,
    })
}

/// Acquire and derive today's bundle, retrying up to `max_retries` times.
///
/// Each attempt is independent: a failed fetch, empty title/content, a
/// derivation failure, or thin keyword output all advance the attempt
/// counter. When the budget is exhausted the sentinel bundle is returned;
/// callers must check [`NewsBundle::is_sentinel`] before generating any
/// slot content from it.
#[instrument(level = "info", skip_all, fields(%date, max_retries))]
pub async fn fetch_valid_news_data<S, C, T>(
    source: &S,
    deriver: &Deriver<C, T>,
    date: NaiveDate,
    max_retries: usize,
) -> NewsBundle
where
    S: ArticleSource,
    C: ChatModel,
    T: Tagger,
{
    for attempt in 1..=max_retries {
        let article = match source.fetch_latest().await {
            Ok(article) => article,
            Err(e) => {
                warn!(attempt, max_retries, stage = %e.stage(), error = %e, "Acquisition failed");
                continue;
            }
        };

        if article.title.trim().is_empty() || article.content.trim().is_empty() {
            warn!(attempt, max_retries, url = %article.url, "Article had no usable title or content");
            continue;
        }

        let bundle = match derive_bundle(deriver, date, article).await {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(attempt, max_retries, error = %e, "Derivation failed");
                continue;
            }
        };

        if bundle.keywords.len() >= MIN_KEYWORDS {
            info!(
                attempt,
                keywords = bundle.keywords.len(),
                title = %bundle.title,
                "Bundle accepted"
            );
            return bundle;
        }
        warn!(
            attempt,
            max_retries,
            keywords = bundle.keywords.len(),
            "Bundle too thin; need at least {MIN_KEYWORDS} keywords"
        );
    }

    warn!(max_retries, "All acquisition attempts failed; falling back to sentinel bundle");
    NewsBundle::sentinel(date)
}

/// Load today's bundle from the cache, or build and cache it.
///
/// Only bundles that passed the acceptance predicate are persisted; the
/// sentinel is returned to the caller but never written, so a later slot
/// on the same day gets a fresh chance at acquisition.
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn todays_bundle<S, C, T, B>(
    source: &S,
    deriver: &Deriver<C, T>,
    store: &B,
    date: NaiveDate,
    max_retries: usize,
) -> NewsBundle
where
    S: ArticleSource,
    C: ChatModel,
    T: Tagger,
    B: BundleStore,
{
    match store.get(date).await {
        Ok(Some(bundle)) => {
            info!(title = %bundle.title, "Using cached bundle");
            return bundle;
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Cache read failed; rebuilding today's bundle"),
    }

    let bundle = fetch_valid_news_data(source, deriver, date, max_retries).await;
    if !bundle.is_sentinel() {
        if let Err(e) = store.put(&bundle).await {
            warn!(error = %e, "Failed to cache bundle; later slots will re-derive");
        }
    }
    bundle
}
