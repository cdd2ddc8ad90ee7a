//! Scraper for text-only news front pages.
//!
//! Built for lite/text editions of news sites (for example
//! `https://lite.cnn.com`), whose minimal and consistent HTML makes them
//! reliable to scrape. The index page is scanned for the first story
//! anchor, the relative href is resolved against the index URL, and the
//! article page yields its primary heading plus the leading paragraphs.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use super::{AcquisitionError, ArticleSource, FetchedArticle, Stage};

/// How many leading paragraphs form the article content.
const LEAD_PARAGRAPHS: usize = 5;

/// Anchor patterns tried in order when locating the day's first story.
/// Text-only front pages link stories from cards, headings, or the main
/// column; plain navigation anchors rarely match any of these.
static STORY_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        ".card--lite a[href]",
        "article a[href]",
        "h2 a[href]",
        "h3 a[href]",
        "main a[href]",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Find the href of the first story anchor on an index page.
fn first_article_href(index_html: &str) -> Option<String> {
    let document = Html::parse_document(index_html);
    for selector in STORY_SELECTORS.iter() {
        if let Some(element) = document.select(selector).next() {
            if let Some(href) = element.value().attr("href") {
                return Some(href.to_string());
            }
        }
    }
    None
}

/// Extract the primary heading text, empty if the page has none.
fn extract_title(article_html: &str) -> String {
    let document = Html::parse_document(article_html);
    document
        .select(&HEADING_SELECTOR)
        .next()
        .map(|element| {
            element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Join the first [`LEAD_PARAGRAPHS`] non-empty body paragraphs.
fn extract_leading_paragraphs(article_html: &str) -> String {
    let document = Html::parse_document(article_html);
    document
        .select(&PARAGRAPH_SELECTOR)
        .map(|element| {
            element
                .text()
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string()
        })
        .filter(|text| !text.is_empty())
        .take(LEAD_PARAGRAPHS)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Article source backed by a fixed text-only index URL.
#[derive(Debug, Clone)]
pub struct LiteSource {
    client: reqwest::Client,
    index_url: Url,
}

impl LiteSource {
    pub fn new(client: reqwest::Client, index_url: Url) -> Self {
        Self { client, index_url }
    }

    async fn get_page(&self, url: &str, stage: Stage) -> Result<String, AcquisitionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| AcquisitionError::Fetch { stage, source })?;
        response
            .text()
            .await
            .map_err(|source| AcquisitionError::Fetch { stage, source })
    }
}

impl ArticleSource for LiteSource {
    #[instrument(level = "info", skip_all, fields(index = %self.index_url))]
    async fn fetch_latest(&self) -> Result<FetchedArticle, AcquisitionError> {
        let index_html = self.get_page(self.index_url.as_str(), Stage::Index).await?;

        let href = first_article_href(&index_html).ok_or(AcquisitionError::NoArticleLink)?;
        let article_url = self
            .index_url
            .join(&href)
            .map_err(|source| AcquisitionError::BadLink { href, source })?;
        debug!(url = %article_url, "Resolved first story link");

        let article_html = self.get_page(article_url.as_str(), Stage::Article).await?;
        let title = extract_title(&article_html);
        let content = extract_leading_paragraphs(&article_html);

        info!(
            %article_url,
            title_bytes = title.len(),
            content_bytes = content.len(),
            "Fetched article"
        );
        Ok(FetchedArticle {
            title,
            content,
            url: article_url.to_string(),
        })
    }
}
