//! Content derivation over an already-fetched article.
//!
//! Every function here is a thin, prompt-shaped layer over the
//! [`ChatModel`] seam: summarization, translation, idiom generation, and
//! the per-slot dialogue/example/quiz generators. Keyword extraction is
//! the one local operation, built on the [`Tagger`] boundary.
//!
//! Failure semantics are uniform: any [`GenerationError`] from a
//! derivation aborts the caller's current acquisition attempt; the
//! validation loop decides whether to try again.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::api::{ChatModel, GenerationError};
use crate::tagging::Tagger;
use crate::utils::lead_and_tail;

/// Fixed sentinel returned for empty translation input; no request is made.
pub const NOTHING_TO_TRANSLATE: &str = "번역할 내용 없음";

/// Language the study material is translated into.
const TARGET_LANGUAGE: &str = "ko";

/// Sentences kept from the front of an article before summarization.
const SUMMARY_LEAD_SENTENCES: usize = 3;

/// Upper bound on extracted keywords.
const KEYWORD_CAP: usize = 5;

/// Keywords shorter than this are too thin to study.
const MIN_KEYWORD_CHARS: usize = 4;

/// Derivation service: a chat model plus a part-of-speech tagger.
pub struct Deriver<C, T> {
    chat: C,
    tagger: T,
}

impl<C, T> Deriver<C, T>
where
    C: ChatModel,
    T: Tagger,
{
    pub fn new(chat: C, tagger: T) -> Self {
        Self { chat, tagger }
    }

    /// Distill article content into one sentence.
    ///
    /// The content is compressed to its opening sentences plus the final
    /// one before prompting, which bounds prompt size on long articles.
    #[instrument(level = "debug", skip_all)]
    pub async fn summarize(&self, content: &str) -> Result<String, GenerationError> {
        let compressed = lead_and_tail(content, SUMMARY_LEAD_SENTENCES);
        let prompt = format!("Summarize this in one sentence:\n{compressed}");
        self.chat.ask(&prompt).await
    }

    /// Translate text into Korean.
    ///
    /// Empty input maps to the fixed [`NOTHING_TO_TRANSLATE`] sentinel
    /// without touching the generation service.
    #[instrument(level = "debug", skip_all)]
    pub async fn translate(&self, text: &str) -> Result<String, GenerationError> {
        if text.trim().is_empty() {
            return Ok(NOTHING_TO_TRANSLATE.to_string());
        }
        let prompt =
            format!("Translate the following text to {TARGET_LANGUAGE}:\n\n{text}");
        self.chat.ask(&prompt).await
    }

    /// Extract study keywords from a summary sentence.
    ///
    /// Content words (nouns, verbs, adjectives) longer than three
    /// characters are kept in extraction order, deduplicated, and capped
    /// at five. Empty input yields an empty sequence.
    pub fn extract_keywords(&self, sentence: &str) -> Vec<String> {
        if sentence.trim().is_empty() {
            return Vec::new();
        }
        let keywords: Vec<String> = self
            .tagger
            .tag(sentence)
            .into_iter()
            .filter(|token| token.is_content_word())
            .filter(|token| token.text.chars().count() >= MIN_KEYWORD_CHARS)
            .map(|token| token.text)
            .unique()
            .take(KEYWORD_CAP)
            .collect();
        debug!(count = keywords.len(), "Extracted keywords");
        keywords
    }

    /// Ask for canonical everyday idioms, one per line.
    ///
    /// Not derived from the article; these pad out the study material.
    #[instrument(level = "debug", skip_all)]
    pub async fn generate_expressions(&self) -> Result<Vec<String>, GenerationError> {
        let prompt = "List 3 common English idioms that are useful in everyday \
                      conversation. Reply with one idiom per line and nothing else.";
        let response = self.chat.ask(prompt).await?;
        Ok(split_listing(&response))
    }

    /// Generate a short dialogue built around `phrase`.
    #[instrument(level = "debug", skip_all)]
    pub async fn generate_dialogue(&self, phrase: &str) -> Result<String, GenerationError> {
        let prompt = format!(
            "Create a short and natural dialogue using the phrase '{phrase}'. \
             Keep it simple and relevant to everyday conversation."
        );
        self.chat.ask(&prompt).await
    }

    /// Generate one example sentence using `phrase`.
    #[instrument(level = "debug", skip_all)]
    pub async fn generate_example_sentence(
        &self,
        phrase: &str,
    ) -> Result<String, GenerationError> {
        let prompt = format!(
            "Write one simple example sentence using the phrase '{phrase}'. \
             Reply with the sentence only."
        );
        self.chat.ask(&prompt).await
    }

    /// Generate a fill-in-the-blank quiz for `phrase`.
    #[instrument(level = "debug", skip_all)]
    pub async fn generate_quiz(&self, phrase: &str) -> Result<String, GenerationError> {
        let prompt = format!(
            "Create a one-line fill-in-the-blank quiz sentence for the phrase \
             '{phrase}'. Put a blank where the phrase belongs, then give the \
             answer on a second line starting with 'Answer:'."
        );
        self.chat.ask(&prompt).await
    }
}

/// Split an LLM listing response into clean items.
///
/// Models return lists with numbering or bullets regardless of what the
/// prompt asked for, so both are stripped.
fn split_listing(response: &str) -> Vec<String> {
    response
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')')
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagging::RuleTagger;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes a canned response and counts how often it was asked.
    struct CountingChat {
        calls: AtomicUsize,
        response: &'static str,
    }

    impl CountingChat {
        fn new(response: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChatModel for &CountingChat {
        async fn ask(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.to_string())
        }
    }

    #[tokio::test]
    async fn test_translate_empty_input_makes_no_calls() {
        let chat = CountingChat::new("무시됨");
        let deriver = Deriver::new(&chat, RuleTagger);

        assert_eq!(deriver.translate("").await.unwrap(), "번역할 내용 없음");
        assert_eq!(deriver.translate("   ").await.unwrap(), "번역할 내용 없음");
        assert_eq!(chat.calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_nonempty_input_calls_once() {
        let chat = CountingChat::new("시장이 반등했다.");
        let deriver = Deriver::new(&chat, RuleTagger);

        let out = deriver.translate("Markets rallied.").await.unwrap();
        assert_eq!(out, "시장이 반등했다.");
        assert_eq!(chat.calls(), 1);
    }

    #[test]
    fn test_extract_keywords_empty_input() {
        let chat = CountingChat::new("");
        let deriver = Deriver::new(&chat, RuleTagger);
        assert!(deriver.extract_keywords("").is_empty());
    }

    #[test]
    fn test_extract_keywords_filters_and_caps() {
        let chat = CountingChat::new("");
        let deriver = Deriver::new(&chat, RuleTagger);

        let keywords = deriver.extract_keywords(
            "The government announced ambitious climate regulation measures \
             and additional infrastructure investment programs today",
        );
        assert!(keywords.len() <= 5);
        assert!(keywords.len() >= 2);
        // Function words and short tokens never survive.
        assert!(!keywords.iter().any(|k| k == "the" || k == "and"));
        assert!(keywords.iter().all(|k| k.chars().count() >= 4));
        assert!(keywords.contains(&"government".to_string()));
    }

    #[test]
    fn test_extract_keywords_dedupes_preserving_order() {
        let chat = CountingChat::new("");
        let deriver = Deriver::new(&chat, RuleTagger);

        let keywords = deriver.extract_keywords("Policy shapes policy debates about policy");
        assert_eq!(
            keywords,
            vec!["policy".to_string(), "shapes".to_string(), "debates".to_string()]
        );
    }

    #[tokio::test]
    async fn test_generate_expressions_strips_numbering() {
        let chat = CountingChat::new("1. break the ice\n2) hit the books\n- call it a day\n");
        let deriver = Deriver::new(&chat, RuleTagger);

        let expressions = deriver.generate_expressions().await.unwrap();
        assert_eq!(
            expressions,
            vec![
                "break the ice".to_string(),
                "hit the books".to_string(),
                "call it a day".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_summarize_compresses_long_content() {
        let chat = CountingChat::new("One sentence.");
        let deriver = Deriver::new(&chat, RuleTagger);

        let long_content = (1..=20)
            .map(|i| format!("Sentence number {i}."))
            .collect::<Vec<_>>()
            .join(" ");
        let out = deriver.summarize(&long_content).await.unwrap();
        assert_eq!(out, "One sentence.");
        assert_eq!(chat.calls(), 1);
    }
}
