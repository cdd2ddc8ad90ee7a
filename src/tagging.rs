//! Part-of-speech tagging boundary used for keyword extraction.
//!
//! Keyword extraction only needs to know which tokens are content words
//! (nouns, verbs, adjectives). That capability sits behind the [`Tagger`]
//! trait so the pipeline never depends on a particular NLP backend; the
//! shipped [`RuleTagger`] classifies with a stopword list and suffix
//! rules, which is enough to separate `government` and `announced` from
//! `the` and `about` in a one-sentence summary.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Coarse part-of-speech classes relevant to keyword extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    /// Function words and anything else not worth studying.
    Other,
}

/// A token paired with its part-of-speech class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub tag: PosTag,
}

impl TaggedToken {
    pub fn is_content_word(&self) -> bool {
        matches!(self.tag, PosTag::Noun | PosTag::Verb | PosTag::Adjective)
    }
}

/// Turns a sentence into a sequence of tagged tokens.
pub trait Tagger {
    fn tag(&self, sentence: &str) -> Vec<TaggedToken>;
}

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").unwrap());

/// Function words that never become study keywords.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "this", "that", "these", "those", "and", "but", "or", "nor", "so",
        "yet", "for", "of", "in", "on", "at", "to", "from", "by", "with", "about", "into",
        "over", "under", "after", "before", "between", "through", "during", "against", "as",
        "is", "are", "was", "were", "be", "been", "being", "am", "do", "does", "did", "done",
        "have", "has", "had", "having", "will", "would", "shall", "should", "can", "could",
        "may", "might", "must", "not", "no", "it", "its", "he", "she", "his", "her", "him",
        "they", "them", "their", "we", "us", "our", "you", "your", "i", "me", "my", "who",
        "whom", "whose", "which", "what", "when", "where", "why", "how", "there", "here",
        "than", "then", "also", "very", "more", "most", "some", "any", "all", "each", "both",
        "other", "such", "only", "own", "same", "just", "too", "up", "down", "out", "off",
        "while", "because", "if", "once", "says", "said", "say",
    ]
    .into_iter()
    .collect()
});

const ADJECTIVE_SUFFIXES: [&str; 9] = [
    "ous", "ful", "ive", "able", "ible", "ical", "less", "ish", "ary",
];
const VERB_SUFFIXES: [&str; 7] = ["izes", "ized", "ised", "ifies", "ated", "ing", "ed"];
const NOUN_SUFFIXES: [&str; 12] = [
    "tion", "sion", "ment", "ness", "ity", "ship", "ance", "ence", "ism", "ist", "age", "ers",
];

/// Stopword-and-suffix tagger.
///
/// Tokens are lowercased for classification; unknown content words default
/// to `Noun`, which mirrors how a statistical tagger treats out-of-
/// vocabulary tokens in headline prose.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleTagger;

impl RuleTagger {
    fn classify(word: &str) -> PosTag {
        if STOPWORDS.contains(word) {
            return PosTag::Other;
        }
        if ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return PosTag::Adjective;
        }
        if NOUN_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return PosTag::Noun;
        }
        if VERB_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return PosTag::Verb;
        }
        PosTag::Noun
    }
}

impl Tagger for RuleTagger {
    fn tag(&self, sentence: &str) -> Vec<TaggedToken> {
        WORD.find_iter(sentence)
            .map(|m| {
                let text = m.as_str().to_lowercase();
                let tag = Self::classify(&text);
                TaggedToken { text, tag }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_of(sentence: &str) -> Vec<(String, PosTag)> {
        RuleTagger
            .tag(sentence)
            .into_iter()
            .map(|t| (t.text, t.tag))
            .collect()
    }

    #[test]
    fn test_empty_sentence_yields_no_tokens() {
        assert!(RuleTagger.tag("").is_empty());
        assert!(RuleTagger.tag("  ,;: 123 ").is_empty());
    }

    #[test]
    fn test_stopwords_are_not_content_words() {
        let tokens = RuleTagger.tag("The results were about the economy");
        let function_words: Vec<_> = tokens.iter().filter(|t| !t.is_content_word()).collect();
        assert!(function_words.iter().any(|t| t.text == "the"));
        assert!(function_words.iter().any(|t| t.text == "about"));
        assert!(function_words.iter().any(|t| t.text == "were"));
    }

    #[test]
    fn test_suffix_classification() {
        let tags = tags_of("government announced dangerous regulation");
        assert!(tags.contains(&("government".to_string(), PosTag::Noun)));
        assert!(tags.contains(&("announced".to_string(), PosTag::Verb)));
        assert!(tags.contains(&("dangerous".to_string(), PosTag::Adjective)));
        assert!(tags.contains(&("regulation".to_string(), PosTag::Noun)));
    }

    #[test]
    fn test_unknown_content_word_defaults_to_noun() {
        let tags = tags_of("blockchain");
        assert_eq!(tags, vec![("blockchain".to_string(), PosTag::Noun)]);
    }

    #[test]
    fn test_tokens_are_lowercased() {
        let tokens = RuleTagger.tag("Climate Policy");
        assert_eq!(tokens[0].text, "climate");
        assert_eq!(tokens[1].text, "policy");
    }
}
