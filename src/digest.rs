//! Digest assembly: turns a bundle and a slot into the message text.
//!
//! Pure presentation over a [`NewsBundle`]; the only generation requests
//! made here are the slot-specific extras (per-keyword translations, a
//! dialogue, an example sentence, a quiz). A sentinel bundle renders the
//! fallback notice and nothing else: no keyword or dialogue content is
//! ever generated from an empty bundle.

use std::fmt::Write;

use crate::api::{ChatModel, GenerationError};
use crate::derive::Deriver;
use crate::models::{NewsBundle, Slot};
use crate::tagging::Tagger;

/// Notice sent when validation exhausted without a usable article.
pub const NO_NEWS_NOTICE: &str =
    "오늘은 적절한 뉴스 기사를 찾지 못했습니다. 내일 다시 확인해 주세요! 🙏";

/// Build the formatted digest for one slot.
pub async fn build_digest<C, T>(
    bundle: &NewsBundle,
    slot: Slot,
    deriver: &Deriver<C, T>,
) -> Result<String, GenerationError>
where
    C: ChatModel,
    T: Tagger,
{
    if bundle.is_sentinel() {
        return Ok(NO_NEWS_NOTICE.to_string());
    }

    match slot {
        Slot::MorningLearning => morning_learning(bundle, deriver).await,
        Slot::MorningStudy => {
            keyword_study(
                bundle,
                deriver,
                0,
                "🌅 오전 학습",
                "오늘은 이 키워드를 중심으로 영어를 연습해볼 거예요! 실생활에서 어떻게 활용되는지 확인해보세요. 😊",
            )
            .await
        }
        Slot::AfternoonStudy => {
            keyword_study(
                bundle,
                deriver,
                1,
                "🌇 오후 학습",
                "하루 동안 배운 내용을 다시 한 번 복습해보세요! 다른 맥락에서 같은 표현을 쓰면 기억에 더 잘 남아요. 📚",
            )
            .await
        }
        Slot::EveningReview => evening_review(bundle, deriver).await,
    }
}

/// Numbered keyword list with per-keyword translations.
async fn keyword_list<C, T>(
    bundle: &NewsBundle,
    deriver: &Deriver<C, T>,
) -> Result<String, GenerationError>
where
    C: ChatModel,
    T: Tagger,
{
    let mut out = String::new();
    for (i, keyword) in bundle.keywords.iter().enumerate() {
        let translated = deriver.translate(keyword).await?;
        writeln!(out, "{}. {} ({})", i + 1, keyword, translated).unwrap();
    }
    Ok(out.trim_end().to_string())
}

async fn morning_learning<C, T>(
    bundle: &NewsBundle,
    deriver: &Deriver<C, T>,
) -> Result<String, GenerationError>
where
    C: ChatModel,
    T: Tagger,
{
    let title_ko = deriver.translate(&bundle.title).await?;
    let keywords = keyword_list(bundle, deriver).await?;
    let example = deriver
        .generate_example_sentence(&bundle.keywords[0])
        .await?;

    let mut out = String::new();
    writeln!(out, "📚 오늘의 영어 학습\n").unwrap();
    writeln!(out, "📰 오늘의 뉴스 헤드라인:\n").unwrap();
    writeln!(out, "{}", bundle.title).unwrap();
    writeln!(out, "📌 {title_ko}").unwrap();
    writeln!(out, "🔗 {}\n", bundle.url.as_deref().unwrap_or("링크 없음")).unwrap();
    writeln!(out, "💡 오늘의 핵심 문장:\n").unwrap();
    writeln!(out, "{}", bundle.summary).unwrap();
    writeln!(out, "📌 {}\n", bundle.summary_ko).unwrap();
    writeln!(out, "🔎 오늘의 키워드\n").unwrap();
    writeln!(out, "{keywords}\n").unwrap();
    writeln!(out, "✏️ 예문: {example}").unwrap();

    if !bundle.expressions.is_empty() {
        writeln!(out, "\n🗣 오늘의 표현\n").unwrap();
        for expression in &bundle.expressions {
            writeln!(out, "- {expression}").unwrap();
        }
    }

    Ok(out.trim_end().to_string())
}

/// Midday/afternoon layout: one keyword practiced in a dialogue.
async fn keyword_study<C, T>(
    bundle: &NewsBundle,
    deriver: &Deriver<C, T>,
    index: usize,
    header: &str,
    intro: &str,
) -> Result<String, GenerationError>
where
    C: ChatModel,
    T: Tagger,
{
    // Acceptance guarantees two keywords, so indexes 0 and 1 both exist.
    let keyword = &bundle.keywords[index];
    let keyword_ko = deriver.translate(keyword).await?;
    let dialogue = deriver.generate_dialogue(keyword).await?;
    let dialogue_ko = deriver.translate(&dialogue).await?;

    let mut out = String::new();
    writeln!(out, "{header}").unwrap();
    writeln!(out, "{intro}\n").unwrap();
    writeln!(out, "🔹 오늘의 학습 키워드: {keyword} ({keyword_ko})\n").unwrap();
    writeln!(out, "💬 대화 속에서 배우기").unwrap();
    writeln!(out, "{dialogue}").unwrap();
    writeln!(out, "📌 {dialogue_ko}").unwrap();
    Ok(out.trim_end().to_string())
}

async fn evening_review<C, T>(
    bundle: &NewsBundle,
    deriver: &Deriver<C, T>,
) -> Result<String, GenerationError>
where
    C: ChatModel,
    T: Tagger,
{
    let title_ko = deriver.translate(&bundle.title).await?;
    let keywords = keyword_list(bundle, deriver).await?;
    let quiz = deriver.generate_quiz(&bundle.keywords[0]).await?;

    let mut out = String::new();
    writeln!(out, "🌙 저녁 복습 시간").unwrap();
    writeln!(out, "📖 오늘 배운 내용을 한눈에 정리해보세요!\n").unwrap();
    writeln!(out, "📰 헤드라인:").unwrap();
    writeln!(out, "{}", bundle.title).unwrap();
    writeln!(out, "📌 {title_ko}\n").unwrap();
    writeln!(out, "💡 핵심 문장:\n").unwrap();
    writeln!(out, "{}", bundle.summary).unwrap();
    writeln!(out, "📌 {}\n", bundle.summary_ko).unwrap();
    writeln!(out, "🔎 오늘의 키워드\n").unwrap();
    writeln!(out, "{keywords}\n").unwrap();
    writeln!(out, "📝 오늘의 퀴즈").unwrap();
    writeln!(out, "{quiz}\n").unwrap();
    writeln!(out, "✏️ 오늘 배운 키워드를 사용해서 직접 문장을 만들어 보세요!").unwrap();
    writeln!(out, "💭 내일 아침에 다시 확인하면서 복습해 보세요!").unwrap();
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagging::RuleTagger;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoChat {
        calls: AtomicUsize,
    }

    impl EchoChat {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChatModel for &EchoChat {
        async fn ask(&self, prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if prompt.starts_with("Translate") {
                Ok("번역".to_string())
            } else if prompt.starts_with("Create a short and natural dialogue") {
                Ok("A: Hello!\nB: Hi there.".to_string())
            } else if prompt.starts_with("Create a one-line fill-in-the-blank") {
                Ok("The ___ announced a plan.\nAnswer: government".to_string())
            } else {
                Ok("An example sentence.".to_string())
            }
        }
    }

    fn bundle() -> NewsBundle {
        NewsBundle {
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            title: "Government announces climate plan".to_string(),
            url: Some("https://example.com/story".to_string()),
            summary: "The government announced a climate plan.".to_string(),
            summary_ko: "정부가 기후 계획을 발표했다.".to_string(),
            keywords: vec!["government".to_string(), "climate".to_string()],
            expressions: vec!["break the ice".to_string()],
        }
    }

    #[tokio::test]
    async fn test_sentinel_renders_only_the_notice() {
        let chat = EchoChat::new();
        let deriver = Deriver::new(&chat, RuleTagger);
        let sentinel = NewsBundle::sentinel(NaiveDate::from_ymd_opt(2025, 5, 6).unwrap());

        for slot in [
            Slot::MorningLearning,
            Slot::MorningStudy,
            Slot::AfternoonStudy,
            Slot::EveningReview,
        ] {
            let text = build_digest(&sentinel, slot, &deriver).await.unwrap();
            assert_eq!(text, NO_NEWS_NOTICE);
        }
        // No slot content is generated from an empty bundle.
        assert_eq!(chat.calls(), 0);
    }

    #[tokio::test]
    async fn test_morning_learning_layout() {
        let chat = EchoChat::new();
        let deriver = Deriver::new(&chat, RuleTagger);

        let text = build_digest(&bundle(), Slot::MorningLearning, &deriver)
            .await
            .unwrap();

        assert!(text.starts_with("📚 오늘의 영어 학습"));
        assert!(text.contains("Government announces climate plan"));
        assert!(text.contains("🔗 https://example.com/story"));
        assert!(text.contains("1. government (번역)"));
        assert!(text.contains("2. climate (번역)"));
        assert!(text.contains("✏️ 예문: An example sentence."));
        assert!(text.contains("- break the ice"));
    }

    #[tokio::test]
    async fn test_morning_study_uses_first_keyword() {
        let chat = EchoChat::new();
        let deriver = Deriver::new(&chat, RuleTagger);

        let text = build_digest(&bundle(), Slot::MorningStudy, &deriver)
            .await
            .unwrap();

        assert!(text.starts_with("🌅 오전 학습"));
        assert!(text.contains("🔹 오늘의 학습 키워드: government (번역)"));
        assert!(text.contains("A: Hello!"));
    }

    #[tokio::test]
    async fn test_afternoon_study_uses_second_keyword() {
        let chat = EchoChat::new();
        let deriver = Deriver::new(&chat, RuleTagger);

        let text = build_digest(&bundle(), Slot::AfternoonStudy, &deriver)
            .await
            .unwrap();

        assert!(text.starts_with("🌇 오후 학습"));
        assert!(text.contains("🔹 오늘의 학습 키워드: climate (번역)"));
    }

    #[tokio::test]
    async fn test_evening_review_contains_recap_and_quiz() {
        let chat = EchoChat::new();
        let deriver = Deriver::new(&chat, RuleTagger);

        let text = build_digest(&bundle(), Slot::EveningReview, &deriver)
            .await
            .unwrap();

        assert!(text.starts_with("🌙 저녁 복습 시간"));
        assert!(text.contains("💡 핵심 문장:"));
        assert!(text.contains("정부가 기후 계획을 발표했다."));
        assert!(text.contains("📝 오늘의 퀴즈"));
        assert!(text.contains("Answer: government"));
    }

    #[tokio::test]
    async fn test_missing_url_renders_placeholder() {
        let chat = EchoChat::new();
        let deriver = Deriver::new(&chat, RuleTagger);
        let mut b = bundle();
        b.url = None;

        let text = build_digest(&b, Slot::MorningLearning, &deriver)
            .await
            .unwrap();
        assert!(text.contains("🔗 링크 없음"));
    }
}
