//! Answer synthesis over retrieved context.
//!
//! Two modes share one post-processing pass: an extractive model answer, or
//! a heuristic pick of the paragraphs that mention the most question words.
//! A weak answer is replaced by the full content of the top section.
use kbqa_core::config::SynthesisSettings;
use kbqa_core::text::{capitalize_first, count_contained, extraction_tokens, truncate_chars};
use kbqa_core::traits::ExtractedAnswer;
use kbqa_core::types::KnowledgeSection;

pub const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub answer: String,
    pub confidence: f32,
    /// The raw answer was too weak and the top section's content was used instead.
    pub replaced: bool,
}

/// `title: content` of each section, separated by a blank line.
pub fn build_context(sections: &[&KnowledgeSection]) -> String {
    sections.iter().map(|s| s.context_text()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

pub struct Synthesizer<'a> {
    settings: &'a SynthesisSettings,
}

impl<'a> Synthesizer<'a> {
    pub fn new(settings: &'a SynthesisSettings) -> Self {
        Self { settings }
    }

    /// Paragraph-ranking answer over `context` with its confidence, before post-processing.
    pub fn heuristic_answer(&self, question: &str, context: &str) -> (String, f32) {
        let words = extraction_tokens(question);
        let mut scored: Vec<(usize, &str)> = context
            .split(CONTEXT_SEPARATOR)
            .map(str::trim)
            .filter(|p| p.chars().count() >= self.settings.min_paragraph_chars)
            .map(|p| (count_contained(&p.to_lowercase(), &words), p))
            .filter(|(score, _)| *score > 0)
            .collect();
        // stable: equal scores keep context order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let best = scored.first().map_or(0, |(s, _)| *s);
        if best == 0 {
            return (truncate_chars(context, self.settings.raw_context_chars).to_string(), 0.0);
        }
        let confidence = if words.is_empty() { 0.0 } else { (best as f32 / words.len() as f32).clamp(0.0, 1.0) };
        let answer = scored
            .iter()
            .take(self.settings.max_paragraphs)
            .map(|(_, p)| *p)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        (answer, confidence)
    }

    pub fn heuristic(&self, question: &str, sections: &[&KnowledgeSection]) -> Synthesis {
        let context = build_context(sections);
        let (answer, confidence) = self.heuristic_answer(question, &context);
        let weak = answer.trim().chars().count() < self.settings.min_answer_chars;
        self.finish(answer, confidence, weak, sections)
    }

    /// Post-process a model answer. The span is weak when its score is under
    /// the extraction threshold or it is shorter than the minimum answer length.
    pub fn extractive(&self, extracted: ExtractedAnswer, sections: &[&KnowledgeSection]) -> Synthesis {
        let score = extracted.score.clamp(0.0, 1.0);
        let weak = score < self.settings.min_extraction_score
            || extracted.answer.trim().chars().count() < self.settings.min_answer_chars;
        self.finish(extracted.answer, score, weak, sections)
    }

    fn finish(&self, answer: String, confidence: f32, weak: bool, sections: &[&KnowledgeSection]) -> Synthesis {
        let (raw, replaced) = match sections.first() {
            Some(top) if weak => (top.content.clone(), true),
            _ => (answer, false),
        };
        Synthesis { answer: polish(&raw), confidence, replaced }
    }
}

/// Trim, capitalize the first character and end with `.`, `!` or `?`.
pub fn polish(raw: &str) -> String {
    let mut answer = capitalize_first(raw.trim());
    if !answer.is_empty() && !answer.ends_with(['.', '!', '?']) {
        answer.push('.');
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_core::types::{PageId, SectionId};

    fn section(title: &str, content: &str) -> KnowledgeSection {
        KnowledgeSection {
            id: SectionId(0),
            page: PageId::from("/"),
            title: title.into(),
            content: content.into(),
            keywords: vec![],
        }
    }

    #[test]
    fn polish_capitalizes_and_terminates() {
        assert_eq!(polish("  urban farms on rooftops "), "Urban farms on rooftops.");
        assert_eq!(polish("really?"), "Really?");
        assert_eq!(polish("wow!"), "Wow!");
        assert_eq!(polish(""), "");
    }

    #[test]
    fn heuristic_prefers_paragraphs_with_more_question_words() {
        let settings = SynthesisSettings::default();
        let synth = Synthesizer::new(&settings);
        let context = "Rooftop: We install rooftop farms on office buildings.\n\n\
                       Lobby: Indoor towers grow herbs in rooftop-free lobbies with rooftop views.\n\nShort";
        let (answer, confidence) = synth.heuristic_answer("Which rooftop farms do you install?", context);
        assert!(answer.starts_with("Rooftop: We install"));
        assert!(!answer.contains("Short"));
        // "which" "rooftop" "farms" "install": the first paragraph has three of four
        assert!((confidence - 0.75).abs() < 1e-6);
    }

    #[test]
    fn heuristic_falls_back_to_raw_context_prefix() {
        let settings = SynthesisSettings { raw_context_chars: 10, ..Default::default() };
        let synth = Synthesizer::new(&settings);
        let (answer, confidence) = synth.heuristic_answer("zzzz", "Plenty of unrelated material here.");
        assert_eq!(answer, "Plenty of ");
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn short_heuristic_answer_uses_top_section_content() {
        let settings = SynthesisSettings::default();
        let synth = Synthesizer::new(&settings);
        // "Hours: Open daily" is under both length minimums, so the raw context comes back short
        let top = section("Hours", "open daily");
        let result = synth.heuristic("When are you open?", &[&top]);
        assert!(result.replaced);
        assert_eq!(result.answer, "Open daily.");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn weak_extraction_uses_top_section_content() {
        let settings = SynthesisSettings::default();
        let synth = Synthesizer::new(&settings);
        let top = section("Company Overview", "MicroHabitat runs urban farms");
        let weak_span = ExtractedAnswer { answer: "a long enough span of answer text".into(), score: 0.05 };
        let low = synth.extractive(weak_span, &[&top]);
        assert!(low.replaced);
        assert_eq!(low.answer, "MicroHabitat runs urban farms.");

        let short = synth.extractive(ExtractedAnswer { answer: "urban farms".into(), score: 0.8 }, &[&top]);
        assert!(short.replaced);
        assert_eq!(short.confidence, 0.8);

        let strong_span = ExtractedAnswer { answer: "the largest network of urban farms".into(), score: 0.7 };
        let good = synth.extractive(strong_span, &[&top]);
        assert!(!good.replaced);
        assert_eq!(good.answer, "The largest network of urban farms.");
    }

    #[test]
    fn context_joins_sections_with_blank_lines() {
        let a = section("A", "one");
        let b = section("B", "two");
        assert_eq!(build_context(&[&a, &b]), "A: one\n\nB: two");
    }
}
