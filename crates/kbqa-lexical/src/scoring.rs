use kbqa_core::ranking::SectionScorer;
use kbqa_core::text::{count_contained, general_tokens};
use kbqa_core::types::KnowledgeSection;

/// Domain terms that signal strong intent when both the question and the
/// section mention them.
pub const SPECIAL_KEYWORDS: &[&str] = &["esg", "leed", "well", "boma", "roi", "cost", "price", "career", "job", "hire"];

pub const KEYWORD_WEIGHT: f32 = 3.0;
pub const SPECIAL_WEIGHT: f32 = 5.0;
pub const TOKEN_WEIGHT: f32 = 1.0;

/// Primary lexical scorer:
/// `3 * declared keywords in the question + 5 * shared special keywords + 1 * question tokens in the body`.
///
/// A section is kept when it scores above zero or when its title appears
/// verbatim in the question.
pub struct KeywordScorer {
    question_lower: String,
    tokens: Vec<String>,
    specials: Vec<&'static str>,
}

impl KeywordScorer {
    pub fn new(question: &str) -> Self {
        let question_lower = question.to_lowercase();
        let specials = SPECIAL_KEYWORDS.iter().copied().filter(|k| question_lower.contains(k)).collect();
        Self { tokens: general_tokens(question), question_lower, specials }
    }

    pub fn raw_score(&self, section: &KnowledgeSection) -> f32 {
        let keyword_hits = section.keywords.iter().filter(|k| self.question_lower.contains(k.as_str())).count();

        let title = section.title.to_lowercase();
        let body = section.content.to_lowercase();
        let special_hits = self
            .specials
            .iter()
            .filter(|sp| {
                section.keywords.iter().any(|k| k.contains(**sp)) || title.contains(**sp) || body.contains(**sp)
            })
            .count();

        let token_hits = count_contained(&body, &self.tokens);

        KEYWORD_WEIGHT * keyword_hits as f32 + SPECIAL_WEIGHT * special_hits as f32 + TOKEN_WEIGHT * token_hits as f32
    }

    fn title_in_question(&self, section: &KnowledgeSection) -> bool {
        let title = section.title.to_lowercase();
        !title.is_empty() && self.question_lower.contains(&title)
    }
}

impl SectionScorer for KeywordScorer {
    fn score(&self, section: &KnowledgeSection) -> Option<f32> {
        let score = self.raw_score(section);
        (score > 0.0 || self.title_in_question(section)).then_some(score)
    }
}

/// Relaxed scorer for the store-wide fallback pass: one point per question
/// token in the body, one per declared keyword that overlaps the question in
/// either direction. Candidates below `min_score` are dropped so a single
/// coincidental word does not surface a section.
pub struct BroadScorer {
    question_lower: String,
    tokens: Vec<String>,
    min_score: f32,
}

impl BroadScorer {
    pub fn new(question: &str, min_score: f32) -> Self {
        Self { question_lower: question.to_lowercase(), tokens: general_tokens(question), min_score }
    }

    pub fn raw_score(&self, section: &KnowledgeSection) -> f32 {
        let body = section.content.to_lowercase();
        let token_hits = count_contained(&body, &self.tokens);
        let keyword_hits = section
            .keywords
            .iter()
            .filter(|k| self.question_lower.contains(k.as_str()) || self.tokens.iter().any(|t| k.contains(t.as_str())))
            .count();
        (token_hits + keyword_hits) as f32
    }
}

impl SectionScorer for BroadScorer {
    fn score(&self, section: &KnowledgeSection) -> Option<f32> {
        let score = self.raw_score(section);
        (score >= self.min_score).then_some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_core::types::{PageId, SectionId};

    fn section(title: &str, content: &str, keywords: &[&str]) -> KnowledgeSection {
        KnowledgeSection {
            id: SectionId(0),
            page: PageId::from("/x"),
            title: title.into(),
            content: content.into(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    #[test]
    fn weights_add_up() {
        let s = section("Pricing", "The cost depends on size.", &["cost", "quote"]);
        // keyword "cost" (3) + special "cost" (5) + tokens "cost" and "size" in body (2)
        assert_eq!(KeywordScorer::new("What cost for my size?").raw_score(&s), 10.0);
    }

    #[test]
    fn special_keyword_needs_the_question_to_mention_it() {
        let s = section("Certifications", "LEED and WELL credits.", &[]);
        assert_eq!(KeywordScorer::new("tell me about gardens").raw_score(&s), 0.0);
        assert_eq!(KeywordScorer::new("leed?").raw_score(&s), 6.0);
    }

    #[test]
    fn title_match_keeps_zero_score_section() {
        let s = section("FAQ", "", &[]);
        assert_eq!(KeywordScorer::new("show me the faq").score(&s), Some(0.0));
        assert_eq!(KeywordScorer::new("show me the docs").score(&s), None);
    }

    #[test]
    fn broad_scorer_enforces_minimum() {
        let s = section("Locations", "We operate in Montreal and Paris.", &["cities"]);
        assert_eq!(BroadScorer::new("montreal", 2.0).score(&s), None);
        assert_eq!(BroadScorer::new("montreal paris", 2.0).score(&s), Some(2.0));
        // "citie" is not a token of the body but overlaps the keyword
        assert_eq!(BroadScorer::new("montreal citie", 2.0).score(&s), Some(2.0));
    }
}
