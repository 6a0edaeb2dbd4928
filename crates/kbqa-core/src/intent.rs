//! Keyword-taxonomy intent classification.

use crate::taxonomy::Taxonomy;
use crate::types::{Topic, TopicId};

/// Specificity score of `topic` for an already lower-cased question: the sum
/// of the lengths of its keywords occurring in the question.
pub fn topic_score(topic: &Topic, question_lower: &str) -> usize {
    topic
        .keywords
        .iter()
        .filter(|k| question_lower.contains(k.as_str()))
        .map(|k| k.chars().count())
        .sum()
}

/// Classify `question` into an ordered, de-duplicated, non-empty topic list:
/// the best-scoring topic followed by its declared fallbacks. Falls back to
/// the taxonomy's default set when no keyword matches.
pub fn classify_intent(taxonomy: &Taxonomy, question: &str) -> Vec<TopicId> {
    let q = question.to_lowercase();
    let mut best: Option<(&Topic, usize)> = None;
    for topic in taxonomy.topics() {
        let score = topic_score(topic, &q);
        if score == 0 {
            continue;
        }
        // Strictly greater: the earliest-declared topic wins a tie.
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((topic, score));
        }
    }

    let Some((primary, score)) = best else {
        tracing::debug!(question, "no topic matched, using defaults");
        return dedupe(taxonomy.defaults().iter().cloned());
    };
    tracing::debug!(topic = %primary.id, score, "classified question");

    dedupe(std::iter::once(primary.id.clone()).chain(primary.fallbacks.iter().cloned()))
}

fn dedupe(ids: impl Iterator<Item = TopicId>) -> Vec<TopicId> {
    let mut out: Vec<TopicId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageId;

    fn ids(v: &[TopicId]) -> Vec<&str> {
        v.iter().map(TopicId::as_str).collect()
    }

    #[test]
    fn company_question_leads_with_company() {
        let t = Taxonomy::builtin().expect("taxonomy");
        let out = classify_intent(&t, "What is MicroHabitat?");
        assert_eq!(ids(&out), vec!["company", "services", "contact"]);
    }

    #[test]
    fn cost_question_leads_with_pricing() {
        let t = Taxonomy::builtin().expect("taxonomy");
        let out = classify_intent(&t, "How much does it cost?");
        assert_eq!(out[0].as_str(), "pricing");
    }

    #[test]
    fn gibberish_returns_defaults() {
        let t = Taxonomy::builtin().expect("taxonomy");
        let out = classify_intent(&t, "asdkj qwoeiru");
        assert_eq!(ids(&out), vec!["company", "services", "faq"]);
    }

    #[test]
    fn longer_keywords_outweigh_shorter_ones() {
        let t = Taxonomy::builtin().expect("taxonomy");
        // "certification" (13) beats "green" (5) from benefits.
        let out = classify_intent(&t, "green certification");
        assert_eq!(out[0].as_str(), "certifications");
    }

    #[test]
    fn tie_goes_to_first_declared_topic() {
        let topic = |id: &str, kw: &str| Topic {
            id: id.into(),
            name: id.into(),
            keywords: vec![kw.into()],
            pages: vec![PageId::from("/")],
            fallbacks: vec![],
        };
        let topics = vec![topic("first", "abcd"), topic("second", "wxyz")];
        let t = Taxonomy::new(topics, vec!["first".into()]).expect("taxonomy");
        let out = classify_intent(&t, "wxyz abcd");
        assert_eq!(ids(&out), vec!["first"]);
    }

    #[test]
    fn mutual_fallbacks_do_not_repeat() {
        let topic = |id: &str, kw: &str, fb: &[&str]| Topic {
            id: id.into(),
            name: id.into(),
            keywords: vec![kw.into()],
            pages: vec![],
            fallbacks: fb.iter().map(|f| TopicId::from(*f)).collect(),
        };
        let t = Taxonomy::new(
            vec![topic("a", "alpha", &["b", "c", "b"]), topic("b", "beta", &["a"]), topic("c", "gamma", &["a"])],
            vec!["a".into()],
        )
        .expect("taxonomy");
        let out = classify_intent(&t, "alpha");
        assert_eq!(ids(&out), vec!["a", "b", "c"]);
    }

    #[test]
    fn classification_is_total_over_assorted_inputs() {
        let t = Taxonomy::builtin().expect("taxonomy");
        for q in ["?", "x", "WHERE are you", "job job job", "leed well boma", "   ", "Ünïcödé"] {
            let out = classify_intent(&t, q);
            assert!(!out.is_empty(), "empty for {q:?}");
            assert!(out.iter().all(|id| t.contains(id)));
            let uniq: std::collections::HashSet<_> = out.iter().collect();
            assert_eq!(uniq.len(), out.len());
        }
    }
}
