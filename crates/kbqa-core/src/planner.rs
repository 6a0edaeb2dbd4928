use crate::taxonomy::Taxonomy;
use crate::types::{SearchStep, TopicId};

/// Upper bound on planned steps, however many topics were classified.
pub const MAX_STEPS: usize = 3;

/// Expand classified topics into at most [`MAX_STEPS`] search steps. Topics
/// unknown to the taxonomy are skipped; a topic without pages still yields a
/// (pageless) step.
pub fn plan_search(taxonomy: &Taxonomy, topics: &[TopicId]) -> Vec<SearchStep> {
    topics
        .iter()
        .filter_map(|id| taxonomy.get(id))
        .take(MAX_STEPS)
        .enumerate()
        .map(|(i, topic)| {
            let area = topic.name.to_lowercase();
            let reason = if i == 0 {
                format!("Primary search: Question seems related to {area}")
            } else {
                format!("Fallback {i}: Also checking {area} for additional context")
            };
            SearchStep { topic: topic.id.clone(), pages: topic.pages.clone(), reason }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::classify_intent;
    use crate::knowledge::KnowledgeStore;
    use crate::types::{PageId, Topic};

    #[test]
    fn company_plan_starts_with_about_and_root() {
        let t = Taxonomy::builtin().expect("taxonomy");
        let steps = plan_search(&t, &classify_intent(&t, "What is MicroHabitat?"));
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].pages, vec![PageId::from("/about"), PageId::from("/")]);
        assert!(steps[0].reason.starts_with("Primary search"));
        assert!(steps[1].reason.starts_with("Fallback 1"));
        assert!(steps[2].reason.starts_with("Fallback 2"));
    }

    #[test]
    fn caps_at_three_steps() {
        let t = Taxonomy::builtin().expect("taxonomy");
        let all: Vec<TopicId> = t.topics().iter().map(|t| t.id.clone()).collect();
        assert_eq!(plan_search(&t, &all).len(), MAX_STEPS);
    }

    #[test]
    fn empty_page_topic_still_gets_a_step() {
        let t = Taxonomy::new(
            vec![Topic {
                id: "bare".into(),
                name: "Bare".into(),
                keywords: vec!["bare".into()],
                pages: vec![],
                fallbacks: vec![],
            }],
            vec!["bare".into()],
        )
        .expect("taxonomy");
        let steps = plan_search(&t, &["bare".into()]);
        assert_eq!(steps.len(), 1);
        assert!(steps[0].pages.is_empty());
    }

    #[test]
    fn planned_pages_are_known_to_the_store() {
        let t = Taxonomy::builtin().expect("taxonomy");
        let store = KnowledgeStore::builtin().expect("store");
        let known = store.pages();
        for q in ["What is MicroHabitat?", "How much does it cost?", "asdkj", "where are your offices", "LEED points"] {
            for step in plan_search(&t, &classify_intent(&t, q)) {
                assert!(step.pages.len() <= 3);
                for page in &step.pages {
                    assert!(known.contains(page), "{page} is not a known page");
                }
            }
        }
    }
}
