use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::knowledge::KnowledgeStore;
use crate::types::{PageId, Topic, TopicId};

/// Ordered, validated list of topics. Declaration order is the classifier's
/// tie-break, so it is kept exactly as given.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    topics: Vec<Topic>,
    defaults: Vec<TopicId>,
}

impl Taxonomy {
    /// Validate and build. `defaults` is the topic list returned when nothing
    /// in a question matches any keyword. Keywords are lower-cased.
    pub fn new(mut topics: Vec<Topic>, defaults: Vec<TopicId>) -> Result<Self> {
        if topics.is_empty() {
            return Err(Error::InvalidTaxonomy("no topics declared".into()));
        }
        let mut seen = HashSet::new();
        for t in &topics {
            if !seen.insert(t.id.clone()) {
                return Err(Error::InvalidTaxonomy(format!("duplicate topic '{}'", t.id)));
            }
        }
        for t in &topics {
            for fb in &t.fallbacks {
                if fb == &t.id {
                    return Err(Error::InvalidTaxonomy(format!("topic '{}' lists itself as a fallback", t.id)));
                }
                if !seen.contains(fb) {
                    return Err(Error::InvalidTaxonomy(format!(
                        "topic '{}' falls back to unknown topic '{}'",
                        t.id, fb
                    )));
                }
            }
        }
        if defaults.is_empty() {
            return Err(Error::InvalidTaxonomy("default topic set is empty".into()));
        }
        if let Some(missing) = defaults.iter().find(|d| !seen.contains(*d)) {
            return Err(Error::InvalidTaxonomy(format!("unknown default topic '{missing}'")));
        }
        for t in &mut topics {
            for k in &mut t.keywords {
                *k = k.to_lowercase();
            }
        }
        Ok(Self { topics, defaults })
    }

    /// The hand-authored taxonomy shipped with the engine.
    pub fn builtin() -> Result<Self> {
        crate::builtin::taxonomy()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
    pub fn defaults(&self) -> &[TopicId] {
        &self.defaults
    }

    pub fn get(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TopicId) -> bool {
        self.get(id).is_some()
    }

    /// Topic pages that resolve to no section in `store`, deduplicated.
    pub fn unknown_pages(&self, store: &KnowledgeStore) -> Vec<PageId> {
        let mut out: Vec<PageId> = Vec::new();
        for page in self.topics.iter().flat_map(|t| t.pages.iter()) {
            if out.contains(page) {
                continue;
            }
            if store.sections_for_pages(std::slice::from_ref(page)).is_empty() {
                out.push(page.clone());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(id: &str, fallbacks: &[&str]) -> Topic {
        Topic {
            id: id.into(),
            name: id.to_uppercase(),
            keywords: vec![id.to_string()],
            pages: vec![],
            fallbacks: fallbacks.iter().map(|f| TopicId::from(*f)).collect(),
        }
    }

    #[test]
    fn rejects_self_fallback() {
        let err = Taxonomy::new(vec![topic("a", &["a"])], vec!["a".into()]).unwrap_err();
        assert!(matches!(err, Error::InvalidTaxonomy(_)));
    }

    #[test]
    fn rejects_unknown_fallback_and_default() {
        assert!(Taxonomy::new(vec![topic("a", &["b"])], vec!["a".into()]).is_err());
        assert!(Taxonomy::new(vec![topic("a", &[])], vec!["z".into()]).is_err());
    }

    #[test]
    fn allows_two_topics_falling_back_to_each_other() {
        let t = Taxonomy::new(vec![topic("a", &["b"]), topic("b", &["a"])], vec!["a".into()]).expect("valid");
        assert_eq!(t.topics().len(), 2);
    }

    #[test]
    fn builtin_taxonomy_is_valid() {
        let t = Taxonomy::builtin().expect("builtin taxonomy");
        assert!(t.contains(&"company".into()));
        assert!(t.contains(&"pricing".into()));
        assert_eq!(t.defaults().len(), 3);
    }

    #[test]
    fn builtin_pages_all_resolve() {
        let taxonomy = Taxonomy::builtin().unwrap();
        let store = KnowledgeStore::builtin().unwrap();
        assert!(taxonomy.unknown_pages(&store).is_empty());
    }
}
