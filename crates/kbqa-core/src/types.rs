//! Domain types shared by the classifier, planner, retrieval strategies and
//! the answer pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a topic (knowledge area), e.g. `company` or `pricing`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(String);

impl TopicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TopicId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Route of a page on the site, e.g. `/about`. The root page is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A step page matches a section page when they are equal, or when the
    /// section lives below it. The root page only matches itself.
    pub fn covers(&self, section_page: &PageId) -> bool {
        if self.0 == section_page.0 {
            return true;
        }
        if self.0 == "/" {
            return false;
        }
        section_page
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A named bucket of subject matter with lexical cues, the pages it lives on
/// and the topics to consult next.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub keywords: Vec<String>,
    pub pages: Vec<PageId>,
    pub fallbacks: Vec<TopicId>,
}

/// Position of a section in the store's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub usize);

/// One titled, page-scoped chunk of answer-eligible content.
///
/// Immutable once the store is built. Embeddings are not stored here; the
/// semantic index owns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSection {
    pub id: SectionId,
    pub page: PageId,
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
}

impl KnowledgeSection {
    /// Text fed to the embedder for this section.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }

    /// Text contributed to the synthesizer context.
    pub fn context_text(&self) -> String {
        format!("{}: {}", self.title, self.content)
    }
}

/// One planner-emitted unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStep {
    pub topic: TopicId,
    pub pages: Vec<PageId>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub section: SectionId,
    pub score: f32,
}

/// Context selected for synthesis plus the trail of how it was found.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub sections: Vec<SectionId>,
    pub confidence: f32,
    pub trail: Vec<String>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Origin tag of a response returned to the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Curated,
    LanguageRedirect,
    SmartRetrieval,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub confidence: f32,
    pub reasoning: Vec<String>,
    pub sources: Vec<PageId>,
    pub source: ResponseSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_page_only_covers_itself() {
        let root = PageId::from("/");
        assert!(root.covers(&PageId::from("/")));
        assert!(!root.covers(&PageId::from("/about")));
    }

    #[test]
    fn page_covers_nested_routes_only_on_segment_boundary() {
        let cities = PageId::from("/cities");
        assert!(cities.covers(&PageId::from("/cities")));
        assert!(cities.covers(&PageId::from("/cities/montreal")));
        assert!(!cities.covers(&PageId::from("/cities-map")));
    }

    #[test]
    fn response_source_is_kebab_case() {
        let s = serde_json::to_string(&ResponseSource::LanguageRedirect).expect("serialize");
        assert_eq!(s, "\"language-redirect\"");
        let s = serde_json::to_string(&ResponseSource::SmartRetrieval).expect("serialize");
        assert_eq!(s, "\"smart-retrieval\"");
    }
}
