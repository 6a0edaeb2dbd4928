//! Process-wide, read-only table of page-scoped knowledge sections.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{KnowledgeSection, PageId, SectionId};

/// Section as authored, before it is assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSpec {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// All sections of one page, as authored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSpec {
    pub page: PageId,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    sections: Vec<KnowledgeSection>,
}

impl KnowledgeStore {
    /// Build from authored pages, assigning ids in declaration order.
    /// Titles must be unique within a page.
    pub fn new(pages: Vec<PageSpec>) -> Result<Self> {
        let mut sections = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for page in pages {
            for spec in page.sections {
                if !seen.insert((page.page.as_str().to_string(), spec.title.clone())) {
                    return Err(Error::DuplicateSection { page: page.page.to_string(), title: spec.title });
                }
                let keywords = spec.keywords.iter().map(|k| k.to_lowercase()).collect();
                sections.push(KnowledgeSection {
                    id: SectionId(sections.len()),
                    page: page.page.clone(),
                    title: spec.title,
                    content: spec.content,
                    keywords,
                });
            }
        }
        Ok(Self { sections })
    }

    /// The hand-authored site knowledge shipped with the engine.
    pub fn builtin() -> Result<Self> {
        Self::new(crate::builtin::pages())
    }

    pub fn sections(&self) -> &[KnowledgeSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, id: SectionId) -> Option<&KnowledgeSection> {
        self.sections.get(id.0)
    }

    /// Distinct pages in first-seen order.
    pub fn pages(&self) -> Vec<PageId> {
        let mut out: Vec<PageId> = Vec::new();
        for s in &self.sections {
            if !out.contains(&s.page) {
                out.push(s.page.clone());
            }
        }
        out
    }

    /// Sections living on any of `pages`, in declaration order. An empty page
    /// list yields no sections.
    pub fn sections_for_pages(&self, pages: &[PageId]) -> Vec<&KnowledgeSection> {
        self.sections
            .iter()
            .filter(|s| pages.iter().any(|p| p.covers(&s.page)))
            .collect()
    }

    /// Resolve ids to sections, skipping ids the store does not know.
    pub fn resolve<'a>(&'a self, ids: &'a [SectionId]) -> impl Iterator<Item = &'a KnowledgeSection> + 'a {
        ids.iter().filter_map(move |id| self.get(*id))
    }
}
