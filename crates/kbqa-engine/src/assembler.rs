use kbqa_core::config::{ContactSettings, SynthesisSettings};
use kbqa_core::types::{ChatResponse, KnowledgeSection, PageId, ResponseSource};

use crate::synthesis::Synthesis;

/// Final response policy: terminal not-found message, confidence merge,
/// contact-us suffix and source listing.
pub struct ResponseAssembler<'a> {
    contact: &'a ContactSettings,
    synthesis: &'a SynthesisSettings,
    empty_confidence: f32,
}

impl<'a> ResponseAssembler<'a> {
    pub fn new(contact: &'a ContactSettings, synthesis: &'a SynthesisSettings, empty_confidence: f32) -> Self {
        Self { contact, synthesis, empty_confidence }
    }

    pub fn not_found(&self, reasoning: Vec<String>) -> ChatResponse {
        ChatResponse {
            answer: self.contact.not_found(),
            confidence: self.empty_confidence,
            reasoning,
            sources: Vec::new(),
            source: ResponseSource::Fallback,
        }
    }

    pub fn assemble(
        &self,
        synthesis: Synthesis,
        retrieval_confidence: f32,
        sections: &[&KnowledgeSection],
        reasoning: Vec<String>,
    ) -> ChatResponse {
        let confidence = synthesis.confidence.max(retrieval_confidence).clamp(0.0, 1.0);
        let mut answer = synthesis.answer;
        if synthesis.replaced || confidence < self.synthesis.contact_threshold {
            answer.push_str("\n\n");
            answer.push_str(&self.contact.suffix());
        }
        ChatResponse {
            answer,
            confidence,
            reasoning,
            sources: dedup_pages(sections),
            source: ResponseSource::SmartRetrieval,
        }
    }
}

/// Pages of `sections`, first-seen order.
pub fn dedup_pages(sections: &[&KnowledgeSection]) -> Vec<PageId> {
    let mut out: Vec<PageId> = Vec::new();
    for s in sections {
        if !out.contains(&s.page) {
            out.push(s.page.clone());
        }
    }
    out
}
