use kbqa_core::config::RetrievalSettings;
use kbqa_core::intent::classify_intent;
use kbqa_core::knowledge::{KnowledgeStore, PageSpec, SectionSpec};
use kbqa_core::planner::plan_search;
use kbqa_core::taxonomy::Taxonomy;
use kbqa_core::types::{SearchStep, Topic};
use kbqa_lexical::LexicalRetriever;

fn titles(store: &KnowledgeStore, ids: &[kbqa_core::types::SectionId]) -> Vec<String> {
    store.resolve(ids).map(|s| s.title.clone()).collect()
}

fn run(question: &str) -> (KnowledgeStore, kbqa_core::types::RetrievalResult) {
    let taxonomy = Taxonomy::builtin().unwrap();
    let store = KnowledgeStore::builtin().unwrap();
    let settings = RetrievalSettings::default();
    let steps = plan_search(&taxonomy, &classify_intent(&taxonomy, question));
    let result = LexicalRetriever::new(&store, &settings).retrieve(question, &steps);
    (store, result)
}

#[test]
fn company_question_finds_company_overview_first() {
    let (store, result) = run("What is MicroHabitat?");
    let found = titles(&store, &result.sections);
    assert_eq!(found.first().map(String::as_str), Some("Company Overview"));
    assert!(result.sections.len() <= 3);
    assert!(result.trail[0].starts_with("Primary search"));
    assert!(result.confidence > 0.0 && result.confidence <= 0.9);
}

#[test]
fn cost_question_ranks_pricing_above_company_overview() {
    let (store, result) = run("How much does it cost?");
    let found = titles(&store, &result.sections);
    assert_eq!(found[0], "Pricing and Investment");
    if let Some(pos) = found.iter().position(|t| t == "Company Overview") {
        assert!(pos > 0);
    }
}

#[test]
fn gibberish_exhausts_plan_and_broad_search() {
    let (_, result) = run("asdkj qwoeiru");
    assert!(result.is_empty());
    assert!((result.confidence - 0.1).abs() < 1e-6);
    assert!(result.trail.iter().any(|t| t.contains("broadening")));
    assert!(result.trail.iter().any(|t| t.contains("Broad search found nothing")));
}

fn two_page_store() -> KnowledgeStore {
    let section =
        |title: &str, content: &str| SectionSpec { title: title.into(), content: content.into(), keywords: vec![] };
    KnowledgeStore::new(vec![
        PageSpec {
            page: "/a".into(),
            sections: vec![section("Alpha", "compost bins and worms"), section("Beta", "worms and compost piles")],
        },
        PageSpec { page: "/b".into(), sections: vec![section("Gamma", "rooftop beehive honey harvest")] },
    ])
    .unwrap()
}

fn step(pages: &[&str]) -> SearchStep {
    SearchStep {
        topic: "t".into(),
        pages: pages.iter().map(|p| (*p).into()).collect(),
        reason: format!("search {}", pages.join(",")),
    }
}

#[test]
fn equal_scores_keep_declaration_order() {
    let store = two_page_store();
    let settings = RetrievalSettings::default();
    let result = LexicalRetriever::new(&store, &settings).retrieve("compost worms", &[step(&["/a"])]);
    assert_eq!(titles(&store, &result.sections), vec!["Alpha", "Beta"]);
}

#[test]
fn broad_search_runs_when_plan_misses() {
    let store = two_page_store();
    let settings = RetrievalSettings::default();
    let result = LexicalRetriever::new(&store, &settings).retrieve("beehive honey", &[step(&["/a"])]);
    assert_eq!(titles(&store, &result.sections), vec!["Gamma"]);
    assert!((result.confidence - 0.3).abs() < 1e-6);
}

#[test]
fn broad_search_ignores_single_word_coincidence() {
    let store = two_page_store();
    let settings = RetrievalSettings::default();
    let result = LexicalRetriever::new(&store, &settings).retrieve("honey", &[step(&["/a"])]);
    assert!(result.is_empty());
}

#[test]
fn empty_and_unknown_page_steps_are_skipped() {
    let store = two_page_store();
    let settings = RetrievalSettings::default();
    let steps = [step(&[]), step(&["/missing"]), step(&["/a"])];
    let result = LexicalRetriever::new(&store, &settings).retrieve("compost", &steps);
    assert_eq!(result.sections.len(), 2);
    assert!(result.trail.iter().any(|t| t.contains("No content found for (no pages)")));
    assert!(result.trail.iter().any(|t| t.contains("No content found for /missing")));
}

#[test]
fn topic_without_pages_plans_a_step_that_retrieval_tolerates() {
    let taxonomy = Taxonomy::new(
        vec![Topic {
            id: "bare".into(),
            name: "Bare".into(),
            keywords: vec!["compost".into()],
            pages: vec![],
            fallbacks: vec![],
        }],
        vec!["bare".into()],
    )
    .unwrap();
    let store = two_page_store();
    let settings = RetrievalSettings::default();
    let steps = plan_search(&taxonomy, &classify_intent(&taxonomy, "compost worms"));
    let result = LexicalRetriever::new(&store, &settings).retrieve("compost worms", &steps);
    // the plan has nothing to search, so the broad pass supplies the context
    assert_eq!(titles(&store, &result.sections), vec!["Alpha", "Beta"]);
}
