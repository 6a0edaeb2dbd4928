use std::fs;

use tempfile::TempDir;

use kbqa_core::loader::KnowledgeLoader;
use kbqa_core::types::PageId;
use kbqa_core::Error;

#[test]
fn load_dir_reads_pages_in_path_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(
        dir.join("b_contact.toml"),
        "page = \"/contact\"\n[[sections]]\ntitle = \"Contact\"\ncontent = \"Write to us.\"\n",
    )
    .unwrap();
    fs::write(
        dir.join("a_about.toml"),
        "page = \"/about\"\n[[sections]]\ntitle = \"Story\"\ncontent = \"Founded in 2016.\"\nkeywords = [\"Story\"]\n",
    )
    .unwrap();
    let cities = "page = \"/cities/montreal\"\n[[sections]]\ntitle = \"Montreal\"\ncontent = \"HQ.\"\n";
    fs::write(dir.join("nested/c_cities.toml"), cities).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let store = KnowledgeLoader::new().load_dir(dir).expect("load");

    let pages: Vec<&str> = store.sections().iter().map(|s| s.page.as_str()).collect();
    assert_eq!(pages, vec!["/about", "/contact", "/cities/montreal"]);
    assert_eq!(store.sections()[0].keywords, vec!["story"]);
    assert!(store.sections()[1].keywords.is_empty());
    assert_eq!(store.sections_for_pages(&[PageId::from("/cities")]).len(), 1);
}

#[test]
fn empty_dir_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = KnowledgeLoader::new().load_dir(tmp.path()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn malformed_file_names_the_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.toml"), "[[sections]]\ntitle = \"No page\"\n").unwrap();
    match KnowledgeLoader::new().load_dir(tmp.path()) {
        Err(Error::InvalidConfig(msg)) => assert!(msg.contains("broken.toml"), "{msg}"),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn from_settings_uses_builtin_without_a_dir() {
    let settings = kbqa_core::config::KnowledgeSettings::default();
    let store = KnowledgeLoader::new().from_settings(&settings).unwrap();
    assert!(store.sections().iter().any(|s| s.title == "Company Overview"));

    let tmp = TempDir::new().unwrap();
    let page = "page = \"/x\"\n[[sections]]\ntitle = \"X\"\ncontent = \"Only one.\"\n";
    fs::write(tmp.path().join("p.toml"), page).unwrap();
    let settings = kbqa_core::config::KnowledgeSettings { dir: Some(tmp.path().to_string_lossy().into_owned()) };
    assert_eq!(KnowledgeLoader::new().from_settings(&settings).unwrap().len(), 1);
}
