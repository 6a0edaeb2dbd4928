//! Loads a Knowledge Store from a directory of TOML page files.
//!
//! ```toml
//! page = "/about"
//!
//! [[sections]]
//! title = "Our Story"
//! content = "Founded in 2016 ..."
//! keywords = ["story", "founded"]
//! ```
use figment::{
    providers::{Format, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use crate::config::{expand_path, KnowledgeSettings};
use crate::error::{Error, Result};
use crate::knowledge::{KnowledgeStore, PageSpec};

#[derive(Default)]
pub struct KnowledgeLoader;

impl KnowledgeLoader {
    pub fn new() -> Self {
        Self
    }

    /// The configured page directory, or the built-in knowledge when none is set.
    pub fn from_settings(&self, settings: &KnowledgeSettings) -> Result<KnowledgeStore> {
        match settings.dir.as_deref() {
            Some(dir) => self.load_dir(&expand_path(dir)),
            None => KnowledgeStore::builtin(),
        }
    }

    pub fn load_dir(&self, dir: &Path) -> Result<KnowledgeStore> {
        let pages = self.read_pages(dir)?;
        let store = KnowledgeStore::new(pages)?;
        tracing::info!(dir = %dir.display(), sections = store.len(), "loaded knowledge store");
        Ok(store)
    }

    /// Parse every page file under `dir`, in path order.
    pub fn read_pages(&self, dir: &Path) -> Result<Vec<PageSpec>> {
        let files = self.list_toml_files(dir);
        if files.is_empty() {
            return Err(Error::NotFound(format!("no .toml page files under {}", dir.display())));
        }
        let mut pages = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            tracing::debug!("Reading page file {}/{}: {}", i + 1, files.len(), file.display());
            let page: PageSpec = Figment::from(Toml::file(file))
                .extract()
                .map_err(|e| Error::InvalidConfig(format!("{}: {e}", file.display())))?;
            pages.push(page);
        }
        Ok(pages)
    }

    fn list_toml_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("toml"))
            .collect();
        files.sort();
        files
    }
}
