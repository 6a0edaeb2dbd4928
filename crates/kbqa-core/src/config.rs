//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_RETRIEVAL__EARLY_STOP_CONFIDENCE`).
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Sections kept by the lexical engine.
    pub lexical_top_k: usize,
    /// Minimum relaxed score for the broad fallback pass.
    pub broad_min_score: f32,
    /// Sections taken from each semantic step.
    pub semantic_top_k_per_step: usize,
    /// Cap on de-duplicated semantic context sections.
    pub semantic_max_sections: usize,
    pub step_confidence: f32,
    pub max_confidence: f32,
    pub early_stop_sections: usize,
    pub early_stop_confidence: f32,
    /// Confidence reported when nothing was found.
    pub empty_confidence: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            lexical_top_k: 3,
            broad_min_score: 2.0,
            semantic_top_k_per_step: 2,
            semantic_max_sections: 4,
            step_confidence: 0.3,
            max_confidence: 0.9,
            early_stop_sections: 3,
            early_stop_confidence: 0.6,
            empty_confidence: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisSettings {
    /// Extractive answers scoring below this are replaced by the top section.
    pub min_extraction_score: f32,
    /// Answers of either mode shorter than this are replaced by the top section.
    pub min_answer_chars: usize,
    /// Final confidence below this appends the contact sentence.
    pub contact_threshold: f32,
    pub min_paragraph_chars: usize,
    pub max_paragraphs: usize,
    pub raw_context_chars: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            min_extraction_score: 0.1,
            min_answer_chars: 20,
            contact_threshold: 0.3,
            min_paragraph_chars: 20,
            max_paragraphs: 3,
            raw_context_chars: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ModelSettings {
    /// Directory of the sentence-embedding model (config.json, tokenizer.json, weights).
    pub embedder_dir: Option<String>,
    /// Directory of the extractive QA model.
    pub qa_dir: Option<String>,
    /// Use the deterministic hashing embedder instead of loading weights.
    pub use_fake_embeddings: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// Directory of TOML page files; the built-in table is used when unset.
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContactSettings {
    pub email: String,
    pub demo_url: String,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self { email: "info@microhabitat.com".to_string(), demo_url: "www.microhabitat.com".to_string() }
    }
}

impl ContactSettings {
    /// Sentence appended to low-confidence answers.
    pub fn suffix(&self) -> String {
        format!(
            "For more specific information, please contact us at {} or book a demo at {}.",
            self.email, self.demo_url
        )
    }

    /// Terminal answer when retrieval finds nothing.
    pub fn not_found(&self) -> String {
        format!(
            "I couldn't find specific information about that on our website. For personalized assistance, please contact us at {} or book a demo at {}.",
            self.email, self.demo_url
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub synthesis: SynthesisSettings,
    pub models: ModelSettings,
    pub knowledge: KnowledgeSettings,
    pub contact: ContactSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let r = &self.retrieval;
        let s = &self.synthesis;
        let unit = [
            ("retrieval.step_confidence", r.step_confidence),
            ("retrieval.max_confidence", r.max_confidence),
            ("retrieval.early_stop_confidence", r.early_stop_confidence),
            ("retrieval.empty_confidence", r.empty_confidence),
            ("synthesis.min_extraction_score", s.min_extraction_score),
            ("synthesis.contact_threshold", s.contact_threshold),
        ];
        for (key, v) in unit {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::InvalidConfig(format!("{key} must be within [0, 1], got {v}")));
            }
        }
        let counts = [
            ("retrieval.lexical_top_k", r.lexical_top_k),
            ("retrieval.semantic_top_k_per_step", r.semantic_top_k_per_step),
            ("retrieval.semantic_max_sections", r.semantic_max_sections),
            ("synthesis.max_paragraphs", s.max_paragraphs),
        ];
        for (key, v) in counts {
            if v == 0 {
                return Err(Error::InvalidConfig(format!("{key} must be greater than zero")));
            }
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    base: PathBuf,
}

impl Config {
    /// Layered config from `dir` for the environment named by `RUST_ENV`
    /// (default `dev`).
    pub fn load(dir: &Path) -> Self {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        tracing::debug!(dir = %dir.display(), env = %env_name, "loading config");
        Self::for_env(dir, &env_name)
    }

    /// Layer defaults, `<dir>/config.toml`, the env-specific file and `APP_*`
    /// variables. Missing files are skipped.
    pub fn for_env(dir: &Path, env_name: &str) -> Self {
        let mut figment =
            Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self { figment, base: dir.to_path_buf() }
    }

    /// Validated settings. Relative knowledge and model directories are
    /// resolved against the config directory.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        for dir in [&mut settings.knowledge.dir, &mut settings.models.embedder_dir, &mut settings.models.qa_dir] {
            if let Some(p) = dir.as_mut() {
                *p = resolve_with_base(&self.base, p.as_str()).to_string_lossy().into_owned();
            }
        }
        Ok(settings)
    }
}

/// Expand `~` and `$VAR`/`${VAR}` in a configured path. Not canonicalized.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let raw = input.as_ref();
    let with_env = shellexpand::env(raw).unwrap_or(std::borrow::Cow::Borrowed(raw));
    PathBuf::from(shellexpand::tilde(&with_env).as_ref())
}

/// Expanded `p`, joined onto `base` unless already absolute.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
