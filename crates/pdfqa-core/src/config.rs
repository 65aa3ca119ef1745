//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (nested keys separated by `__`, e.g.
//! `APP_RETRIEVAL__TOP_K=3`). Paths may use `~` and `${VAR}`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Defaults overlaid with a single TOML file; no environment layers.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!("config file {}", path.display())).into());
        }
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(path));
        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// The full typed settings, validated.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub embed: EmbedSettings,
    pub splitter: SplitterSettings,
    pub retrieval: RetrievalSettings,
    pub wiki: WikiSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub pdf_dir: String,
    pub index_dir: String,
    pub table: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self { pdf_dir: "research_papers".to_string(), index_dir: "vector_index".to_string(), table: "chunks".to_string() }
    }
}

impl DataSettings {
    pub fn pdf_dir_path(&self) -> PathBuf { expand_path(&self.pdf_dir) }
    pub fn index_dir_path(&self) -> PathBuf { expand_path(&self.index_dir) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedSettings {
    pub model_id: String,
    pub model_dir: String,
    pub max_len: usize,
    pub batch_size: usize,
    /// Use the hashed fake embedder instead of loading model weights.
    pub fake: bool,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            batch_size: 32,
            fake: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterSettings {
    fn default() -> Self { Self { chunk_size: 800, chunk_overlap: 100 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub threshold: f32,
    pub max_answer_chars: usize,
    /// Below this best score the inspector warns that the PDFs may not cover the question.
    pub low_similarity_hint: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { top_k: 2, threshold: 0.55, max_answer_chars: 1000, low_similarity_hint: 0.45 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiSettings {
    pub api_url: String,
    pub max_results: usize,
    pub sentences: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for WikiSettings {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            max_results: 2,
            sentences: 4,
            timeout_secs: 10,
            user_agent: format!("pdfqa/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));
        if self.retrieval.top_k == 0 { return invalid("retrieval.top_k must be at least 1".into()); }
        if !(0.0..=1.0).contains(&self.retrieval.threshold) {
            return invalid(format!("retrieval.threshold must be within [0, 1], got {}", self.retrieval.threshold));
        }
        // room for at least one character before the truncation marker
        if self.retrieval.max_answer_chars <= 4 { return invalid("retrieval.max_answer_chars must be greater than 4".into()); }
        if self.splitter.chunk_size == 0 { return invalid("splitter.chunk_size must be at least 1".into()); }
        if self.splitter.chunk_overlap >= self.splitter.chunk_size {
            return invalid(format!(
                "splitter.chunk_overlap ({}) must be smaller than splitter.chunk_size ({})",
                self.splitter.chunk_overlap, self.splitter.chunk_size
            ));
        }
        if self.embed.batch_size == 0 { return invalid("embed.batch_size must be at least 1".into()); }
        if self.wiki.max_results == 0 { return invalid("wiki.max_results must be at least 1".into()); }
        if self.wiki.sentences == 0 { return invalid("wiki.sentences must be at least 1".into()); }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
