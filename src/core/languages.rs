//! Language registry: language key → remote runtime and starter snippet

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Key of the language executed in-process instead of remotely
pub const LOCAL_LANGUAGE: &str = "javascript";

/// A language offered by the playground
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageEntry {
    /// Registry key, exactly as the language selector sends it (e.g. "cpp")
    pub key: String,
    /// Language identifier understood by the remote execution API (e.g. "c++")
    pub api: String,
    /// Runtime version requested from the remote execution API
    pub version: String,
    /// Starter code loaded into the editor when the language is selected
    pub snippet: String,
}

/// Raw TOML configuration for a language
#[derive(Debug, Deserialize)]
struct RawLanguageConfig {
    api: String,
    version: String,
    #[serde(default)]
    snippet: Option<String>,
}

/// Immutable table of supported languages. Keys match exactly.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    entries: BTreeMap<String, LanguageEntry>,
}

impl LanguageRegistry {
    /// Parse a registry from TOML (one table per language key)
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let raw_configs: HashMap<String, RawLanguageConfig> = toml::from_str(content)?;

        let mut registry = Self::default();

        for (key, raw) in raw_configs {
            if raw.api.trim().is_empty() {
                anyhow::bail!("Missing api identifier for language {}", key);
            }
            if raw.version.trim().is_empty() {
                anyhow::bail!("Missing api version for language {}", key);
            }

            registry.entries.insert(
                key.clone(),
                LanguageEntry {
                    key,
                    api: raw.api,
                    version: raw.version,
                    snippet: raw.snippet.unwrap_or_default(),
                },
            );
        }

        Ok(registry)
    }

    /// The table compiled into the binary
    pub fn embedded() -> anyhow::Result<Self> {
        let content = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/languages.toml"));
        Self::from_toml(content).context("Invalid embedded languages.toml")
    }

    /// Load a registry from a TOML file on disk
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read languages config {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid languages config {}", path.display()))
    }

    /// Look up a language by its exact key
    pub fn lookup(&self, key: &str) -> Option<&LanguageEntry> {
        self.entries.get(key)
    }

    /// Starter snippet for a language, if it has a non-empty one
    pub fn snippet(&self, key: &str) -> Option<&str> {
        self.lookup(key)
            .map(|entry| entry.snippet.as_str())
            .filter(|snippet| !snippet.is_empty())
    }

    /// Whether `key` names the language run by the local sandbox
    pub fn is_local(&self, key: &str) -> bool {
        key == LOCAL_LANGUAGE
    }

    /// All language keys, sorted
    pub fn supported_languages(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// All entries, sorted by key
    pub fn entries(&self) -> impl Iterator<Item = &LanguageEntry> {
        self.entries.values()
    }
}

/// Global language registry
static LANGUAGES: OnceLock<LanguageRegistry> = OnceLock::new();

/// Initialize the language registry, from `path` when given, else from the embedded table
pub fn init_languages(path: Option<&Path>) -> anyhow::Result<&'static LanguageRegistry> {
    let registry = match path {
        Some(path) => LanguageRegistry::from_file(path)?,
        None => LanguageRegistry::embedded()?,
    };

    LANGUAGES
        .set(registry)
        .map_err(|_| anyhow::anyhow!("Languages already initialized"))?;

    Ok(registry_or_default())
}

/// Get the language registry
pub fn registry() -> &'static LanguageRegistry {
    registry_or_default()
}

fn registry_or_default() -> &'static LanguageRegistry {
    LANGUAGES.get_or_init(|| {
        warn!("Language registry not initialized, using embedded table");
        LanguageRegistry::embedded().unwrap_or_else(|e| {
            error!("{:#}", e);
            LanguageRegistry::default()
        })
    })
}
