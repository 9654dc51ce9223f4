//! Prospector configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ProspectorError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProspectorConfig {
    /// Directory holding the knowledge snapshot.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

fn default_data_dir() -> String { "~/.prospector/data".into() }

impl Default for ProspectorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            ingest: IngestConfig::default(),
            index: IndexConfig::default(),
            graph: GraphConfig::default(),
            embeddings: EmbeddingsConfig::default(),
            generation: GenerationConfig::default(),
            context: ContextConfig::default(),
            gateway: GatewayConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl ProspectorConfig {
    /// Load config from the default path (~/.prospector/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProspectorError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ProspectorError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProspectorError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Prospector home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".prospector")
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        expand_path(&self.data_dir)
    }
}

/// Expand a leading `~` in a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

/// Document ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Document ingested when no explicit path is given.
    #[serde(default = "default_document_path")]
    pub document_path: String,
    /// Pages with this many characters or fewer are skipped.
    #[serde(default = "default_min_page_chars")]
    pub min_page_chars: usize,
    /// Below this many characters the source is probably image-only.
    #[serde(default = "default_short_text_threshold")]
    pub short_text_threshold: usize,
}

fn default_document_path() -> String { "data/raw/prospectus.pdf".into() }
fn default_min_page_chars() -> usize { 50 }
fn default_short_text_threshold() -> usize { 10_000 }

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            document_path: default_document_path(),
            min_page_chars: default_min_page_chars(),
            short_text_threshold: default_short_text_threshold(),
        }
    }
}

/// Chunking and retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_stride")]
    pub stride: usize,
    /// Chunks with this many characters or fewer are dropped.
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_window() -> usize { 1000 }
fn default_stride() -> usize { 500 }
fn default_min_chunk_chars() -> usize { 50 }
fn default_top_k() -> usize { 50 }

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            stride: default_stride(),
            min_chunk_chars: default_min_chunk_chars(),
            top_k: default_top_k(),
        }
    }
}

/// Entity graph extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// How far past an entity match to look for leadership roles.
    #[serde(default = "default_lookahead_chars")]
    pub lookahead_chars: usize,
    /// Entity names must be shorter than this.
    #[serde(default = "default_max_name_chars")]
    pub max_name_chars: usize,
    /// Merge new extractions into the persisted graph instead of replacing it.
    #[serde(default = "bool_true")]
    pub merge_on_ingest: bool,
}

fn bool_true() -> bool { true }
fn default_lookahead_chars() -> usize { 1500 }
fn default_max_name_chars() -> usize { 100 }

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            lookahead_chars: default_lookahead_chars(),
            max_name_chars: default_max_name_chars(),
            merge_on_ingest: true,
        }
    }
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// "openai" (any OpenAI-compatible /embeddings server) or "hash" (offline).
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

fn default_embedding_provider() -> String { "openai".into() }
fn default_embedding_endpoint() -> String { "http://localhost:8080/v1".into() }
fn default_embedding_model() -> String { "sentence-transformers/all-MiniLM-L6-v2".into() }
fn default_dimension() -> usize { 384 }
fn default_batch_size() -> usize { 32 }
fn default_embedding_timeout() -> u64 { 60 }

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            dimension: default_dimension(),
            batch_size: default_batch_size(),
            api_key: String::new(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

/// Answer generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Endpoint used when a caller does not pass one.
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_generation_api_key")]
    pub api_key: String,
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_endpoint() -> String { "http://localhost:8000/v1".into() }
fn default_generation_model() -> String { "Qwen/Qwen2.5-3B-Instruct".into() }
fn default_temperature() -> f32 { 0.1 }
fn default_max_tokens() -> u32 { 600 }
fn default_generation_api_key() -> String { "EMPTY".into() }
fn default_generation_timeout() -> u64 { 120 }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generation_endpoint(),
            model: default_generation_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: default_generation_api_key(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

impl GenerationConfig {
    /// API key with `PROSPECTOR_API_KEY` taking precedence over the file.
    pub fn resolved_api_key(&self) -> String {
        std::env::var("PROSPECTOR_API_KEY").unwrap_or_else(|_| self.api_key.clone())
    }
}

/// Hybrid context configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_max_context_chars")]
    pub max_chars: usize,
}

fn default_max_context_chars() -> usize { 20_000 }

impl Default for ContextConfig {
    fn default() -> Self {
        Self { max_chars: default_max_context_chars() }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 8000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Heuristic vocabularies. Bump `version` whenever a list changes meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_rules_version")]
    pub version: u32,
    /// Questions containing any of these are refused outright.
    #[serde(default = "default_forbidden_terms")]
    pub forbidden_terms: Vec<String>,
    #[serde(default = "default_refusal_message")]
    pub refusal_message: String,
    /// Regex fragments for degree-level tokens.
    #[serde(default = "default_degree_patterns")]
    pub degree_patterns: Vec<String>,
    /// Words that end a degree phrase.
    #[serde(default = "default_degree_stop_words")]
    pub degree_stop_words: Vec<String>,
    /// Nouns that mark a topic request ("Safety related programs").
    #[serde(default = "default_topic_markers")]
    pub topic_markers: Vec<String>,
    /// Conversational filler dropped from generic questions.
    #[serde(default = "default_filler_words")]
    pub filler_words: Vec<String>,
    /// Organizational unit keywords that open an entity.
    #[serde(default = "default_unit_keywords")]
    pub unit_keywords: Vec<String>,
    /// Leadership roles turned into `HAS_<ROLE>` relations.
    #[serde(default = "default_role_keywords")]
    pub role_keywords: Vec<String>,
    #[serde(default = "default_honorifics")]
    pub honorifics: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_rules_version() -> u32 { 1 }
fn default_forbidden_terms() -> Vec<String> {
    strings(&["fee", "tuition", "hostel", "transport", "cost", "bus", "dues"])
}
fn default_refusal_message() -> String { "I only answer department/academic information.".into() }
fn default_degree_patterns() -> Vec<String> {
    strings(&[r"M\.Sc\.", r"B\.Sc\.", r"Ph\.D\.", "MS", "Bachelors?", "Masters?"])
}
fn default_degree_stop_words() -> Vec<String> {
    strings(&["should", "can", "does", "is", "department", "in", "at", "select", "offered"])
}
fn default_topic_markers() -> Vec<String> {
    strings(&["program", "degree", "master"])
}
fn default_filler_words() -> Vec<String> {
    strings(&[
        "i", "live", "near", "uet", "campus", "want", "to", "apply", "have", "a", "degree", "in",
        "can", "does", "do", "is", "are", "should", "please", "tell", "me", "the", "of", "for",
    ])
}
fn default_unit_keywords() -> Vec<String> {
    strings(&["Faculty", "Department", "Institute", "Center", "School"])
}
fn default_role_keywords() -> Vec<String> {
    strings(&["Dean", "Chairman", "Director", "Head"])
}
fn default_honorifics() -> Vec<String> {
    strings(&["Prof", "Dr", "Engr", "Mr", "Ms"])
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            version: default_rules_version(),
            forbidden_terms: default_forbidden_terms(),
            refusal_message: default_refusal_message(),
            degree_patterns: default_degree_patterns(),
            degree_stop_words: default_degree_stop_words(),
            topic_markers: default_topic_markers(),
            filler_words: default_filler_words(),
            unit_keywords: default_unit_keywords(),
            role_keywords: default_role_keywords(),
            honorifics: default_honorifics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProspectorConfig::default();
        assert_eq!(config.index.window, 1000);
        assert_eq!(config.index.stride, 500);
        assert_eq!(config.index.top_k, 50);
        assert_eq!(config.context.max_chars, 20_000);
        assert_eq!(config.generation.model, "Qwen/Qwen2.5-3B-Instruct");
        assert!((config.generation.temperature - 0.1).abs() < 0.001);
        assert!(config.graph.merge_on_ingest);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            data_dir = "/tmp/prospector"

            [embeddings]
            provider = "hash"
            dimension = 64

            [rules]
            forbidden_terms = ["parking"]
        "#;

        let config: ProspectorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, "/tmp/prospector");
        assert_eq!(config.embeddings.provider, "hash");
        assert_eq!(config.embeddings.dimension, 64);
        assert_eq!(config.embeddings.batch_size, 32);
        assert_eq!(config.rules.forbidden_terms, vec!["parking".to_string()]);
        assert_eq!(config.rules.unit_keywords.len(), 5);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: ProspectorConfig = toml::from_str("").unwrap();
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.ingest.short_text_threshold, 10_000);
        assert_eq!(config.rules.refusal_message, "I only answer department/academic information.");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ProspectorConfig::default();
        config.index.top_k = 7;
        config.save_to(&path).unwrap();

        let loaded = ProspectorConfig::load_from(&path).unwrap();
        assert_eq!(loaded.index.top_k, 7);
        assert_eq!(loaded.rules.degree_patterns, config.rules.degree_patterns);
    }

    #[test]
    fn test_home_dir() {
        let home = ProspectorConfig::home_dir();
        assert!(home.to_string_lossy().contains("prospector"));
    }
}
