//! Server configuration read from the environment.
//!
//! Every setting has a default, so an empty environment yields a server on
//! `127.0.0.1:8000` that embeds with a local Ollama model, keeps vectors in
//! memory, and writes reports with OpenAI. A variable that is set but does
//! not parse is a startup error rather than a silent fallback.

use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, bail};
use research_agent::ResearchConfig;
use research_rag::{ChunkingStrategy, DEFAULT_COLLECTION, RagConfig};

/// Uploads larger than this are rejected before reaching a handler.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderBackend {
    Ollama,
    OpenAI,
}

impl FromStr for EmbedderBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            other => Err(format!("unknown embedder '{other}' (expected ollama or openai)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    OpenAI,
    Ollama,
}

impl FromStr for GeneratorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown generator '{other}' (expected openai or ollama)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    InMemory,
    Qdrant,
}

impl FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Self::InMemory),
            "qdrant" => Ok(Self::Qdrant),
            other => Err(format!("unknown index '{other}' (expected memory or qdrant)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub collection: String,

    pub embedder: EmbedderBackend,
    /// Overrides the embedder's default model.
    pub embedding_model: Option<String>,
    pub embedding_dimensions: Option<usize>,

    pub generator: GeneratorBackend,
    /// Overrides the generator's default model.
    pub generation_model: Option<String>,
    pub temperature: f32,
    pub generation_timeout: Option<Duration>,

    pub index: IndexBackend,
    pub qdrant_url: String,

    pub ollama_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,

    pub rag: RagConfig,
    pub research: ResearchConfig,

    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            collection: DEFAULT_COLLECTION.to_string(),
            embedder: EmbedderBackend::Ollama,
            embedding_model: None,
            embedding_dimensions: None,
            generator: GeneratorBackend::OpenAI,
            generation_model: None,
            temperature: 0.0,
            generation_timeout: None,
            index: IndexBackend::InMemory,
            qdrant_url: "http://localhost:6334".to_string(),
            ollama_base_url: research_model::OLLAMA_BASE_URL.to_string(),
            openai_api_key: None,
            openai_base_url: None,
            rag: RagConfig::default(),
            research: ResearchConfig::default(),
            upload_dir: std::env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let rag = RagConfig::builder()
            .chunk_size(parse(&get, "RESEARCH_CHUNK_SIZE")?.unwrap_or(defaults.rag.chunk_size))
            .chunk_overlap(
                parse(&get, "RESEARCH_CHUNK_OVERLAP")?.unwrap_or(defaults.rag.chunk_overlap),
            )
            .strategy(parse::<ChunkingStrategy>(&get, "RESEARCH_CHUNKING")?.unwrap_or_default())
            .build()
            .context("invalid chunking configuration")?;

        let embedding_dimensions: Option<usize> = parse(&get, "RESEARCH_EMBEDDING_DIMENSIONS")?;
        if embedding_dimensions == Some(0) {
            bail!("RESEARCH_EMBEDDING_DIMENSIONS must be greater than zero");
        }

        let temperature: f32 = parse(&get, "RESEARCH_TEMPERATURE")?.unwrap_or(defaults.temperature);
        if !(0.0..=2.0).contains(&temperature) {
            bail!("RESEARCH_TEMPERATURE must be between 0 and 2, got {temperature}");
        }

        Ok(Self {
            host: get("RESEARCH_HOST").unwrap_or(defaults.host),
            port: parse(&get, "RESEARCH_PORT")?.unwrap_or(defaults.port),
            collection: get("RESEARCH_COLLECTION").unwrap_or(defaults.collection),
            embedder: parse(&get, "RESEARCH_EMBEDDER")?.unwrap_or(defaults.embedder),
            embedding_model: get("RESEARCH_EMBEDDING_MODEL"),
            embedding_dimensions,
            generator: parse(&get, "RESEARCH_GENERATOR")?.unwrap_or(defaults.generator),
            generation_model: get("RESEARCH_GENERATION_MODEL"),
            temperature,
            generation_timeout: parse::<u64>(&get, "RESEARCH_GENERATION_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            index: parse(&get, "RESEARCH_INDEX")?.unwrap_or(defaults.index),
            qdrant_url: get("QDRANT_URL").unwrap_or(defaults.qdrant_url),
            ollama_base_url: get("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            rag,
            research: defaults.research,
            upload_dir: get("RESEARCH_UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            max_upload_bytes: parse(&get, "RESEARCH_MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            log_format: parse(&get, "RESEARCH_LOG_FORMAT")?.unwrap_or_default(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    get(key)
        .map(|raw| raw.parse::<T>().map_err(|e| anyhow::anyhow!("invalid {key}='{raw}': {e}")))
        .transpose()
}
