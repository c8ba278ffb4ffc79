//! Shared handler state and backend wiring.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use research_agent::ResearchOrchestrator;
use research_model::{
    DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL, GenerationConfig, Generator, OllamaGenerator,
    OpenAIGenerator,
};
use research_rag::{
    Embedder, InMemoryVectorIndex, Ingestor, OllamaEmbedder, OpenAIEmbedder, RagPipeline,
    VectorIndex,
};
use tracing::info;

use crate::config::{EmbedderBackend, GeneratorBackend, IndexBackend, ServerConfig};

/// Cloned into every handler. Both halves are stateless between requests.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
    pub orchestrator: Arc<ResearchOrchestrator>,
    /// Where uploads are staged while they are ingested.
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(
        ingestor: Arc<Ingestor>,
        orchestrator: Arc<ResearchOrchestrator>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { ingestor, orchestrator, upload_dir: upload_dir.into() }
    }

    /// Build the configured backends and wire them into one pipeline.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let embedder = build_embedder(config)?;
        let index = build_index(config)?;
        let generator = build_generator(config)?;
        info!(
            embedder = embedder.name(),
            dimensions = embedder.dimensions(),
            generator = generator.name(),
            collection = %config.collection,
            "backends configured"
        );

        let pipeline = RagPipeline::builder()
            .config(config.rag.clone())
            .embedder(embedder)
            .vector_index(index)
            .collection(&config.collection)
            .build()
            .context("failed to build retrieval pipeline")?;

        let orchestrator = ResearchOrchestrator::with_config(
            generator,
            pipeline.retriever(),
            config.research.clone(),
        );

        std::fs::create_dir_all(&config.upload_dir).with_context(|| {
            format!("failed to create upload directory {}", config.upload_dir.display())
        })?;

        Ok(Self::new(pipeline.ingestor(), Arc::new(orchestrator), &config.upload_dir))
    }
}

fn build_embedder(config: &ServerConfig) -> anyhow::Result<Arc<dyn Embedder>> {
    match config.embedder {
        EmbedderBackend::Ollama => {
            let mut embedder = OllamaEmbedder::new().with_base_url(&config.ollama_base_url);
            match (&config.embedding_model, config.embedding_dimensions) {
                (Some(model), Some(dims)) => embedder = embedder.with_model(model, dims),
                (Some(model), None) => bail!(
                    "RESEARCH_EMBEDDING_DIMENSIONS is required with Ollama embedding model '{model}'"
                ),
                (None, Some(_)) => bail!(
                    "RESEARCH_EMBEDDING_DIMENSIONS needs RESEARCH_EMBEDDING_MODEL for Ollama"
                ),
                (None, None) => {}
            }
            Ok(Arc::new(embedder))
        }
        EmbedderBackend::OpenAI => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required for the OpenAI embedder")?;
            let mut embedder = OpenAIEmbedder::new(api_key)?;
            if let Some(model) = &config.embedding_model {
                if config.embedding_dimensions.is_none() {
                    bail!(
                        "RESEARCH_EMBEDDING_DIMENSIONS is required with OpenAI embedding model '{model}'"
                    );
                }
                embedder = embedder.with_model(model);
            }
            if let Some(dims) = config.embedding_dimensions {
                embedder = embedder.with_dimensions(dims);
            }
            if let Some(base_url) = &config.openai_base_url {
                embedder = embedder.with_base_url(base_url);
            }
            Ok(Arc::new(embedder))
        }
    }
}

fn build_generator(config: &ServerConfig) -> anyhow::Result<Arc<dyn Generator>> {
    let model = |default: &str| config.generation_model.clone().unwrap_or_else(|| default.into());
    let with_settings = |generation: GenerationConfig| {
        let generation = generation.with_temperature(config.temperature);
        match config.generation_timeout {
            Some(timeout) => generation.with_timeout(timeout),
            None => generation,
        }
    };

    match config.generator {
        GeneratorBackend::OpenAI => {
            let api_key = config
                .openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required for the OpenAI generator")?;
            let generation = with_settings(GenerationConfig::new(model(DEFAULT_OPENAI_MODEL)));
            let generator = match &config.openai_base_url {
                Some(base_url) => OpenAIGenerator::compatible(api_key, base_url, generation)?,
                None => OpenAIGenerator::new(api_key, generation)?,
            };
            Ok(Arc::new(generator))
        }
        GeneratorBackend::Ollama => {
            let generation = with_settings(GenerationConfig::new(model(DEFAULT_OLLAMA_MODEL)));
            Ok(Arc::new(OllamaGenerator::new(&config.ollama_base_url, generation)?))
        }
    }
}

fn build_index(config: &ServerConfig) -> anyhow::Result<Arc<dyn VectorIndex>> {
    match config.index {
        IndexBackend::InMemory => Ok(Arc::new(InMemoryVectorIndex::new())),
        #[cfg(feature = "qdrant")]
        IndexBackend::Qdrant => {
            Ok(Arc::new(research_rag::QdrantVectorIndex::new(&config.qdrant_url)?))
        }
        #[cfg(not(feature = "qdrant"))]
        IndexBackend::Qdrant => {
            bail!("RESEARCH_INDEX=qdrant requires building with the `qdrant` feature")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_needs_an_openai_key() {
        let err = AppState::from_config(&ServerConfig::default()).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn local_only_configuration_builds() {
        let upload_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            generator: GeneratorBackend::Ollama,
            upload_dir: upload_dir.path().join("staging"),
            ..ServerConfig::default()
        };

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.ingestor.collection(), "local_research");
        assert!(state.upload_dir.is_dir());
    }

    #[test]
    fn custom_openai_model_needs_dimensions() {
        let config = ServerConfig {
            embedder: EmbedderBackend::OpenAI,
            embedding_model: Some("text-embedding-3-large".to_string()),
            openai_api_key: Some("sk-test".to_string()),
            ..ServerConfig::default()
        };
        let err = AppState::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("RESEARCH_EMBEDDING_DIMENSIONS"));
    }

    #[test]
    fn openai_backends_build_with_model_and_dimensions() {
        let upload_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            embedder: EmbedderBackend::OpenAI,
            embedding_model: Some("text-embedding-3-large".to_string()),
            embedding_dimensions: Some(3072),
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: Some("http://localhost:9999/v1".to_string()),
            upload_dir: upload_dir.path().to_path_buf(),
            ..ServerConfig::default()
        };

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.ingestor.collection(), "local_research");
    }

    #[test]
    fn custom_ollama_model_needs_dimensions() {
        let config = ServerConfig {
            generator: GeneratorBackend::Ollama,
            embedding_model: Some("nomic-embed-text".to_string()),
            ..ServerConfig::default()
        };
        let err = AppState::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("RESEARCH_EMBEDDING_DIMENSIONS"));
    }
}
