//! # research-model
//!
//! Text generation for the deep research service.
//!
//! A [`Generator`] takes one prompt and returns one completion. Two
//! backends are provided, chosen by configuration:
//!
//! - [`OpenAIGenerator`]: OpenAI chat completions (or any compatible server)
//! - [`OllamaGenerator`]: a local Ollama server
//!
//! ```rust,ignore
//! use research_model::{GenerationConfig, Generator, OllamaGenerator};
//!
//! let generator = OllamaGenerator::local(GenerationConfig::new("llama3.1"))?;
//! let answer = generator.complete("Why is the sky blue?").await?;
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod ollama;
pub mod openai;

pub use config::GenerationConfig;
pub use error::{ModelError, Result};
pub use generator::Generator;
pub use ollama::{DEFAULT_OLLAMA_MODEL, OLLAMA_BASE_URL, OllamaGenerator};
pub use openai::{DEFAULT_OPENAI_MODEL, OpenAIGenerator};
