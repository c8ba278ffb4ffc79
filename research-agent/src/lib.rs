//! # research-agent
//!
//! The research orchestrator. A run moves through three fixed phases with
//! no branching:
//!
//! 1. **Decompose**: the [`Generator`](research_model::Generator) splits the
//!    topic into sub-questions (at most three are kept).
//! 2. **Gather**: the [`Retriever`](research_rag::Retriever) fetches
//!    passages for each sub-question.
//! 3. **Synthesize**: the generator writes an Executive Summary, Key
//!    Findings, and Conclusion from the gathered passages.
//!
//! ```rust,ignore
//! let orchestrator = ResearchOrchestrator::new(generator, pipeline.retriever());
//! let result = orchestrator.run("sky color").await?;
//! println!("{}", result.report);
//! ```

pub mod error;
pub mod orchestrator;
pub mod phases;
pub mod prompts;

pub use error::{ResearchError, Result};
pub use orchestrator::{ResearchConfig, ResearchOrchestrator, ResearchReport};
pub use phases::{Evidence, EvidenceSection, decompose, gather, parse_sub_questions, synthesize};
