//! Sequencing of the research phases.

use std::sync::Arc;

use research_model::Generator;
use research_rag::Retriever;
use serde::Serialize;
use tracing::{Instrument, info, info_span};

use crate::error::{ResearchError, Result};
use crate::phases;

/// Tunables for a research run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchConfig {
    /// How many sub-questions are kept from the decomposition.
    pub max_sub_questions: usize,
    /// How many passages are retrieved per sub-question.
    pub evidence_per_question: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self { max_sub_questions: 3, evidence_per_question: 3 }
    }
}

/// The in-memory state of one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchReport {
    pub topic: String,
    pub sub_questions: Vec<String>,
    /// The labeled evidence blob handed to the synthesis prompt.
    pub context: String,
    pub report: String,
}

/// Runs decompose → gather → synthesize for a topic.
///
/// Holds no per-run state, so one instance serves concurrent requests.
pub struct ResearchOrchestrator {
    generator: Arc<dyn Generator>,
    retriever: Arc<Retriever>,
    config: ResearchConfig,
}

impl ResearchOrchestrator {
    pub fn new(generator: Arc<dyn Generator>, retriever: Arc<Retriever>) -> Self {
        Self::with_config(generator, retriever, ResearchConfig::default())
    }

    pub fn with_config(
        generator: Arc<dyn Generator>,
        retriever: Arc<Retriever>,
        config: ResearchConfig,
    ) -> Self {
        Self { generator, retriever, config }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Research `topic` and return the report with its intermediate state.
    ///
    /// # Errors
    ///
    /// [`ResearchError::InvalidTopic`] for a blank topic; otherwise the first
    /// retrieval or generation failure, unretried.
    pub async fn run(&self, topic: &str) -> Result<ResearchReport> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::InvalidTopic("topic must not be empty".to_string()));
        }

        let span = info_span!("research", topic, model = self.generator.name());
        async move {
            let sub_questions =
                phases::decompose(self.generator.as_ref(), topic, self.config.max_sub_questions)
                    .await?;

            let evidence = phases::gather(
                &self.retriever,
                &sub_questions,
                self.config.evidence_per_question,
            )
            .await?;
            let context = evidence.render();

            let report = phases::synthesize(self.generator.as_ref(), topic, &context).await?;

            info!(sub_questions = sub_questions.len(), "research complete");
            Ok::<_, ResearchError>(ResearchReport {
                topic: topic.to_string(),
                sub_questions,
                context,
                report,
            })
        }
        .instrument(span)
        .await
    }
}
