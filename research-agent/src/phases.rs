//! The three research phases.
//!
//! Each phase takes only what it needs and returns only what it produces;
//! [`ResearchOrchestrator`](crate::ResearchOrchestrator) threads the values
//! from one to the next.

use research_model::Generator;
use research_rag::Retriever;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::prompts;

/// Passages retrieved for one sub-question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceSection {
    /// The sub-question that drove the retrieval.
    pub sub_question: String,
    /// Retrieved chunk text, most similar first.
    pub passages: Vec<String>,
}

/// Everything gathered for a topic, in sub-question order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evidence {
    pub sections: Vec<EvidenceSection>,
}

impl Evidence {
    /// Total number of passages across all sections.
    pub fn passage_count(&self) -> usize {
        self.sections.iter().map(|s| s.passages.len()).sum()
    }

    /// Render the evidence as one labeled text blob.
    ///
    /// Passages are not de-duplicated across sub-questions.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            out.push_str(&format!("### Sub-question {}: {}\n", i + 1, section.sub_question));
            if section.passages.is_empty() {
                out.push_str("(no relevant passages found)");
            } else {
                out.push_str(&section.passages.join("\n\n"));
            }
        }
        out
    }
}

/// Split a model response into sub-questions.
///
/// Lines are trimmed and blank lines dropped; at most `max` are kept. If
/// nothing survives, the topic itself becomes the only sub-question.
pub fn parse_sub_questions(response: &str, topic: &str, max: usize) -> Vec<String> {
    let questions: Vec<String> = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(max)
        .map(str::to_string)
        .collect();

    if questions.is_empty() { vec![topic.trim().to_string()] } else { questions }
}

/// Phase 1: ask the model to break the topic into at most `max` sub-questions.
pub async fn decompose(generator: &dyn Generator, topic: &str, max: usize) -> Result<Vec<String>> {
    let response = generator.complete(&prompts::decomposition_prompt(topic)).await?;
    let sub_questions = parse_sub_questions(&response, topic, max);
    info!(count = sub_questions.len(), "decomposed topic");
    debug!(?sub_questions, "sub-questions");
    Ok(sub_questions)
}

/// Phase 2: retrieve up to `k` passages for each sub-question, in order.
pub async fn gather(retriever: &Retriever, sub_questions: &[String], k: usize) -> Result<Evidence> {
    let mut sections = Vec::with_capacity(sub_questions.len());
    for sub_question in sub_questions {
        let passages = retriever.search(sub_question, k).await?;
        debug!(sub_question = %sub_question, passages = passages.len(), "gathered evidence");
        sections.push(EvidenceSection { sub_question: sub_question.clone(), passages });
    }

    let evidence = Evidence { sections };
    info!(passages = evidence.passage_count(), "gathered evidence for all sub-questions");
    Ok(evidence)
}

/// Phase 3: write the three-section report from the rendered evidence.
pub async fn synthesize(generator: &dyn Generator, topic: &str, context: &str) -> Result<String> {
    let report = generator.complete(&prompts::synthesis_prompt(topic, context)).await?;
    info!(report_len = report.len(), "synthesized report");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_trims_and_skips_blanks() {
        let response = "  What is X?  \n\n\tHow does X work?\n   \nWhy does X matter?\n";
        assert_eq!(
            parse_sub_questions(response, "X", 3),
            vec!["What is X?", "How does X work?", "Why does X matter?"]
        );
    }

    #[test]
    fn keeps_only_the_first_max_lines() {
        let response = "q1\nq2\nq3\nq4\nq5";
        assert_eq!(parse_sub_questions(response, "topic", 3), vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn falls_back_to_topic_when_nothing_parses() {
        assert_eq!(parse_sub_questions("", "sky color", 3), vec!["sky color"]);
        assert_eq!(parse_sub_questions(" \n\t\n  ", "sky color", 3), vec!["sky color"]);
    }

    #[test]
    fn handles_windows_line_endings() {
        assert_eq!(parse_sub_questions("a?\r\nb?\r\n", "t", 3), vec!["a?", "b?"]);
    }

    #[test]
    fn render_labels_sections_in_order() {
        let evidence = Evidence {
            sections: vec![
                EvidenceSection {
                    sub_question: "What color is the sky?".to_string(),
                    passages: vec!["The sky is blue.".to_string(), "Sunsets are red.".to_string()],
                },
                EvidenceSection { sub_question: "Why?".to_string(), passages: vec![] },
            ],
        };

        let rendered = evidence.render();
        assert_eq!(
            rendered,
            "### Sub-question 1: What color is the sky?\nThe sky is blue.\n\nSunsets are red.\n\n\
             ### Sub-question 2: Why?\n(no relevant passages found)"
        );
        assert_eq!(evidence.passage_count(), 2);
    }
}
