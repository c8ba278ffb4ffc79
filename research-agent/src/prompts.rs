//! Prompt templates for the decomposition and synthesis phases.

/// Ask the model to break `topic` into sub-questions, one per line.
pub fn decomposition_prompt(topic: &str) -> String {
    format!(
        "Decompose the following research topic into 3 to 5 specific, self-contained \
         sub-questions that together cover it.\n\
         Write exactly one sub-question per line. Do not number them, do not use bullets, \
         and do not add any other text.\n\n\
         Topic: {topic}"
    )
}

/// Ask the model for a three-section report grounded only in `notes`.
pub fn synthesis_prompt(topic: &str, notes: &str) -> String {
    format!(
        "You are a research analyst. Write a report on the topic below using ONLY the \
         research notes provided.\n\n\
         Structure the report in exactly three sections, with these headings:\n\
         ## Executive Summary\n\
         ## Key Findings\n\
         ## Conclusion\n\n\
         If the notes do not contain the information needed to answer part of the topic, \
         say explicitly that it is not covered by the notes. Never invent facts, figures, \
         or sources that are not in the notes.\n\n\
         Topic: {topic}\n\n\
         Research notes:\n{notes}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposition_prompt_mentions_topic_and_line_format() {
        let prompt = decomposition_prompt("sky color");
        assert!(prompt.ends_with("Topic: sky color"));
        assert!(prompt.contains("one sub-question per line"));
    }

    #[test]
    fn synthesis_prompt_has_sections_and_no_fabrication_rule() {
        let prompt = synthesis_prompt("sky color", "The sky is blue.");
        for heading in ["## Executive Summary", "## Key Findings", "## Conclusion"] {
            assert!(prompt.contains(heading), "missing {heading}");
        }
        assert!(prompt.contains("not covered by the notes"));
        assert!(prompt.contains("Topic: sky color"));
        assert!(prompt.contains("The sky is blue."));
    }
}
