//! Prompt construction for both pipeline stages and the baselines.
//!
//! Base models and instruction-tuned models expect different framing. The
//! choice is made once in config and carried as a [`PromptStyle`]; every
//! builder goes through it instead of branching at the call site.

mod templates;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::observation::Observation;

pub use templates::{COT_EXEMPLARS, COT_STOP, REACT_EXEMPLARS};

/// Instruction-following convention of the target model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Plain completion: the prompt is continued as-is
    #[default]
    Base,
    /// Mistral-instruct style: the request is wrapped in `[INST]...[/INST]`
    Instruct,
}

impl PromptStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Base => "base",
            PromptStyle::Instruct => "instruct",
        }
    }

    /// Stage 1: few-shot exemplars, then the live problem, ending at `Thought:`
    pub fn stage1(&self, context: &str, question: &str) -> String {
        let body = format!(
            "{}\n\nContext: {}\nQuestion: {}\nLet's think step by step.\nThought:",
            REACT_EXEMPLARS, context, question
        );
        self.wrap(&body)
    }

    /// Stage 2: the stage-1 transcript plus the prover observation, ending at `FINAL ANSWER:`
    pub fn stage2(&self, stage1_transcript: &str, observation: Observation) -> String {
        match self {
            PromptStyle::Base => format!(
                "{}\nObservation: {}\nThought: The prover result was {}.\nI will now determine my final answer.\nFINAL ANSWER:",
                stage1_transcript, observation, observation
            ),
            PromptStyle::Instruct => format!(
                "[INST]\n{}\nOBSERVATION:{}\nThought: The prover result was {}.\nI will now determine my final answer.\nFINAL ANSWER:[/INST]",
                stage1_transcript, observation, observation
            ),
        }
    }

    /// Direct baseline: ask for a bare Yes/No
    pub fn direct(&self, context: &str, question: &str) -> String {
        let body = format!(
            "Context: {}\nQuestion: {}.\nRespond only either \"Yes\" or \"No\".\nFINAL ANSWER:",
            context, question
        );
        self.wrap(&body)
    }

    /// Chain-of-thought baseline: CoT exemplars, no prover
    pub fn chain_of_thought(&self, context: &str, question: &str) -> String {
        let body = format!(
            "{}\nContext: {}\nQuestion: {}.\nLet's think step by step.\nThought:",
            COT_EXEMPLARS, context, question
        );
        self.wrap(&body)
    }

    fn wrap(&self, body: &str) -> String {
        match self {
            PromptStyle::Base => body.to_string(),
            PromptStyle::Instruct => format!("[INST]{}[/INST]", body),
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage1_base_ends_at_thought() {
        let prompt = PromptStyle::Base.stage1("If P, Q.", "Is Q true?");
        assert!(prompt.starts_with("Example//"));
        assert!(prompt.ends_with("Context: If P, Q.\nQuestion: Is Q true?\nLet's think step by step.\nThought:"));
        assert!(!prompt.contains("[INST]"));
    }

    #[test]
    fn test_stage1_instruct_is_wrapped() {
        let prompt = PromptStyle::Instruct.stage1("If P, Q.", "Is Q true?");
        assert!(prompt.starts_with("[INST]Example//"));
        assert!(prompt.ends_with("Thought:[/INST]"));
    }

    #[test]
    fn test_stage1_is_deterministic() {
        let a = PromptStyle::Base.stage1("ctx", "q");
        let b = PromptStyle::Base.stage1("ctx", "q");
        assert_eq!(a, b);
    }

    #[test]
    fn test_stage2_repeats_observation() {
        let prompt = PromptStyle::Base.stage2("Thought: ...\nEND_PROVER9_INPUT", Observation::Proved);
        assert!(prompt.starts_with("Thought: ...\nEND_PROVER9_INPUT\nObservation: PROVED\n"));
        assert!(prompt.contains("The prover result was PROVED."));
        assert!(prompt.ends_with("FINAL ANSWER:"));
    }

    #[test]
    fn test_stage2_instruct_variant() {
        let prompt = PromptStyle::Instruct.stage2("T", Observation::Failed);
        assert!(prompt.starts_with("[INST]\nT\nOBSERVATION:FAILED\n"));
        assert!(prompt.ends_with("FINAL ANSWER:[/INST]"));
    }

    #[test]
    fn test_direct_prompt() {
        let prompt = PromptStyle::Base.direct("ctx", "q");
        assert_eq!(
            prompt,
            "Context: ctx\nQuestion: q.\nRespond only either \"Yes\" or \"No\".\nFINAL ANSWER:"
        );
    }

    #[test]
    fn test_cot_prompt_uses_cot_exemplars() {
        let prompt = PromptStyle::Instruct.chain_of_thought("ctx", "q");
        assert!(prompt.contains("The premises are (P -> Q)"));
        assert!(!prompt.contains("BEGIN_PROVER9_INPUT"));
        assert!(prompt.ends_with("Thought:[/INST]"));
    }

    #[test]
    fn test_style_serde_lowercase() {
        let style: PromptStyle = serde_json::from_str("\"instruct\"").unwrap();
        assert_eq!(style, PromptStyle::Instruct);
        assert_eq!(serde_json::to_string(&PromptStyle::Base).unwrap(), "\"base\"");
    }
}
