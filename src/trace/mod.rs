//! Per-question trace records and their write-once store.
//!
//! A trace is opened when a question starts, filled in at every stage
//! boundary, and sealed exactly once at the first terminal state. Success and
//! failure use the same artifact, so anything in the store has been
//! processed, and anything missing has not.

mod store;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::corpus::WorkUnit;
use crate::extract::{FinalAnswer, ProverProgram};
use crate::observation::{Observation, ProverDiagnostic};
use crate::pipeline::PipelineState;
use crate::prompt::PromptStyle;

pub use store::TraceStore;

/// How a question was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Two-stage generate → prove → answer
    React,
    /// Single prompt asking for Yes/No
    Direct,
    /// Single chain-of-thought prompt, no prover
    Cot,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::React => "react",
            Strategy::Direct => "direct",
            Strategy::Cot => "cot",
        }
    }

    /// Baselines stop after their only generation
    pub fn is_terminal(&self, state: PipelineState) -> bool {
        match self {
            Strategy::React => state.is_terminal(),
            Strategy::Direct | Strategy::Cot => {
                matches!(state, PipelineState::Stage1Done | PipelineState::TerminalFailure)
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceOutcome {
    Completed,
    /// Generation returned nothing after echo stripping
    GenerationEmpty { stage: u8 },
    /// Stage-1 text had no well-formed prover block
    ExtractionFailed { reason: String },
    /// Prover output classified as ERROR
    ProverError { diagnostic: ProverDiagnostic },
}

impl TraceOutcome {
    /// Error taxonomy code
    pub fn code(&self) -> &'static str {
        match self {
            TraceOutcome::Completed => "COMPLETED",
            TraceOutcome::GenerationEmpty { .. } => "GENERATION_EMPTY",
            TraceOutcome::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            TraceOutcome::ProverError {
                diagnostic: ProverDiagnostic::Timeout,
            } => "PROVER_TIMEOUT",
            TraceOutcome::ProverError { .. } => "PROVER_ERROR",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TraceOutcome::Completed)
    }
}

impl fmt::Display for TraceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Full record for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub qid: String,
    pub sample_id: u32,
    pub question_index: usize,
    pub question: String,
    pub strategy: Strategy,
    pub prompt_style: PromptStyle,
    pub state: PipelineState,
    /// Every state passed through, in order, starting at PENDING
    pub history: Vec<PipelineState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TraceOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage1_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProverProgram>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<Observation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prover_diagnostic: Option<ProverDiagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prover_exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage2_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<FinalAnswer>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sealed_at: Option<DateTime<Utc>>,
}

impl Trace {
    /// Open an empty trace in PENDING
    pub fn begin(unit: &WorkUnit, strategy: Strategy, prompt_style: PromptStyle) -> Self {
        Self {
            qid: unit.qid.clone(),
            sample_id: unit.sample_id,
            question_index: unit.question_index,
            question: unit.question.clone(),
            strategy,
            prompt_style,
            state: PipelineState::Pending,
            history: vec![PipelineState::Pending],
            outcome: None,
            stage1_text: None,
            program: None,
            observation: None,
            prover_diagnostic: None,
            prover_exit_code: None,
            stage2_text: None,
            final_answer: None,
            started_at: Utc::now(),
            sealed_at: None,
        }
    }

    /// Move to `next`, rejecting skipped or repeated states
    pub fn advance(&mut self, next: PipelineState) -> Result<()> {
        if self.is_sealed() {
            bail!("trace {} is sealed, cannot move to {}", self.qid, next);
        }
        if !self.state.can_advance_to(next) {
            bail!(
                "illegal transition for {}: {} -> {}",
                self.qid,
                self.state,
                next
            );
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Record the terminal outcome and mark the trace ready for the store
    pub fn finish(&mut self, outcome: TraceOutcome) -> Result<()> {
        if self.is_sealed() {
            bail!("trace {} is already sealed", self.qid);
        }
        if !self.strategy.is_terminal(self.state) {
            bail!(
                "trace {} cannot finish in non-terminal state {}",
                self.qid,
                self.state
            );
        }
        self.outcome = Some(outcome);
        self.sealed_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed_at.is_some()
    }

    /// Human-readable transcript in the `_full_trace.txt` layout
    pub fn transcript(&self) -> String {
        let stage1 = self.stage1_text.as_deref().unwrap_or("");
        match &self.outcome {
            Some(TraceOutcome::Completed) if self.strategy == Strategy::React => {
                let observation = self.observation.map(|o| o.as_str()).unwrap_or("");
                format!(
                    "{}\nObservation: {}\nThought: The prover result was {}.\nFINAL ANSWER:{}",
                    stage1,
                    observation,
                    observation,
                    self.stage2_text.as_deref().unwrap_or("")
                )
            }
            Some(TraceOutcome::Completed) => stage1.to_string(),
            Some(TraceOutcome::ExtractionFailed { reason }) => {
                format!("--- STEP 1 FAILED ({}) ---\n{}", reason, stage1)
            }
            Some(TraceOutcome::ProverError { diagnostic }) => {
                format!("--- STEP 2 FAILED (Prover Error: {}) ---\n{}", diagnostic, stage1)
            }
            Some(TraceOutcome::GenerationEmpty { stage }) => {
                format!("--- STAGE {} EMPTY ---\n{}", stage, stage1)
            }
            None => format!("--- IN PROGRESS ({}) ---\n{}", self.state, stage1),
        }
    }
}
