//! Prover-free baselines: direct Yes/No and chain-of-thought prompting.
//!
//! Same corpus, same trace store, same resumability as the ReAct pipeline,
//! but one generation per question and no symbolic step.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::{GenerationClient, GenerationRequest};
use crate::config::{GenerationSettings, RunConfig};
use crate::corpus::WorkUnit;
use crate::extract::FinalAnswer;
use crate::pipeline::{run_units, PipelineState, RunSummary, UnitResult};
use crate::prompt::{PromptStyle, COT_STOP};
use crate::trace::{Strategy, Trace, TraceOutcome, TraceStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BaselineMode {
    /// Ask for a bare Yes/No
    Direct,
    /// Few-shot chain of thought ending in FINAL ANSWER
    Cot,
}

impl BaselineMode {
    pub fn strategy(&self) -> Strategy {
        match self {
            BaselineMode::Direct => Strategy::Direct,
            BaselineMode::Cot => Strategy::Cot,
        }
    }

    /// Prompt plus the request that carries it
    pub fn request(&self, style: PromptStyle, settings: &GenerationSettings, unit: &WorkUnit) -> GenerationRequest {
        match self {
            BaselineMode::Direct => GenerationRequest::greedy(
                style.direct(&unit.context, &unit.question),
                settings.baseline_max_tokens,
                settings.seed,
            ),
            BaselineMode::Cot => GenerationRequest::greedy(
                style.chain_of_thought(&unit.context, &unit.question),
                settings.baseline_max_tokens,
                settings.seed,
            )
            .with_stop(COT_STOP),
        }
    }
}

pub struct Baseline<'a> {
    generator: &'a dyn GenerationClient,
    store: TraceStore,
    mode: BaselineMode,
    style: PromptStyle,
    settings: GenerationSettings,
    jobs: usize,
}

impl<'a> Baseline<'a> {
    pub fn new(config: &RunConfig, mode: BaselineMode, generator: &'a dyn GenerationClient, store: TraceStore) -> Self {
        Self {
            generator,
            store,
            mode,
            style: config.prompt_style,
            settings: config.generation.clone(),
            jobs: config.jobs,
        }
    }

    pub fn store(&self) -> &TraceStore {
        &self.store
    }

    pub fn run(&self, units: impl IntoIterator<Item = WorkUnit>) -> Result<RunSummary> {
        let units: Vec<WorkUnit> = units.into_iter().collect();
        run_units(units, self.jobs, |unit| self.process_unit(unit))
    }

    pub fn process_unit(&self, unit: &WorkUnit) -> Result<UnitResult> {
        if self.store.exists(&unit.qid) {
            println!("Skipping already completed {}", unit.qid);
            return Ok(UnitResult::Skipped);
        }

        let mut trace = Trace::begin(unit, self.mode.strategy(), self.style);
        let request = self.mode.request(self.style, &self.settings, unit);
        let generation = self
            .generator
            .generate(&request)
            .with_context(|| format!("Generation failed for {}", unit.qid))?;

        let outcome = if generation.is_empty() {
            eprintln!("  ⚠️  No output for {}", unit.qid);
            trace.advance(PipelineState::TerminalFailure)?;
            TraceOutcome::GenerationEmpty { stage: 1 }
        } else {
            trace.final_answer = FinalAnswer::parse_labeled(&generation.generated_text);
            trace.advance(PipelineState::Stage1Done)?;
            TraceOutcome::Completed
        };
        trace.stage1_text = Some(generation.generated_text);
        trace.finish(outcome.clone())?;
        self.store.seal(&trace)?;

        println!(
            "{} {}: {}",
            self.mode.strategy(),
            unit.qid,
            trace.final_answer.map(|a| a.as_str()).unwrap_or(outcome.code())
        );
        Ok(UnitResult::Sealed(outcome))
    }
}
