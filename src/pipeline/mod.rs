//! Two-stage ReAct pipeline.
//!
//! Per question: generate a Prover9 program, run the prover, show the verdict
//! to the model, read its final answer. Failures that belong to one question
//! are sealed into its trace and the loop moves on. Errors returned from
//! here mean the environment is broken and the run stops.

mod state;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::client::{GenerationClient, GenerationRequest, ProverClient};
use crate::config::{GenerationSettings, RunConfig};
use crate::corpus::WorkUnit;
use crate::extract::{self, FinalAnswer, END_MARKER};
use crate::observation::Classifier;
use crate::prompt::PromptStyle;
use crate::trace::{Strategy, Trace, TraceOutcome, TraceStore};

pub use state::PipelineState;

/// What happened to one work unit in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitResult {
    /// A trace already existed; nothing was called
    Skipped,
    /// Processed now and sealed with this outcome
    Sealed(TraceOutcome),
}

/// Counts for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub skipped: usize,
    pub completed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &UnitResult) {
        match result {
            UnitResult::Skipped => self.skipped += 1,
            UnitResult::Sealed(outcome) if outcome.is_success() => self.completed += 1,
            UnitResult::Sealed(_) => self.failed += 1,
        }
    }

    /// Units processed in this run (not skipped)
    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }
}

/// Drive `process` over `units`, sequentially or on a rayon pool
///
/// Stops at the first error; units already sealed stay sealed.
pub fn run_units<F>(units: Vec<WorkUnit>, jobs: usize, process: F) -> Result<RunSummary>
where
    F: Fn(&WorkUnit) -> Result<UnitResult> + Sync,
{
    if jobs <= 1 {
        let mut summary = RunSummary::default();
        for unit in &units {
            summary.record(&process(unit)?);
        }
        return Ok(summary);
    }

    let summary = Mutex::new(RunSummary::default());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to build worker pool")?;

    pool.install(|| {
        units.par_iter().try_for_each(|unit| -> Result<()> {
            let result = process(unit)?;
            summary.lock().record(&result);
            Ok(())
        })
    })?;

    Ok(summary.into_inner())
}

pub struct Pipeline<'a> {
    generator: &'a dyn GenerationClient,
    prover: &'a dyn ProverClient,
    store: TraceStore,
    style: PromptStyle,
    settings: GenerationSettings,
    classifier: Classifier,
    jobs: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &RunConfig,
        generator: &'a dyn GenerationClient,
        prover: &'a dyn ProverClient,
        store: TraceStore,
    ) -> Self {
        Self {
            generator,
            prover,
            store,
            style: config.prompt_style,
            settings: config.generation.clone(),
            classifier: config.classifier.clone(),
            jobs: config.jobs,
        }
    }

    pub fn store(&self) -> &TraceStore {
        &self.store
    }

    /// Process every unit that has no trace yet
    pub fn run(&self, units: impl IntoIterator<Item = WorkUnit>) -> Result<RunSummary> {
        let units: Vec<WorkUnit> = units.into_iter().collect();
        run_units(units, self.jobs, |unit| self.process_unit(unit))
    }

    /// Skip if already traced, otherwise run all stages and seal the trace
    pub fn process_unit(&self, unit: &WorkUnit) -> Result<UnitResult> {
        if self.store.exists(&unit.qid) {
            println!("Skipping already completed {}", unit.qid);
            return Ok(UnitResult::Skipped);
        }

        println!("\n=== PROCESSING {} ===", unit.qid);
        let trace = self.execute(unit)?;
        self.store.seal(&trace)?;

        let outcome = trace
            .outcome
            .clone()
            .unwrap_or(TraceOutcome::Completed);
        match &outcome {
            TraceOutcome::Completed => {
                let answer = trace.final_answer.map(|a| a.as_str()).unwrap_or("?");
                println!("  ✓ Successfully processed and saved {} (answer: {})", unit.qid, answer);
            }
            failure => println!("  ❌ {} recorded for {}", failure, unit.qid),
        }
        Ok(UnitResult::Sealed(outcome))
    }

    /// Run the stages and return a finished (not yet stored) trace
    pub fn execute(&self, unit: &WorkUnit) -> Result<Trace> {
        let qid = unit.qid.as_str();
        let mut trace = Trace::begin(unit, Strategy::React, self.style);

        // Stage 1: thought + action
        println!("  Step 1: Generating formal logic action...");
        let prompt1 = self.style.stage1(&unit.context, &unit.question);
        let request = GenerationRequest::greedy(prompt1, self.settings.stage1_max_tokens, self.settings.seed)
            .with_stop(END_MARKER);
        let generation = self
            .generator
            .generate(&request)
            .with_context(|| format!("Stage 1 generation failed for {}", qid))?;

        if generation.is_empty() {
            eprintln!("  ⚠️  Stage 1 produced no text for {}", qid);
            trace.stage1_text = Some(generation.generated_text);
            trace.advance(PipelineState::TerminalFailure)?;
            trace.finish(TraceOutcome::GenerationEmpty { stage: 1 })?;
            return Ok(trace);
        }

        let stage1 = if self.settings.restore_stop_sequence {
            extract::restore_terminator(&generation.generated_text, END_MARKER)
        } else {
            generation.generated_text
        };
        trace.stage1_text = Some(stage1.clone());
        trace.advance(PipelineState::Stage1Done)?;

        let program = match extract::extract_program(&stage1) {
            Ok(program) => program,
            Err(e) => {
                println!("  -> FAILED: no valid Prover9 block for {} ({})", qid, e);
                trace.advance(PipelineState::ExtractFailed)?;
                trace.advance(PipelineState::TerminalFailure)?;
                trace.finish(TraceOutcome::ExtractionFailed {
                    reason: e.to_string(),
                })?;
                return Ok(trace);
            }
        };
        println!("  ... Extracted Prover Input:\n---\n{}\n---", program.input());
        trace.program = Some(program.clone());
        trace.advance(PipelineState::Extracted)?;

        // Stage 2: prover observation
        println!("  Step 2: Running Prover9 for {}...", qid);
        let run = self
            .prover
            .prove(qid, &program)
            .with_context(|| format!("Prover could not be run for {}", qid))?;
        let diagnostic = self.classifier.classify_run(&run.transcript, run.timed_out);
        let observation = diagnostic.observation();
        trace.prover_diagnostic = Some(diagnostic);
        trace.prover_exit_code = run.exit_code;
        trace.observation = Some(observation);

        if !observation.is_logical() {
            println!("  -> FAILED: prover error for {} ({})", qid, diagnostic);
            trace.advance(PipelineState::ProverError)?;
            trace.advance(PipelineState::TerminalFailure)?;
            trace.finish(TraceOutcome::ProverError { diagnostic })?;
            return Ok(trace);
        }
        trace.advance(PipelineState::Observed)?;

        // Stage 3: final answer
        println!("  Step 3: Generating final answer with observation: {}...", observation);
        let prompt2 = self.style.stage2(&stage1, observation);
        let request = GenerationRequest::greedy(prompt2, self.settings.stage2_max_tokens, self.settings.seed);
        let generation = self
            .generator
            .generate(&request)
            .with_context(|| format!("Stage 2 generation failed for {}", qid))?;

        if generation.is_empty() {
            eprintln!("  ⚠️  Stage 2 produced no text for {}", qid);
            trace.stage2_text = Some(generation.generated_text);
            trace.advance(PipelineState::TerminalFailure)?;
            trace.finish(TraceOutcome::GenerationEmpty { stage: 2 })?;
            return Ok(trace);
        }

        trace.final_answer = FinalAnswer::parse(&generation.generated_text);
        trace.stage2_text = Some(generation.generated_text);
        trace.advance(PipelineState::Stage2Done)?;
        trace.finish(TraceOutcome::Completed)?;
        Ok(trace)
    }
}
