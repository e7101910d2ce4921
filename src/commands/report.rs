use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;

use react_prover::baseline::BaselineMode;
use react_prover::{RunConfig, Trace, TraceStore};

use super::trace_dir;

#[derive(Debug, Default, Serialize)]
struct Report {
    directory: String,
    total: usize,
    by_strategy: BTreeMap<String, usize>,
    by_outcome: BTreeMap<String, usize>,
    observations: BTreeMap<String, usize>,
    final_answers: BTreeMap<String, usize>,
}

impl Report {
    fn tally(directory: String, traces: &[Trace]) -> Self {
        let mut report = Report {
            directory,
            total: traces.len(),
            ..Default::default()
        };
        for trace in traces {
            *report.by_strategy.entry(trace.strategy.to_string()).or_default() += 1;
            let outcome = trace.outcome.as_ref().map(|o| o.code()).unwrap_or("UNSEALED");
            *report.by_outcome.entry(outcome.to_string()).or_default() += 1;
            if let Some(observation) = trace.observation {
                *report.observations.entry(observation.to_string()).or_default() += 1;
            }
            let answer = trace.final_answer.map(|a| a.as_str()).unwrap_or("NONE");
            *report.final_answers.entry(answer.to_string()).or_default() += 1;
        }
        report
    }
}

fn print_counts(title: &str, counts: &BTreeMap<String, usize>, total: usize) {
    if counts.is_empty() {
        return;
    }
    println!("\n{}", title.bold());
    for (key, count) in counts {
        let pct = if total == 0 { 0.0 } else { *count as f64 * 100.0 / total as f64 };
        println!("  {:<20} {:>5}  ({:.1}%)", key, count, pct);
    }
}

pub fn execute(config: &RunConfig, baseline: Option<BaselineMode>, json: bool) -> Result<()> {
    let dir = trace_dir(config, baseline);
    let traces = if dir.is_dir() {
        TraceStore::open(&dir)?.list()?
    } else {
        Vec::new()
    };
    let report = Report::tally(dir.display().to_string(), &traces);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", format!("\n📊 Trace report: {}", report.directory).bright_cyan());
    if report.total == 0 {
        println!("  No traces yet");
        return Ok(());
    }
    println!("  {} traces", report.total);

    print_counts("Strategy", &report.by_strategy, report.total);
    print_counts("Outcome", &report.by_outcome, report.total);
    print_counts("Observation", &report.observations, report.total);
    print_counts("Final answer", &report.final_answers, report.total);

    let completed = report.by_outcome.get("COMPLETED").copied().unwrap_or(0);
    let summary = format!("\n{} of {} completed", completed, report.total);
    if completed == report.total {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use react_prover::observation::Observation;
    use react_prover::pipeline::PipelineState;
    use react_prover::prompt::PromptStyle;
    use react_prover::trace::{Strategy, TraceOutcome};
    use react_prover::WorkUnit;

    fn trace(qid: &str) -> Trace {
        let unit = WorkUnit {
            qid: qid.to_string(),
            sample_id: 1,
            question_index: 0,
            context: String::new(),
            question: "q?".to_string(),
        };
        Trace::begin(&unit, Strategy::React, PromptStyle::Base)
    }

    #[test]
    fn test_tally_counts_outcomes_and_observations() {
        let mut failed = trace("001_q1");
        failed.advance(PipelineState::Stage1Done).unwrap();
        failed.advance(PipelineState::ExtractFailed).unwrap();
        failed.advance(PipelineState::TerminalFailure).unwrap();
        failed
            .finish(TraceOutcome::ExtractionFailed {
                reason: "missing".to_string(),
            })
            .unwrap();

        let mut proved = trace("001_q2");
        proved.observation = Some(Observation::Proved);

        let report = Report::tally("out".to_string(), &[failed, proved]);
        assert_eq!(report.total, 2);
        assert_eq!(report.by_strategy["react"], 2);
        assert_eq!(report.by_outcome["EXTRACTION_FAILED"], 1);
        assert_eq!(report.by_outcome["UNSEALED"], 1);
        assert_eq!(report.observations["PROVED"], 1);
        assert_eq!(report.final_answers["NONE"], 2);
    }
}
