use anyhow::{bail, Result};
use colored::*;

use react_prover::baseline::BaselineMode;
use react_prover::{RunConfig, TraceStore};

use super::trace_dir;

pub fn execute(config: &RunConfig, qid: &str, baseline: Option<BaselineMode>, json: bool) -> Result<()> {
    let dir = trace_dir(config, baseline);
    let store = TraceStore::open(&dir)?;
    if !store.exists(qid) {
        bail!("No trace for {} in {}", qid, dir.display());
    }
    let trace = store.load(qid)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    let outcome = trace.outcome.as_ref().map(|o| o.code()).unwrap_or("UNSEALED");
    println!("{}", format!("=== {} ({}, {}) ===", trace.qid, trace.strategy, trace.prompt_style).bright_cyan());
    println!("Question: {}", trace.question);
    println!(
        "States:   {}",
        trace
            .history
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    );
    if let Some(diagnostic) = trace.prover_diagnostic {
        let exit = trace
            .prover_exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("Prover:   {} (exit {})", diagnostic, exit);
    }
    let answer = trace.final_answer.map(|a| a.as_str()).unwrap_or("NONE");
    let status = format!("Outcome:  {} / answer {}", outcome, answer);
    if trace.outcome.as_ref().is_some_and(|o| o.is_success()) {
        println!("{}", status.green());
    } else {
        println!("{}", status.red());
    }
    println!("\n{}", trace.transcript());
    Ok(())
}
