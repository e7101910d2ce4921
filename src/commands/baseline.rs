use anyhow::Result;

use react_prover::baseline::{Baseline, BaselineMode};
use react_prover::{corpus, RunConfig, TraceStore};

use super::{check, trace_dir};

pub fn execute(config: &RunConfig, mode: BaselineMode, limit: Option<usize>) -> Result<()> {
    check::preflight_generator(config)?;

    let benchmark = corpus::load(&config.dataset)?;
    let dir = trace_dir(config, Some(mode));
    let store = TraceStore::open(&dir)?;
    let generator = config.generator();

    println!(
        "🚀 {} baseline: {} questions ({} style)",
        mode.strategy(),
        benchmark.question_count(),
        config.prompt_style
    );
    println!("   Traces: {}", dir.display());

    let baseline = Baseline::new(config, mode, &generator, store);
    let units = benchmark.work_units().take(limit.unwrap_or(usize::MAX));
    let summary = baseline.run(units)?;

    println!(
        "\n📊 {} completed, {} failed, {} skipped",
        summary.completed, summary.failed, summary.skipped
    );
    Ok(())
}
