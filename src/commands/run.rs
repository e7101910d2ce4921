use anyhow::Result;

use react_prover::{corpus, Pipeline, RunConfig, TraceStore};

use super::check;

pub fn execute(config: &RunConfig, limit: Option<usize>) -> Result<()> {
    check::preflight(config)?;

    let benchmark = corpus::load(&config.dataset)?;
    let store = TraceStore::open(&config.out_dir)?;
    let generator = config.generator();
    let prover = config.prover();

    println!(
        "🚀 ReAct run: {} questions from {} ({} style, {} job{})",
        benchmark.question_count(),
        config.dataset.display(),
        config.prompt_style,
        config.jobs,
        if config.jobs == 1 { "" } else { "s" }
    );
    println!("   Traces: {}", config.out_dir.display());

    let pipeline = Pipeline::new(config, &generator, &prover, store);
    let units = benchmark.work_units().take(limit.unwrap_or(usize::MAX));
    let summary = pipeline.run(units)?;

    println!(
        "\n📊 {} completed, {} failed, {} skipped",
        summary.completed, summary.failed, summary.skipped
    );
    println!("\n--- Automated Two-Step ReAct Generation Complete ---");
    Ok(())
}
