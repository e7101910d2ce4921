use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use react_prover::{corpus, RunConfig, TraceStore};

/// Locate an executable: bare names through PATH, anything else on disk
fn locate(executable: &Path) -> Option<PathBuf> {
    if executable.components().count() == 1 && !executable.is_absolute() {
        which::which(executable).ok()
    } else if executable.is_file() {
        Some(executable.to_path_buf())
    } else {
        None
    }
}

/// Refuse to start a run that cannot possibly reach the prover
pub fn preflight(config: &RunConfig) -> Result<()> {
    preflight_generator(config)?;
    if locate(&config.prover_executable).is_none() {
        bail!(
            "Prover not found: {} (set [prover].executable)",
            config.prover_executable.display()
        );
    }
    Ok(())
}

/// Generator and model checks, shared by the baselines
pub fn preflight_generator(config: &RunConfig) -> Result<()> {
    if locate(&config.generator_executable).is_none() {
        bail!(
            "Generator not found: {} (set [generator].executable)",
            config.generator_executable.display()
        );
    }
    if !config.model.is_file() {
        bail!("Model file not found: {}", config.model.display());
    }
    Ok(())
}

/// Print a checklist; returns whether everything needed for a run is present
pub fn execute(config: &RunConfig) -> Result<bool> {
    println!("🔍 Checking run environment...\n");
    let mut healthy = true;

    for (label, executable) in [
        ("Generator", &config.generator_executable),
        ("Prover", &config.prover_executable),
    ] {
        match locate(executable) {
            Some(found) => println!("  ✓ {}: {}", label, found.display()),
            None => {
                println!("  ❌ {}: {} not found", label, executable.display());
                healthy = false;
            }
        }
    }

    if config.model.is_file() {
        println!("  ✓ Model: {}", config.model.display());
    } else {
        println!("  ❌ Model: {} not found", config.model.display());
        healthy = false;
    }
    println!("  ✓ Prompt style: {}", config.prompt_style);
    println!("  ✓ Prover timeout: {}s", config.prover_timeout.as_secs());

    match corpus::load(&config.dataset) {
        Ok(benchmark) => {
            let total = benchmark.question_count();
            println!(
                "  ✓ Dataset: {} ({} samples, {} questions)",
                config.dataset.display(),
                benchmark.samples.len(),
                total
            );

            let pending = if config.out_dir.is_dir() {
                let store = TraceStore::open(&config.out_dir)?;
                benchmark.work_units().filter(|u| !store.exists(&u.qid)).count()
            } else {
                total
            };
            println!(
                "  ✓ Traces: {} ({} done, {} pending)",
                config.out_dir.display(),
                total - pending,
                pending
            );
        }
        Err(e) => {
            println!("  ❌ Dataset: {:#}", e);
            healthy = false;
        }
    }

    println!();
    if healthy {
        println!("✅ Ready to run");
    } else {
        println!("⚠️  Fix the items above before running");
    }
    Ok(healthy)
}
