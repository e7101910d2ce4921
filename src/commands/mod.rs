pub mod baseline;
pub mod check;
pub mod report;
pub mod run;
pub mod show;

use std::path::PathBuf;

use react_prover::baseline::BaselineMode;
use react_prover::paths;
use react_prover::RunConfig;

/// Trace directory for the ReAct run, or for one baseline mode
pub fn trace_dir(config: &RunConfig, baseline: Option<BaselineMode>) -> PathBuf {
    match baseline {
        Some(mode) => paths::baseline_dir(&config.out_dir, mode.strategy().as_str()),
        None => config.out_dir.clone(),
    }
}
