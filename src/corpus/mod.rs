//! Corpus module - Benchmark loading and work unit iteration
//!
//! Loads a LogicBench-style benchmark (`samples[].qa_pairs[]`) and yields one
//! [`WorkUnit`] per question. The work unit's `qid` names every artifact the
//! pipeline writes, so it must stay stable across restarts.
//!
//! # Example
//!
//! ```no_run
//! use react_prover::corpus;
//! use std::path::Path;
//!
//! let benchmark = corpus::load(Path::new("LogicBench-BQA-bidirectional.json"))?;
//! for unit in benchmark.work_units() {
//!     println!("{}: {}", unit.qid, unit.question);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

mod internal;

use anyhow::Result;
use std::path::Path;

pub use internal::{Benchmark, QuestionItem, Sample, WorkUnit};

/// Load and validate a benchmark file
///
/// Fails if the file is unreadable, not valid JSON, or repeats a sample id.
pub fn load(path: &Path) -> Result<Benchmark> {
    internal::load(path)
}

/// Parse and validate a benchmark from a JSON string
pub fn parse(json: &str) -> Result<Benchmark> {
    internal::parse(json)
}

/// Build the artifact key for a question: `{sample_id:03}_q{index + 1}`
pub fn qid(sample_id: u32, question_index: usize) -> String {
    internal::qid(sample_id, question_index)
}
