//! Internal implementation for corpus module

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// =============================================================================
// Benchmark Types
// =============================================================================

/// Top-level benchmark document
///
/// Extra top-level fields (`type`, `axiom`, ...) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Benchmark {
    #[serde(default)]
    pub samples: Vec<Sample>,
}

/// One scenario description with its questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub id: u32,
    pub context: String,
    #[serde(default)]
    pub qa_pairs: Vec<QuestionItem>,
}

/// A question about a sample's context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionItem {
    pub question: String,
    /// Ground-truth label, carried through but never read by the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// One (sample, question) pair - the unit the pipeline processes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub qid: String,
    pub sample_id: u32,
    pub question_index: usize,
    pub context: String,
    pub question: String,
}

impl Benchmark {
    /// Iterate work units in corpus order: samples as listed, questions by position
    pub fn work_units(&self) -> impl Iterator<Item = WorkUnit> + '_ {
        self.samples.iter().flat_map(|sample| {
            sample
                .qa_pairs
                .iter()
                .enumerate()
                .map(move |(index, pair)| WorkUnit {
                    qid: qid(sample.id, index),
                    sample_id: sample.id,
                    question_index: index,
                    context: sample.context.clone(),
                    question: pair.question.clone(),
                })
        })
    }

    /// Total number of questions across all samples
    pub fn question_count(&self) -> usize {
        self.samples.iter().map(|s| s.qa_pairs.len()).sum()
    }

    /// Reject benchmarks whose qids would collide
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for sample in &self.samples {
            if !seen.insert(sample.id) {
                bail!(
                    "duplicate sample id {} - question ids would not be unique",
                    sample.id
                );
            }
        }
        Ok(())
    }
}

// =============================================================================
// Loading
// =============================================================================

pub fn qid(sample_id: u32, question_index: usize) -> String {
    format!("{:03}_q{}", sample_id, question_index + 1)
}

pub fn parse(json: &str) -> Result<Benchmark> {
    let benchmark: Benchmark =
        serde_json::from_str(json).context("Failed to parse benchmark JSON")?;
    benchmark.validate()?;
    Ok(benchmark)
}

pub fn load(path: &Path) -> Result<Benchmark> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read benchmark {}", path.display()))?;
    parse(&contents).with_context(|| format!("Invalid benchmark {}", path.display()))
}
