//! Prover verdict classification.
//!
//! The transcript is matched by substring in a fixed order: success marker,
//! then failure marker, then anything else. `PROVED` and `FAILED` are logical
//! results that go back to the model; `ERROR` ends the question early.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default success literal printed by Prover9
pub const THEOREM_PROVED: &str = "THEOREM PROVED";

/// Default failure literal printed by Prover9 when the search space is exhausted
pub const SEARCH_FAILED: &str = "SEARCH FAILED";

/// Outcome shown to the model in stage 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Observation {
    Proved,
    Failed,
    Error,
}

impl Observation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Observation::Proved => "PROVED",
            Observation::Failed => "FAILED",
            Observation::Error => "ERROR",
        }
    }

    /// Whether this outcome may be presented to the model as a logical result
    pub fn is_logical(&self) -> bool {
        !matches!(self, Observation::Error)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the classifier reached its verdict
///
/// `Unrecognized` and `Timeout` both mean `ERROR`; they stay apart so a
/// prover that ran but printed nothing useful can be told from one that
/// never finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProverDiagnostic {
    TheoremProved,
    SearchFailed,
    Unrecognized,
    Timeout,
}

impl ProverDiagnostic {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProverDiagnostic::TheoremProved => "THEOREM_PROVED",
            ProverDiagnostic::SearchFailed => "SEARCH_FAILED",
            ProverDiagnostic::Unrecognized => "UNRECOGNIZED",
            ProverDiagnostic::Timeout => "TIMEOUT",
        }
    }

    pub fn observation(&self) -> Observation {
        match self {
            ProverDiagnostic::TheoremProved => Observation::Proved,
            ProverDiagnostic::SearchFailed => Observation::Failed,
            ProverDiagnostic::Unrecognized | ProverDiagnostic::Timeout => Observation::Error,
        }
    }
}

impl fmt::Display for ProverDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker-based transcript classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    pub success_marker: String,
    pub failure_marker: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            success_marker: THEOREM_PROVED.to_string(),
            failure_marker: SEARCH_FAILED.to_string(),
        }
    }
}

impl Classifier {
    pub fn new(success_marker: impl Into<String>, failure_marker: impl Into<String>) -> Self {
        Self {
            success_marker: success_marker.into(),
            failure_marker: failure_marker.into(),
        }
    }

    /// Classify a completed prover transcript
    pub fn classify(&self, transcript: &str) -> ProverDiagnostic {
        if transcript.contains(&self.success_marker) {
            ProverDiagnostic::TheoremProved
        } else if transcript.contains(&self.failure_marker) {
            ProverDiagnostic::SearchFailed
        } else {
            ProverDiagnostic::Unrecognized
        }
    }

    /// Classify a prover run, short-circuiting on timeout
    pub fn classify_run(&self, transcript: &str, timed_out: bool) -> ProverDiagnostic {
        if timed_out {
            ProverDiagnostic::Timeout
        } else {
            self.classify(transcript)
        }
    }
}
