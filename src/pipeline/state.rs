//! Per-question state machine.
//!
//! ```text
//! PENDING ─▶ STAGE1_DONE ─▶ EXTRACTED ─▶ OBSERVED ─▶ STAGE2_DONE
//!    │            │              │            │
//!    │            ▼              ▼            │
//!    │      EXTRACT_FAILED  PROVER_ERROR      │
//!    │            │              │            │
//!    └────────────┴─▶ TERMINAL_FAILURE ◀──────┘
//! ```
//!
//! The PENDING and OBSERVED exits cover an empty generation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Pending,
    Stage1Done,
    Extracted,
    Observed,
    Stage2Done,
    ExtractFailed,
    ProverError,
    TerminalFailure,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Pending => "PENDING",
            PipelineState::Stage1Done => "STAGE1_DONE",
            PipelineState::Extracted => "EXTRACTED",
            PipelineState::Observed => "OBSERVED",
            PipelineState::Stage2Done => "STAGE2_DONE",
            PipelineState::ExtractFailed => "EXTRACT_FAILED",
            PipelineState::ProverError => "PROVER_ERROR",
            PipelineState::TerminalFailure => "TERMINAL_FAILURE",
        }
    }

    /// Legal single-step transitions
    pub fn can_advance_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Pending, Stage1Done)
                | (Pending, TerminalFailure)
                | (Stage1Done, Extracted)
                | (Stage1Done, ExtractFailed)
                | (Extracted, Observed)
                | (Extracted, ProverError)
                | (Observed, Stage2Done)
                | (Observed, TerminalFailure)
                | (ExtractFailed, TerminalFailure)
                | (ProverError, TerminalFailure)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Stage2Done | PipelineState::TerminalFailure)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineState::*;
    use super::*;

    const ALL: [PipelineState; 8] = [
        Pending,
        Stage1Done,
        Extracted,
        Observed,
        Stage2Done,
        ExtractFailed,
        ProverError,
        TerminalFailure,
    ];

    #[test]
    fn test_success_path() {
        let path = [Pending, Stage1Done, Extracted, Observed, Stage2Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(Stage2Done.is_terminal());
    }

    #[test]
    fn test_error_exits() {
        assert!(Stage1Done.can_advance_to(ExtractFailed));
        assert!(ExtractFailed.can_advance_to(TerminalFailure));
        assert!(Extracted.can_advance_to(ProverError));
        assert!(ProverError.can_advance_to(TerminalFailure));
        assert!(TerminalFailure.is_terminal());
        assert!(!ExtractFailed.is_terminal());
    }

    #[test]
    fn test_no_skips() {
        assert!(!Pending.can_advance_to(Extracted));
        assert!(!Stage1Done.can_advance_to(Observed));
        assert!(!Extracted.can_advance_to(Stage2Done));
        assert!(!Stage1Done.can_advance_to(ProverError));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for next in ALL {
            assert!(!Stage2Done.can_advance_to(next));
            assert!(!TerminalFailure.can_advance_to(next));
        }
    }

    #[test]
    fn test_no_self_loops() {
        for state in ALL {
            assert!(!state.can_advance_to(state));
        }
    }

    #[test]
    fn test_serde_literals() {
        assert_eq!(serde_json::to_string(&Stage1Done).unwrap(), "\"STAGE1_DONE\"");
        assert_eq!(serde_json::to_string(&ExtractFailed).unwrap(), "\"EXTRACT_FAILED\"");
    }
}
