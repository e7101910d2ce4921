//! External collaborators: the text generator and the theorem prover.
//!
//! Both are synchronous and blocking. Each is a trait so the pipeline can be
//! driven by scripted fakes in tests and by subprocess-backed implementations
//! in real runs.

pub mod generation;
pub mod process;
pub mod prover;

pub use generation::{GenerationClient, GenerationRequest, GenerationResult, LlamaCli};
pub use prover::{Prover9Cli, ProverClient, ProverRun, TIMEOUT_BANNER};
