pub mod baseline;
pub mod client;
pub mod config;
pub mod corpus;
pub mod extract;
pub mod observation;
pub mod paths;
pub mod pipeline;
pub mod prompt;
pub mod trace;

// Re-export commonly used types
pub use client::{GenerationClient, ProverClient};
pub use config::RunConfig;
pub use corpus::{Benchmark, WorkUnit};
pub use observation::Observation;
pub use pipeline::{Pipeline, RunSummary};
pub use trace::{Trace, TraceStore};
