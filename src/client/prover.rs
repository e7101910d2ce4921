//! Theorem prover boundary and the Prover9 CLI implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use super::process;
use crate::extract::ProverProgram;
use crate::paths;

/// First line of the output artifact when the prover was killed
pub const TIMEOUT_BANNER: &str = "PROVER9 TIMEOUT";

/// Raw result of one prover invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProverRun {
    pub transcript: String,
    pub timed_out: bool,
    pub exit_code: Option<i32>,
}

/// Program in, transcript out
///
/// An `Err` means the prover could not be run at all and the run must stop.
/// Timeouts and rejected input come back as an `Ok` run for classification.
pub trait ProverClient: Send + Sync {
    fn prove(&self, qid: &str, program: &ProverProgram) -> Result<ProverRun>;
}

/// Runs `prover9 -f <file>` and keeps both files next to the traces
#[derive(Debug, Clone)]
pub struct Prover9Cli {
    pub executable: PathBuf,
    pub timeout: Duration,
    pub out_dir: PathBuf,
}

impl Prover9Cli {
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout,
            out_dir: out_dir.into(),
        }
    }
}

impl ProverClient for Prover9Cli {
    fn prove(&self, qid: &str, program: &ProverProgram) -> Result<ProverRun> {
        let dir = paths::prover_dir(&self.out_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let input_path = paths::prover_input_path(&self.out_dir, qid);
        let output_path = paths::prover_output_path(&self.out_dir, qid);

        fs::write(&input_path, program.input())
            .with_context(|| format!("Failed to write {}", input_path.display()))?;

        let mut cmd = Command::new(&self.executable);
        cmd.arg("-f").arg(&input_path);
        let command_line = process::describe(&cmd);

        let output = process::run(&mut cmd, Some(self.timeout))?;

        let transcript = if output.timed_out {
            tracing::warn!(qid, timeout_secs = self.timeout.as_secs(), "prover timed out");
            format!(
                "{}\n\nCommand '{}' timed out after {} seconds\n{}",
                TIMEOUT_BANNER,
                command_line,
                self.timeout.as_secs(),
                output.stdout
            )
        } else {
            if output.exit_code != Some(0) {
                // Prover9 exits non-zero for ordinary outcomes (2 = sos_empty)
                tracing::debug!(qid, exit_code = ?output.exit_code, "prover exited non-zero");
            }
            output.stdout
        };

        fs::write(&output_path, &transcript)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        Ok(ProverRun {
            transcript,
            timed_out: output.timed_out,
            exit_code: output.exit_code,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn fake_prover(dir: &std::path::Path, script: &str) -> PathBuf {
        let path = dir.join("fake-prover9");
        fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn program() -> ProverProgram {
        ProverProgram::parse(
            "formulas(usable).\np(x) -> q(x).\nend_of_list.\nformulas(sos).\np(a).\nend_of_list.\nformulas(goals).\nq(a).\nend_of_list.",
        )
    }

    #[test]
    fn test_prove_writes_both_artifacts() {
        let temp = TempDir::new().unwrap();
        // Echo the input file back so the test can see what was passed
        let exe = fake_prover(temp.path(), "cat \"$2\"; echo; echo THEOREM PROVED");
        let prover = Prover9Cli::new(exe, Duration::from_secs(5), temp.path());

        let run = prover.prove("001_q1", &program()).unwrap();
        assert!(!run.timed_out);
        assert_eq!(run.exit_code, Some(0));
        assert!(run.transcript.contains("formulas(goals)."));
        assert!(run.transcript.contains("THEOREM PROVED"));

        let input = fs::read_to_string(paths::prover_input_path(temp.path(), "001_q1")).unwrap();
        assert_eq!(input, program().input());
        let output = fs::read_to_string(paths::prover_output_path(temp.path(), "001_q1")).unwrap();
        assert_eq!(output, run.transcript);
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let exe = fake_prover(temp.path(), "echo SEARCH FAILED; exit 2");
        let prover = Prover9Cli::new(exe, Duration::from_secs(5), temp.path());

        let run = prover.prove("002_q1", &program()).unwrap();
        assert_eq!(run.exit_code, Some(2));
        assert!(run.transcript.contains("SEARCH FAILED"));
    }

    #[test]
    fn test_timeout_is_recorded() {
        let temp = TempDir::new().unwrap();
        let exe = fake_prover(temp.path(), "sleep 5");
        let prover = Prover9Cli::new(exe, Duration::from_millis(200), temp.path());

        let started = std::time::Instant::now();
        let run = prover.prove("003_q1", &program()).unwrap();
        assert!(run.timed_out);
        assert!(started.elapsed() < Duration::from_secs(2));
        let output = fs::read_to_string(paths::prover_output_path(temp.path(), "003_q1")).unwrap();
        assert!(output.starts_with(TIMEOUT_BANNER));
    }

    #[test]
    fn test_missing_prover_is_fatal() {
        let temp = TempDir::new().unwrap();
        let prover = Prover9Cli::new(temp.path().join("missing"), Duration::from_secs(1), temp.path());
        assert!(prover.prove("004_q1", &program()).is_err());
        // Input is still kept for diagnosis
        assert!(paths::prover_input_path(temp.path(), "004_q1").exists());
    }
}
