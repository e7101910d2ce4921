//! Text generation boundary and the llama.cpp CLI implementation.

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::process::Command;

use super::process;
use crate::extract::strip_echo;

/// One generation call
///
/// Decoding is always greedy with a fixed seed so reruns reproduce.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub seed: u64,
    pub stop_sequence: Option<String>,
}

impl GenerationRequest {
    pub fn greedy(prompt: impl Into<String>, max_output_tokens: u32, seed: u64) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens,
            temperature: 0.0,
            top_k: 1,
            seed,
            stop_sequence: None,
        }
    }

    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequence = Some(stop.into());
        self
    }
}

/// Output of a generation call, split at the echoed prompt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationResult {
    /// Raw output up to and including the echoed prompt, empty if not echoed
    pub prompt_echo: String,
    /// Completion only
    pub generated_text: String,
}

impl GenerationResult {
    /// Split raw engine output whether or not the engine echoed the prompt
    pub fn from_raw(raw: &str, prompt: &str) -> Self {
        let generated = strip_echo(raw, prompt);
        let echo_len = raw.len() - generated.len();
        Self {
            prompt_echo: raw[..echo_len].to_string(),
            generated_text: generated.to_string(),
        }
    }

    /// True when nothing but whitespace follows the prompt
    pub fn is_empty(&self) -> bool {
        self.generated_text.trim().is_empty()
    }
}

/// Prompt in, text out
///
/// An `Err` means the engine itself is broken and the run must stop. A
/// successful call that produced no text is an `Ok` with an empty result.
pub trait GenerationClient: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult>;
}

/// Drives a llama.cpp `main`/`llama-cli` binary, one process per call
#[derive(Debug, Clone)]
pub struct LlamaCli {
    pub executable: PathBuf,
    pub model: PathBuf,
    pub extra_args: Vec<String>,
}

impl LlamaCli {
    pub fn new(executable: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            model: model.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Command line for a request, without running it
    pub fn command(&self, request: &GenerationRequest) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("-m")
            .arg(&self.model)
            .arg("-p")
            .arg(&request.prompt)
            .arg("--n-predict")
            .arg(request.max_output_tokens.to_string())
            .arg("--temp")
            .arg(format!("{:.1}", request.temperature))
            .arg("--top-k")
            .arg(request.top_k.to_string())
            .arg("-s")
            .arg(request.seed.to_string());

        if let Some(stop) = &request.stop_sequence {
            cmd.arg("-r").arg(stop);
        }

        cmd.args(&self.extra_args);
        cmd
    }
}

impl GenerationClient for LlamaCli {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let mut cmd = self.command(request);
        tracing::debug!(
            executable = %self.executable.display(),
            n_predict = request.max_output_tokens,
            stop = ?request.stop_sequence,
            "running generator"
        );

        let output = process::run(&mut cmd, None)?;
        if !output.success() {
            bail!(
                "Generator {} failed with exit code {:?}:\n{}",
                self.executable.display(),
                output.exit_code,
                output.stderr_tail(20)
            );
        }

        Ok(GenerationResult::from_raw(&output.stdout, &request.prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_request_is_deterministic() {
        let req = GenerationRequest::greedy("p", 1024, 2025).with_stop("END_PROVER9_INPUT");
        assert_eq!(req.temperature, 0.0);
        assert_eq!(req.top_k, 1);
        assert_eq!(req.seed, 2025);
        assert_eq!(req.stop_sequence.as_deref(), Some("END_PROVER9_INPUT"));
    }

    #[test]
    fn test_from_raw_with_echo() {
        let result = GenerationResult::from_raw("PROMPT completion", "PROMPT");
        assert_eq!(result.prompt_echo, "PROMPT");
        assert_eq!(result.generated_text, " completion");
    }

    #[test]
    fn test_from_raw_without_echo() {
        let result = GenerationResult::from_raw("completion", "PROMPT");
        assert_eq!(result.prompt_echo, "");
        assert_eq!(result.generated_text, "completion");
    }

    #[test]
    fn test_echo_only_output_is_empty() {
        let result = GenerationResult::from_raw("PROMPT\n\n", "PROMPT");
        assert!(result.is_empty());
    }

    #[test]
    fn test_llama_command_line() {
        let llama = LlamaCli::new("runtime/llama", "models/m.gguf").with_extra_args(vec!["--no-display-prompt".into()]);
        let req = GenerationRequest::greedy("hi", 100, 2025).with_stop("STOP");
        let line = process::describe(&llama.command(&req));
        assert_eq!(
            line,
            "runtime/llama -m models/m.gguf -p hi --n-predict 100 --temp 0.0 --top-k 1 -s 2025 -r STOP --no-display-prompt"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_generator_nonzero_exit_is_fatal() {
        let llama = LlamaCli::new("false", "m.gguf");
        let err = llama
            .generate(&GenerationRequest::greedy("p", 10, 1))
            .unwrap_err();
        assert!(err.to_string().contains("failed with exit code"));
    }
}
