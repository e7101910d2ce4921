//! Run configuration.
//!
//! `react-prover.toml` is optional and every section has defaults, so an
//! empty directory still yields a usable config. The file is resolved once
//! into a [`RunConfig`] that the pipeline receives explicitly.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{LlamaCli, Prover9Cli};
use crate::observation::{Classifier, SEARCH_FAILED, THEOREM_PROVED};
use crate::paths;
use crate::prompt::PromptStyle;

// =============================================================================
// File Schema
// =============================================================================

/// Contents of `react-prover.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub prover: ProverSection,
    #[serde(default)]
    pub prompt: PromptSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

fn default_dataset() -> String {
    "LogicBench-BQA-bidirectional.json".to_string()
}
fn default_out_dir() -> String {
    "traces/base/ReAct".to_string()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            out_dir: default_out_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSection {
    #[serde(default = "default_generator_executable")]
    pub executable: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_stage1_max_tokens")]
    pub stage1_max_tokens: u32,
    #[serde(default = "default_stage2_max_tokens")]
    pub stage2_max_tokens: u32,
    /// Budget for the single generation of the direct and CoT baselines
    #[serde(default = "default_baseline_max_tokens")]
    pub baseline_max_tokens: u32,
    /// Append the stop sequence when the engine drops it from its output
    #[serde(default)]
    pub restore_stop_sequence: bool,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_generator_executable() -> String {
    "runtime/llama.exe".to_string()
}
fn default_model() -> String {
    "models/mistral-7b-v0.1.Q4_K_M.gguf".to_string()
}
fn default_seed() -> u64 {
    2025
}
fn default_stage1_max_tokens() -> u32 {
    1024
}
fn default_stage2_max_tokens() -> u32 {
    100
}
fn default_baseline_max_tokens() -> u32 {
    300
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            executable: default_generator_executable(),
            model: default_model(),
            seed: default_seed(),
            stage1_max_tokens: default_stage1_max_tokens(),
            stage2_max_tokens: default_stage2_max_tokens(),
            baseline_max_tokens: default_baseline_max_tokens(),
            restore_stop_sequence: false,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProverSection {
    #[serde(default = "default_prover_executable")]
    pub executable: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_success_marker")]
    pub success_marker: String,
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,
}

fn default_prover_executable() -> String {
    "runtime/prover9.exe".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_success_marker() -> String {
    THEOREM_PROVED.to_string()
}
fn default_failure_marker() -> String {
    SEARCH_FAILED.to_string()
}

impl Default for ProverSection {
    fn default() -> Self {
        Self {
            executable: default_prover_executable(),
            timeout_secs: default_timeout_secs(),
            success_marker: default_success_marker(),
            failure_marker: default_failure_marker(),
        }
    }
}

/// Prompt style as written in config; `auto` is resolved from the model name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StyleSetting {
    Base,
    Instruct,
    #[default]
    Auto,
}

impl StyleSetting {
    pub fn resolve(&self, model: &Path) -> PromptStyle {
        match self {
            StyleSetting::Base => PromptStyle::Base,
            StyleSetting::Instruct => PromptStyle::Instruct,
            StyleSetting::Auto => {
                let name = model
                    .file_name()
                    .map(|n| n.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if name.contains("instruct") {
                    PromptStyle::Instruct
                } else {
                    PromptStyle::Base
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptSection {
    #[serde(default)]
    pub style: StyleSetting,
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config TOML")
    }

    /// Read a config file
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Load an explicit config, or `react-prover.toml` from the working directory
    ///
    /// Returns the config and the directory relative paths resolve against.
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf)> {
        let cwd = std::env::current_dir()?;
        match explicit {
            Some(path) => {
                let file = Self::read(path)?;
                let base = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or(cwd);
                Ok((file, base))
            }
            None => {
                let default_path = cwd.join(paths::DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Ok((Self::read(&default_path)?, cwd))
                } else {
                    Ok((Self::default(), cwd))
                }
            }
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub dataset: Option<String>,
    pub out_dir: Option<String>,
    pub model: Option<String>,
    pub style: Option<StyleSetting>,
    pub jobs: Option<usize>,
}

/// Generation budgets and decoding settings shared by all stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub seed: u64,
    pub stage1_max_tokens: u32,
    pub stage2_max_tokens: u32,
    pub baseline_max_tokens: u32,
    pub restore_stop_sequence: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        let section = GeneratorSection::default();
        Self {
            seed: section.seed,
            stage1_max_tokens: section.stage1_max_tokens,
            stage2_max_tokens: section.stage2_max_tokens,
            baseline_max_tokens: section.baseline_max_tokens,
            restore_stop_sequence: section.restore_stop_sequence,
        }
    }
}

/// Fully resolved configuration handed to the pipeline
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dataset: PathBuf,
    pub out_dir: PathBuf,
    pub generator_executable: PathBuf,
    pub model: PathBuf,
    pub generator_extra_args: Vec<String>,
    pub prover_executable: PathBuf,
    pub prover_timeout: Duration,
    pub generation: GenerationSettings,
    pub classifier: Classifier,
    pub prompt_style: PromptStyle,
    pub jobs: usize,
}

impl RunConfig {
    /// Resolve paths against `base_dir`, apply overrides, validate
    pub fn resolve(file: ConfigFile, base_dir: &Path, overrides: ConfigOverrides) -> Result<Self> {
        let dataset = overrides.dataset.unwrap_or(file.paths.dataset);
        let out_dir = overrides.out_dir.unwrap_or(file.paths.out_dir);
        let model = resolve_path(base_dir, &overrides.model.unwrap_or(file.generator.model));
        let style = overrides.style.unwrap_or(file.prompt.style);
        let jobs = overrides.jobs.unwrap_or(1);

        if file.prover.timeout_secs == 0 {
            bail!("prover.timeout_secs must be greater than zero");
        }
        if file.generator.stage1_max_tokens == 0
            || file.generator.stage2_max_tokens == 0
            || file.generator.baseline_max_tokens == 0
        {
            bail!("generator token budgets must be greater than zero");
        }
        if jobs == 0 {
            bail!("jobs must be at least 1");
        }
        // An empty marker matches every transcript
        if file.prover.success_marker.is_empty() || file.prover.failure_marker.is_empty() {
            bail!("prover.success_marker and prover.failure_marker must not be empty");
        }

        Ok(Self {
            dataset: resolve_path(base_dir, &dataset),
            out_dir: resolve_path(base_dir, &out_dir),
            generator_executable: resolve_executable(base_dir, &file.generator.executable),
            prompt_style: style.resolve(&model),
            model,
            generator_extra_args: file.generator.extra_args,
            prover_executable: resolve_executable(base_dir, &file.prover.executable),
            prover_timeout: Duration::from_secs(file.prover.timeout_secs),
            generation: GenerationSettings {
                seed: file.generator.seed,
                stage1_max_tokens: file.generator.stage1_max_tokens,
                stage2_max_tokens: file.generator.stage2_max_tokens,
                baseline_max_tokens: file.generator.baseline_max_tokens,
                restore_stop_sequence: file.generator.restore_stop_sequence,
            },
            classifier: Classifier::new(file.prover.success_marker, file.prover.failure_marker),
            jobs,
        })
    }

    /// Load from disk and resolve in one step
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let (file, base_dir) = ConfigFile::load(config_path)?;
        Self::resolve(file, &base_dir, overrides)
    }

    pub fn generator(&self) -> LlamaCli {
        LlamaCli::new(&self.generator_executable, &self.model)
            .with_extra_args(self.generator_extra_args.clone())
    }

    pub fn prover(&self) -> Prover9Cli {
        Prover9Cli::new(&self.prover_executable, self.prover_timeout, &self.out_dir)
    }
}

/// Expand `~` and anchor relative paths at `base_dir`
fn resolve_path(base_dir: &Path, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

/// Like [`resolve_path`], but bare command names stay bare for PATH lookup
fn resolve_executable(base_dir: &Path, raw: &str) -> PathBuf {
    if raw.contains('/') || raw.contains('\\') || raw.starts_with('~') {
        resolve_path(base_dir, raw)
    } else {
        PathBuf::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = ConfigFile::parse("").unwrap();
        assert_eq!(file.prover.timeout_secs, 15);
        assert_eq!(file.generator.stage1_max_tokens, 1024);
        assert_eq!(file.generator.stage2_max_tokens, 100);
        assert_eq!(file.generator.baseline_max_tokens, 300);
        assert_eq!(file.generator.seed, 2025);
        assert_eq!(file.prover.success_marker, "THEOREM PROVED");
        assert_eq!(file.prompt.style, StyleSetting::Auto);
    }

    #[test]
    fn test_partial_sections() {
        let file = ConfigFile::parse(
            r#"
            [prover]
            timeout_secs = 30

            [prompt]
            style = "instruct"
            "#,
        )
        .unwrap();
        assert_eq!(file.prover.timeout_secs, 30);
        assert_eq!(file.prover.failure_marker, "SEARCH FAILED");
        assert_eq!(file.prompt.style, StyleSetting::Instruct);
        assert_eq!(file.paths.out_dir, "traces/base/ReAct");
    }

    #[test]
    fn test_unknown_style_is_error() {
        assert!(ConfigFile::parse("[prompt]\nstyle = \"chat\"").is_err());
    }

    #[test]
    fn test_auto_style_from_model_name() {
        let auto = StyleSetting::Auto;
        assert_eq!(
            auto.resolve(Path::new("models/mistral-7b-instruct-v0.1.Q4_K_M.gguf")),
            PromptStyle::Instruct
        );
        assert_eq!(
            auto.resolve(Path::new("models/mistral-7b-v0.1.Q4_K_M.gguf")),
            PromptStyle::Base
        );
        assert_eq!(
            StyleSetting::Base.resolve(Path::new("x-instruct.gguf")),
            PromptStyle::Base
        );
    }

    #[test]
    fn test_resolve_paths_and_overrides() {
        let base = Path::new("/work/bench");
        let config = RunConfig::resolve(
            ConfigFile::default(),
            base,
            ConfigOverrides {
                out_dir: Some("/abs/traces".to_string()),
                model: Some("models/mistral-7b-instruct-v0.1.Q4_K_M.gguf".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.dataset, PathBuf::from("/work/bench/LogicBench-BQA-bidirectional.json"));
        assert_eq!(config.out_dir, PathBuf::from("/abs/traces"));
        assert_eq!(config.prover_executable, PathBuf::from("/work/bench/runtime/prover9.exe"));
        assert_eq!(config.prompt_style, PromptStyle::Instruct);
        assert_eq!(config.prover_timeout, Duration::from_secs(15));
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_bare_executable_kept_for_path_lookup() {
        let mut file = ConfigFile::default();
        file.prover.executable = "prover9".to_string();
        let config = RunConfig::resolve(file, Path::new("/work"), ConfigOverrides::default()).unwrap();
        assert_eq!(config.prover_executable, PathBuf::from("prover9"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut file = ConfigFile::default();
        file.prover.timeout_secs = 0;
        let err = RunConfig::resolve(file, Path::new("/w"), ConfigOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let mut file = ConfigFile::default();
        file.prover.success_marker = String::new();
        let err = RunConfig::resolve(file, Path::new("/w"), ConfigOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("success_marker"));

        let file = ConfigFile::parse("[prover]\nfailure_marker = \"\"").unwrap();
        assert!(RunConfig::resolve(file, Path::new("/w"), ConfigOverrides::default()).is_err());
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let overrides = ConfigOverrides {
            jobs: Some(0),
            ..Default::default()
        };
        assert!(RunConfig::resolve(ConfigFile::default(), Path::new("/w"), overrides).is_err());
    }
}
