use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use react_prover::baseline::BaselineMode;
use react_prover::config::{ConfigOverrides, RunConfig, StyleSetting};

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "ReAct reasoning evaluation with an LLM and Prover9", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the two-stage ReAct pipeline over the benchmark (resumable)
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Process at most this many work units (in corpus order)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run a prover-free baseline over the benchmark (resumable)
    Baseline {
        /// Prompting mode
        #[arg(value_enum)]
        mode: BaselineMode,

        #[command(flatten)]
        config: ConfigArgs,

        /// Process at most this many work units (in corpus order)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Summarize trace outcomes in an output directory
    Report {
        #[command(flatten)]
        config: ConfigArgs,

        /// Report on a baseline's traces instead of the ReAct run
        #[arg(long, value_enum)]
        baseline: Option<BaselineMode>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print one question's trace
    Show {
        /// Question id, e.g. 001_q1
        qid: String,

        #[command(flatten)]
        config: ConfigArgs,

        /// Read from a baseline's traces instead of the ReAct run
        #[arg(long, value_enum)]
        baseline: Option<BaselineMode>,

        /// Output the raw trace JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate config, executables, model and dataset
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Config file plus command-line overrides, shared by every subcommand
#[derive(Args)]
struct ConfigArgs {
    /// Config file (default: ./react-prover.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Benchmark JSON file
    #[arg(long)]
    dataset: Option<String>,

    /// Directory for traces and prover files
    #[arg(long)]
    out_dir: Option<String>,

    /// Model file passed to the generator
    #[arg(long)]
    model: Option<String>,

    /// Prompt convention
    #[arg(long, value_enum)]
    style: Option<StyleSetting>,

    /// Worker threads (1 = sequential)
    #[arg(long)]
    jobs: Option<usize>,
}

impl ConfigArgs {
    fn resolve(self) -> Result<RunConfig> {
        RunConfig::load(
            self.config.as_deref(),
            ConfigOverrides {
                dataset: self.dataset,
                out_dir: self.out_dir,
                model: self.model,
                style: self.style,
                jobs: self.jobs,
            },
        )
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, limit } => {
            commands::run::execute(&config.resolve()?, limit)?;
        }
        Commands::Baseline {
            mode,
            config,
            limit,
        } => {
            commands::baseline::execute(&config.resolve()?, mode, limit)?;
        }
        Commands::Report {
            config,
            baseline,
            json,
        } => {
            commands::report::execute(&config.resolve()?, baseline, json)?;
        }
        Commands::Show {
            qid,
            config,
            baseline,
            json,
        } => {
            commands::show::execute(&config.resolve()?, &qid, baseline, json)?;
        }
        Commands::Check { config } => {
            let healthy = commands::check::execute(&config.resolve()?)?;
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
