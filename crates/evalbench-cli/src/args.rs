//! Command line argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use evalbench_eval::FailurePolicy;

/// Evalbench - reproducible benchmarks for language-model backends
#[derive(Parser)]
#[command(name = "evalbench")]
#[command(about = "Evalbench - Benchmark harness for language-model backends")]
#[command(
    long_about = "Evalbench runs task suites against registered models, scores every case \
with the task's evaluator, records each run under runs/ and aggregates recorded runs into \
a leaderboard."
)]
#[command(version)]
pub struct Cli {
    /// Repository root holding models/, suites/ and runs/
    #[arg(long, global = true, env = "EVALBENCH_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Log output format (filter with RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one suite with one model
    Run {
        /// Model identifier from the registry
        #[arg(long)]
        model: String,

        /// Suite name under suites/
        #[arg(long)]
        suite: String,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Run one suite with several models in sequence
    Matrix {
        /// Suite name under suites/
        #[arg(long)]
        suite: String,

        /// Model identifiers from the registry
        #[arg(long, num_args = 1.., required = true)]
        models: Vec<String>,

        #[command(flatten)]
        options: RunOptions,

        /// Rebuild the leaderboard once all models ran
        #[arg(long)]
        aggregate: bool,
    },

    /// Aggregate recorded runs into leaderboard reports
    Aggregate {
        /// Directory holding recorded runs [default: <root>/runs]
        #[arg(long, env = "EVALBENCH_RUNS_DIR")]
        runs_dir: Option<PathBuf>,

        /// CSV report path [default: <root>/reports/leaderboard.csv]
        #[arg(long)]
        out_csv: Option<PathBuf>,

        /// Markdown report path [default: <root>/reports/leaderboard.md]
        #[arg(long)]
        out_md: Option<PathBuf>,
    },

    /// List registered models or available suites
    List {
        #[arg(value_enum, default_value_t = ListTarget::Models)]
        target: ListTarget,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListTarget {
    Models,
    Suites,
}

/// Options shared by `run` and `matrix`
#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run these task ids
    #[arg(long, num_args = 1..)]
    pub tasks: Vec<String>,

    /// Limit the number of cases per task
    #[arg(long)]
    pub max_cases: Option<usize>,

    /// System prompt override
    #[arg(long)]
    pub system: Option<String>,

    /// What to do when a case fails (isolate, abort)
    #[arg(long)]
    pub on_case_error: Option<FailurePolicy>,

    /// Directory receiving recorded runs [default: <root>/runs]
    #[arg(long, env = "EVALBENCH_RUNS_DIR")]
    pub runs_dir: Option<PathBuf>,

    /// Python interpreter used by the python_tests evaluator
    #[arg(long, env = "EVALBENCH_PYTHON")]
    pub python: Option<String>,

    /// Evaluator timeout in seconds, overriding task settings
    #[arg(long)]
    pub timeout: Option<u64>,
}
