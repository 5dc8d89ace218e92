//! Neurika Analyze - offline dataset and answer tooling

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neurika_analysis::{
    extract_chart, formatter::ResponseFormatter, router, tabular::ParseOptions, SplitMode,
};
use neurika_common::logging::{init_logging, LogConfig, LogLevel};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "neurika-analyze")]
#[command(author, version, about = "Profile datasets and inspect answers offline")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile a delimited text file
    Profile {
        path: PathBuf,

        /// Data rows retained for profiling
        #[arg(long, default_value_t = neurika_analysis::tabular::DEFAULT_MAX_ROWS)]
        max_rows: usize,

        /// Split on every comma, ignoring quotes
        #[arg(long)]
        naive: bool,
    },

    /// Show which answer category a question routes to
    Route { question: String },

    /// Format an answer file into its view model
    Format { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    // stdout carries the JSON result; logs go to stderr.
    let log_config = LogConfig::builder()
        .level(level)
        .log_file_prefix("neurika-analyze")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let output = match cli.command {
        Command::Profile {
            path,
            max_rows,
            naive,
        } => {
            let text = read(&path)?;
            let mode = if naive {
                SplitMode::Naive
            } else {
                SplitMode::Quoted
            };
            let options = ParseOptions::default().with_max_rows(max_rows).with_mode(mode);
            info!(path = %path.display(), ?mode, "Profiling dataset");
            serde_json::to_value(neurika_analysis::overview(&text, &options)?)?
        },
        Command::Route { question } => {
            let routing = router::classify_with_reason(&question);
            debug!(category = %routing.category, keyword = ?routing.keyword, "Routed question");
            serde_json::to_value(routing)?
        },
        Command::Format { path } => {
            let text = read(&path)?;
            let formatter = ResponseFormatter::new()?;
            json!({
                "formatted": formatter.format_response(&text),
                "chart": extract_chart(&text),
            })
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
