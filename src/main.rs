use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use startup_lens::{
    configuration::{get_configuration_from, DEFAULT_CONFIG_FILE},
    services::DEFAULT_UI_SCHEMA_OUTPUT,
    startup::{run_analysis, run_compose, AnalyzeOptions, ComposeOptions},
};

/// Analyze startup websites with a language model grounded in search results.
#[derive(Parser)]
#[command(name = "startup-lens", version)]
struct Cli {
    /// Configuration file layered under APP_* environment variables
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append analysis columns to a CSV of startups
    Analyze {
        /// Input CSV with an 'Organization Website' column
        #[arg(long, default_value = "2508_inv.csv")]
        input: PathBuf,
        /// Output CSV: the input columns plus the analysis columns
        #[arg(long, default_value = "2508_inv.with_analysis.csv")]
        output: PathBuf,
        /// Model deployment, overrides the configured one
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        max_pages: Option<usize>,
        #[arg(long)]
        max_chars: Option<usize>,
    },
    /// Generate a personalized UI schema from user traits
    ComposeUi {
        /// JSON file with user traits; a built-in sample is used otherwise
        #[arg(long)]
        traits_file: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_UI_SCHEMA_OUTPUT)]
        output: PathBuf,
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let configuration =
        get_configuration_from(&cli.config).context("Failed to read configuration.")?;

    match cli.command {
        Command::Analyze {
            input,
            output,
            model,
            max_pages,
            max_chars,
        } => {
            let total = run_analysis(
                &configuration,
                AnalyzeOptions {
                    input,
                    output,
                    model,
                    max_pages,
                    max_chars,
                },
            )
            .await?;
            log::info!("Analyzed {} startups", total);
        }
        Command::ComposeUi {
            traits_file,
            output,
            model,
        } => {
            run_compose(
                &configuration,
                ComposeOptions {
                    traits_file,
                    output,
                    model,
                },
            )
            .await?;
        }
    }

    Ok(())
}
