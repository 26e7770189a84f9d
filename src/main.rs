mod assistant;
mod config;
mod error;
mod loader;
mod models;
mod pipeline;
mod session;
mod utils;
mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::assistant::{Assistant, OpenAiAssistant, ServiceError};
use crate::config::AppConfig;
use crate::loader::{DatasetCache, source_from_config};
use crate::models::{ChartKind, Metric};
use crate::pipeline::{SelectionState, company_ids};
use crate::session::Session;

#[derive(Parser)]
#[command(name = "ratio-dashboard", about = "Financial ratio dashboard", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Remote CSV to load instead of the configured one
    #[arg(long, global = true, env = "RATIOS_SOURCE_URL")]
    source_url: Option<String>,

    /// Local CSV to load instead of the remote source
    #[arg(long, global = true, conflicts_with = "source_url")]
    source_file: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Mean ratios per industry (stacked sector chart)
    Sectors {
        #[arg(long)]
        json: bool,
    },

    /// Compare selected companies on one metric
    Compare {
        /// Company ids, comma separated
        #[arg(short, long, value_delimiter = ',')]
        companies: Vec<String>,

        /// LiquidityRatio, DebtToEquityRatio or FinancialExpenseCoverage
        #[arg(short, long)]
        metric: Option<Metric>,

        /// bar, line or pie
        #[arg(long)]
        chart: Option<ChartKind>,

        #[arg(long)]
        json: bool,
    },

    /// List company ids in the dataset
    Companies,

    /// Ask the assistant a question
    Ask {
        #[arg(trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Interactive dashboard on stdin/stdout
    Session,
}

fn build_assistant(config: &AppConfig) -> Result<Box<dyn Assistant>, ServiceError> {
    OpenAiAssistant::new(&config.assistant).map(|a| Box::new(a) as Box<dyn Assistant>)
}

/// Joins the trailing words; `None` when there is nothing to send.
fn question_from_args(words: &[String]) -> Option<String> {
    let question = words.join(" ");
    let question = question.trim();
    (!question.is_empty()).then(|| question.to_string())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "ratio_dashboard=info,warn",
        1 => "ratio_dashboard=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(url) = cli.source_url {
        config.source.url = url;
        config.source.path = None;
    }
    if let Some(path) = cli.source_file {
        config.source.path = Some(path);
    }

    let source = source_from_config(&config.source).context("Invalid data source")?;
    let mut cache = DatasetCache::new(source)
        .with_ttl(config.source.cache_ttl_secs.map(Duration::from_secs));

    let mut state = SelectionState::new(
        config.dashboard.default_metric,
        config.dashboard.default_chart,
    );

    match cli.command {
        Command::Sectors { json } => {
            let dataset = cache.get().await?;
            let chart = view::render_sectors(&dataset)?;
            if json {
                print_json(&chart)?;
            } else {
                print!("{}", chart);
            }
        }

        Command::Compare {
            companies,
            metric,
            chart,
            json,
        } => {
            let dataset = cache.get().await?;
            state.select(companies);
            if let Some(m) = metric {
                state.metric = m;
            }
            if let Some(c) = chart {
                state.chart = c;
            }
            let comparison = view::render_comparison(&state, &dataset)?;
            if json {
                print_json(&comparison)?;
            } else {
                print!("{}", comparison);
            }
        }

        Command::Companies => {
            let dataset = cache.get().await?;
            if dataset.is_empty() {
                println!("No companies in {}", cache.location());
            } else {
                let ids = company_ids(&dataset);
                println!("{} companies:", ids.len());
                for id in &ids {
                    println!("  {}", id);
                }
            }
        }

        Command::Ask { question } => {
            let Some(question) = question_from_args(&question) else {
                println!("Nothing to ask: the question is empty.");
                return Ok(());
            };
            // The dashboard never depends on this; a missing key only fails here.
            let client = build_assistant(&config)?;
            match assistant::ask(client.as_ref(), &config.assistant.persona, &question).await {
                Ok(Some(reply)) => println!("{}", reply),
                Ok(None) => println!("Nothing to ask: the question is empty."),
                Err(e) => {
                    error!("Assistant call failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        Command::Session => {
            let stdout = std::io::stdout();
            let mut session = Session::start(
                cache,
                build_assistant(&config),
                config.assistant.persona.clone(),
                state,
                stdout.lock(),
            )
            .await?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session.run(stdin).await?;
            session.into_output().flush()?;
            info!("Bye");
        }
    }

    Ok(())
}
