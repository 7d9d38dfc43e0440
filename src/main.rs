use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trendline::config::{load_terms, Config};
use trendline::engine::SignalEngine;
use trendline::ingest::load_tables;
use trendline::output::ReportWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "trendline",
    version,
    about = "Rising, falling and emerging phrases from multi-source document tables",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Filters file (synonyms, ban and allow lists)
    #[arg(long, global = true)]
    filters: Option<PathBuf>,

    /// Output directory for report artifacts
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// File name prefix for report artifacts
    #[arg(short, long, global = true)]
    prefix: Option<String>,

    /// End of the rolling windows (RFC 3339)
    #[arg(long, global = true)]
    as_of: Option<DateTime<Utc>>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Composite-scored signal document (signals.json)
    Signals {
        /// Document tables (CSV, JSON or JSON lines)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },

    /// Open-vocabulary phrase discovery
    Discover {
        /// Document tables (CSV, JSON or JSON lines)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },

    /// Closed-vocabulary term trends
    Terms {
        /// Document tables (CSV, JSON or JSON lines)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Terms file (JSON {"terms": [...]} or one term per line)
        #[arg(short, long)]
        terms: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(format, &config.logging.level, cli.verbose)?;

    tracing::info!("trendline starting");

    let writer = ReportWriter::new(&config.report.output_dir, &config.report.prefix);

    let written = match cli.command {
        Commands::Signals { input } => {
            tracing::info!(inputs = input.len(), "Starting signals command");
            let table = load_tables(&input);
            let engine = SignalEngine::from_config(config).context("Failed to build engine")?;
            writer.write_signals(&engine.signals(&table.documents))?
        }

        Commands::Discover { input } => {
            tracing::info!(inputs = input.len(), "Starting discover command");
            let table = load_tables(&input);
            let engine = SignalEngine::from_config(config).context("Failed to build engine")?;
            writer.write_discovery(&engine.discover(&table.documents))?
        }

        Commands::Terms { input, terms } => {
            let terms_path = terms
                .or_else(|| config.terms_path.clone())
                .context("terms requires --terms or terms_path in the configuration")?;
            let terms = load_terms(&terms_path)
                .with_context(|| format!("Failed to load terms: {}", terms_path.display()))?;
            tracing::info!(
                inputs = input.len(),
                terms = terms.len(),
                "Starting terms command"
            );
            let table = load_tables(&input);
            let engine = SignalEngine::from_config(config).context("Failed to build engine")?;
            writer.write_terms(&engine.terms(&table.documents, &terms))?
        }
    };

    for path in &written {
        tracing::info!(path = %path.display(), "Wrote artifact");
    }
    Ok(())
}

/// File, then environment, then command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    config.apply_env()?;

    if let Some(path) = &cli.filters {
        config.filters_path = Some(path.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config.report.output_dir = dir.clone();
    }
    if let Some(prefix) = &cli.prefix {
        config.report.prefix = prefix.clone();
    }
    if let Some(as_of) = cli.as_of {
        config.windows.as_of = Some(as_of);
    }
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendline=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("trendline={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
