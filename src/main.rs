use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use lead_refinery::config::{build_config, ConfigArgs};
use lead_refinery::features::build_lead_features;
use lead_refinery::models::{EnrichmentRecord, RawEnrichedData, ScoredRecord};
use lead_refinery::processor::{process_record, DataProcessor};
use lead_refinery::scoring::LeadScorer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a JSON array of raw enrichment payloads
    Clean {
        /// Path to the input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of concurrent workers (overrides the configured concurrency)
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Score a JSON array of stored enrichment records
    Score {
        /// Path to the input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli.settings)?;

    match cli.command {
        Commands::Clean {
            input,
            output,
            workers,
        } => {
            info!("Cleaning payloads from {} to {}", input.display(), output.display());
            let workers = workers.unwrap_or(config.max_concurrency).max(1);
            let processor = DataProcessor::new(&config).context("Failed to set up DNS and HTTP clients")?;
            clean_file(Arc::new(processor), &input, &output, workers).await?;
        }
        Commands::Score { input, output } => {
            score_file(&LeadScorer::from_config(&config), &input, output.as_deref())?;
        }
    }

    Ok(())
}

async fn clean_file(
    processor: Arc<DataProcessor>,
    input: &Path,
    output: &Path,
    workers: usize,
) -> Result<()> {
    let input_data = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let records: Vec<RawEnrichedData> = serde_json::from_str(&input_data)
        .with_context(|| format!("Failed to parse payloads in {}", input.display()))?;

    info!("Loaded {} payloads from {}", records.len(), input.display());

    let semaphore = Arc::new(Semaphore::new(workers));
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling outstanding work");
            ctrl_c_cancel.cancel();
        }
    });

    let progress_bar = ProgressBar::new(records.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        let processor = processor.clone();
        let semaphore = semaphore.clone();
        let progress_bar = progress_bar.clone();
        let cancel = cancel.clone();

        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            let result = process_record(processor, record, cancel).await;
            progress_bar.inc(1);
            result
        }));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for task in tasks {
        results.push(task.await?);
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    progress_bar.finish_with_message("Cleaning complete");

    let output_data = serde_json::to_string_pretty(&results)?;
    std::fs::write(output, output_data)
        .with_context(|| format!("Failed to write output file {}", output.display()))?;

    info!(
        "Wrote {} results ({} failed) to {}",
        results.len(),
        failed,
        output.display()
    );
    Ok(())
}

fn score_file(scorer: &LeadScorer, input: &Path, output: Option<&Path>) -> Result<()> {
    let input_data = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let records: Vec<EnrichmentRecord> = serde_json::from_str(&input_data)
        .with_context(|| format!("Failed to parse records in {}", input.display()))?;

    let scored: Vec<ScoredRecord> = records
        .into_iter()
        .map(|enrichment| {
            let score = scorer.compute_score(&build_lead_features(&enrichment));
            ScoredRecord { enrichment, score }
        })
        .collect();

    let output_data = serde_json::to_string_pretty(&scored)?;
    match output {
        Some(path) => {
            std::fs::write(path, output_data)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            info!("Wrote {} scored records to {}", scored.len(), path.display());
        }
        None => println!("{}", output_data),
    }
    Ok(())
}
