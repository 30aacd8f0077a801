use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tassel_client::{HttpStandardizer, ReqwestFetcher};
use tassel_core::crawl::{CrawlConfig, CrawlService};
use tassel_core::jsonl::{read_jsonl, write_jsonl};
use tassel_core::normalize::normalize_all;
use tassel_core::traits::Standardizer;
use tassel_core::{
    CachedStandardizer, DetailRecord, NormalizedRecord, SiteConfig, StandardizedRecord,
};

/// Rows per standardizer request.
const STANDARDIZE_BATCH_SIZE: usize = 20;

#[derive(Parser)]
#[command(name = "tassel", version, about = "Admissions survey crawler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl new survey records into a JSONL file
    Crawl {
        /// Output JSONL file for raw detail records
        #[arg(short, long)]
        out: PathBuf,

        /// Stop after collecting this many new records
        #[arg(short, long, default_value_t = 1000)]
        target_count: usize,

        /// Listing pages fetched per batch
        #[arg(long, default_value_t = 5)]
        pages_per_batch: u32,

        /// Highest record id already persisted; ids at or below it are skipped
        #[arg(short, long)]
        watermark: Option<u64>,

        /// Listing endpoint override
        #[arg(long, env = "TASSEL_LISTING_BASE")]
        listing_base: Option<String>,

        /// Detail endpoint override
        #[arg(long, env = "TASSEL_DETAIL_BASE")]
        detail_base: Option<String>,
    },

    /// Normalize raw detail records into the cleaned shape
    Normalize {
        /// Input JSONL of raw detail records
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL file for normalized records
        #[arg(short, long)]
        out: PathBuf,

        /// Keep at most this many records
        #[arg(short, long)]
        target_count: Option<usize>,
    },

    /// Attach standardized program and university names
    Standardize {
        /// Input JSONL of normalized records
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL file for standardized records
        #[arg(short, long)]
        out: PathBuf,

        /// Standardizer service base URL
        #[arg(
            short,
            long,
            env = "TASSEL_STANDARDIZER_URL",
            default_value = "http://127.0.0.1:8000"
        )]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("tassel=info".parse()?)
                .add_directive("tassel_core=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            out,
            target_count,
            pages_per_batch,
            watermark,
            listing_base,
            detail_base,
        } => {
            cmd_crawl(
                &out,
                target_count,
                pages_per_batch,
                watermark,
                listing_base,
                detail_base,
            )
            .await?;
        }
        Commands::Normalize {
            input,
            out,
            target_count,
        } => {
            cmd_normalize(&input, &out, target_count)?;
        }
        Commands::Standardize {
            input,
            out,
            base_url,
        } => {
            cmd_standardize(&input, &out, &base_url).await?;
        }
    }

    Ok(())
}

async fn cmd_crawl(
    out: &Path,
    target_count: usize,
    pages_per_batch: u32,
    watermark: Option<u64>,
    listing_base: Option<String>,
    detail_base: Option<String>,
) -> Result<()> {
    // 1. Site endpoints, overridable for mirrors and fixtures
    let mut site = SiteConfig::default();
    if let Some(listing_base) = listing_base {
        site.listing_base = listing_base;
    }
    if let Some(detail_base) = detail_base {
        site.detail_base = detail_base;
    }

    // 2. Crawl listing batches, then detail pages
    let fetcher = ReqwestFetcher::new().context("Failed to create HTTP client")?;
    let config = CrawlConfig {
        pages_per_batch,
        ..CrawlConfig::default()
    };
    let service = CrawlService::with_config(fetcher, site, config);

    tracing::info!(target_count, ?watermark, "Starting crawl");
    let records = service.crawl(watermark, target_count).await;

    // 3. Write raw detail records
    write_jsonl(out, &records).map_err(|e| anyhow::anyhow!(e))?;

    println!("Wrote {} records to {}", records.len(), out.display());
    Ok(())
}

fn cmd_normalize(input: &Path, out: &Path, target_count: Option<usize>) -> Result<()> {
    let records: Vec<DetailRecord> =
        read_jsonl(input).with_context(|| format!("Failed to read {}", input.display()))?;

    let cap = target_count.unwrap_or(records.len());
    let normalized = normalize_all(&records, cap);

    write_jsonl(out, &normalized).map_err(|e| anyhow::anyhow!(e))?;

    println!(
        "Normalized {} of {} records to {}",
        normalized.len(),
        records.len(),
        out.display()
    );
    Ok(())
}

async fn cmd_standardize(input: &Path, out: &Path, base_url: &str) -> Result<()> {
    // 1. Load normalized records
    let records: Vec<NormalizedRecord> =
        read_jsonl(input).with_context(|| format!("Failed to read {}", input.display()))?;

    // 2. Standardize in fixed-size batches, deduplicated through the cache
    let standardizer = CachedStandardizer::new(
        HttpStandardizer::with_base_url(base_url)
            .context("Failed to create standardizer client")?,
    );

    let mut standardized: Vec<StandardizedRecord> = Vec::with_capacity(records.len());
    for chunk in records.chunks(STANDARDIZE_BATCH_SIZE) {
        let inputs: Vec<String> = chunk.iter().map(|r| r.program.clone()).collect();
        let pairs = standardizer
            .standardize(&inputs)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        standardized.extend(
            chunk
                .iter()
                .cloned()
                .zip(pairs)
                .map(|(record, pair)| StandardizedRecord {
                    record,
                    standardized_program: pair.program,
                    standardized_university: pair.university,
                }),
        );
        tracing::info!(
            done = standardized.len(),
            total = records.len(),
            "Standardizing"
        );
    }

    // 3. Write standardized records
    write_jsonl(out, &standardized).map_err(|e| anyhow::anyhow!(e))?;

    println!(
        "Standardized {} records to {}",
        standardized.len(),
        out.display()
    );
    Ok(())
}
