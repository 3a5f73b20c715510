// ==============================================================================
// main.rs - SNP Filter Entry Point
// ==============================================================================
// Description: Filters a genotype report to genes of interest and reports
//              ancestral/derived allele percentages per gene
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2026-10-19
// Version: 2.0.0
// ==============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snp_filter::output::{self, OutputFormat, OutputGenerator};
use snp_filter::processor::SnpProcessor;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genotype report to filter (.txt or .txt.gz)
    #[arg(short = 'i', long)]
    report: PathBuf,

    /// Gene/SNP reference table (CSV: gene, rsid, derived, ancestral)
    #[arg(short, long, env = "SNP_REFERENCE", default_value = "genes.csv")]
    reference: PathBuf,

    /// Output format(s); repeat to write several into --output-dir
    #[arg(short, long, value_enum, default_value = "text")]
    format: Vec<OutputFormat>,

    /// Write output files here instead of printing to stdout
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum report size in megabytes
    #[arg(long, env = "SNP_MAX_UPLOAD_MB", default_value_t = 100)]
    max_upload_mb: usize,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snp_filter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    info!("SNP filter starting (reference: {:?})", args.reference);

    let processor = SnpProcessor::new(args.reference, args.max_upload_mb * 1024 * 1024);
    let analysis = processor.process(&args.report)?;

    match args.output_dir {
        Some(dir) => {
            let paths = OutputGenerator::new(dir).generate(&analysis, &args.format)?;
            info!("Wrote {} output files", paths.len());
        }
        None => {
            for format in &args.format {
                println!("{}", output::render(&analysis, *format)?);
            }
        }
    }

    Ok(())
}
