// ==============================================================================
// processor.rs - Core SNP Filtering Pipeline
// ==============================================================================
// Description: Loads the gene reference, filters a genotype report, tallies alleles
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2026-10-19
// Version: 3.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::output::{AnalysisMetadata, AnalysisOutput};
use crate::parsers::{Genome23Filter, ReferenceParser};
use crate::tally::tally_genes;
use crate::validator::FileValidator;

pub struct SnpProcessor {
    reference_path: PathBuf,
    validator: FileValidator,
    filter: Genome23Filter,
}

impl SnpProcessor {
    pub fn new(reference_path: PathBuf, max_upload_size: usize) -> Self {
        Self {
            reference_path,
            validator: FileValidator::with_max_size(max_upload_size),
            filter: Genome23Filter::new(),
        }
    }

    /// Run the full pipeline for one uploaded report
    ///
    /// The reference table is re-read on every call.
    pub fn process(&self, report_path: &Path) -> Result<AnalysisOutput> {
        info!("Starting SNP filtering for {:?}", report_path);

        // 1. Load gene reference
        let panel = ReferenceParser::load(&self.reference_path).with_context(|| {
            format!("Failed to load SNP reference table {:?}", self.reference_path)
        })?;

        if panel.is_empty() {
            warn!("Reference table {:?} lists no SNPs", self.reference_path);
        }

        // 2. Validate and read the report
        let report = self
            .validator
            .validate_report(report_path)
            .context("Report validation failed")?;

        // 3. Filter report lines by gene
        let (filtered, stats) = self.filter.filter_by_gene(&report.contents, &panel);

        // 4. Tally alleles
        let genes = tally_genes(&filtered, &panel);

        let metadata = AnalysisMetadata::new(
            report.original_name,
            report.hash_sha256,
            self.reference_path.display().to_string(),
            &panel,
            &filtered,
            &stats,
        );

        info!(
            "Processing complete: {} of {} reference SNPs found across {} genes",
            metadata.matched_snps, metadata.reference_snps, metadata.genes
        );

        Ok(AnalysisOutput {
            metadata,
            filtered,
            genes,
        })
    }
}
