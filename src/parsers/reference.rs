// ==============================================================================
// reference.rs - Gene/SNP Reference Table Parser
// ==============================================================================
// Description: Loads the curated list of SNPs of interest grouped by gene
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: CSV file with header (extra columns ignored)
// Example:
//   gene,rsid,derived,ancestral
//   HERC2,rs12913832,G,A
//   MC1R,rs1805007,T,C
// ==============================================================================

use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ReferencePanel, SnpEntry};

const GENE_COL: usize = 0;
const RSID_COL: usize = 1;
const DERIVED_COL: usize = 2;
const ANCESTRAL_COL: usize = 3;
const MIN_COLUMNS: usize = 4;

/// Errors that can occur while loading the reference table
#[derive(Error, Debug)]
pub enum ReferenceParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Malformed reference row at line {line}: expected at least 4 columns, found {found}")]
    MalformedRow { line: u64, found: usize },

    #[error("Reference table is empty (missing header row)")]
    MissingHeader,
}

/// Line number of the first blank row after the header, ignoring newlines
/// inside quoted fields
fn find_blank_row(text: &str) -> Option<u64> {
    let mut in_quotes = false;
    for (idx, line) in text.lines().enumerate() {
        if idx > 0 && !in_quotes && line.is_empty() {
            return Some(idx as u64 + 1);
        }
        if line.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
    }
    None
}

/// Reference table parser
pub struct ReferenceParser;

impl ReferenceParser {
    /// Load the reference table from disk
    ///
    /// # Format
    /// Columns in order: gene, rsid, derived allele, ancestral allele.
    /// The first row is a header and is skipped. Every field is trimmed.
    ///
    /// # Errors
    /// A row with fewer than four columns, blank rows included, aborts the
    /// load with `ReferenceParseError::MalformedRow`. Empty input has no
    /// header and fails with `ReferenceParseError::MissingHeader`.
    pub fn load(path: impl AsRef<Path>) -> Result<ReferencePanel, ReferenceParseError> {
        let path = path.as_ref();
        info!("Loading SNP reference table: {:?}", path);

        let file = std::fs::File::open(path)?;
        let panel = Self::from_reader(file)?;

        info!(
            "Loaded {} genes ({} SNPs) from reference table",
            panel.len(),
            panel.snp_count()
        );

        Ok(panel)
    }

    /// Parse a reference table from any reader
    pub fn from_reader<R: Read>(mut reader: R) -> Result<ReferencePanel, ReferenceParseError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        if text.is_empty() {
            return Err(ReferenceParseError::MissingHeader);
        }

        // The CSV reader drops blank lines, so catch them first
        if let Some(line) = find_blank_row(&text) {
            return Err(ReferenceParseError::MalformedRow { line, found: 0 });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut panel = ReferencePanel::new();

        for result in reader.records() {
            let record = result?;

            if record.len() < MIN_COLUMNS {
                return Err(ReferenceParseError::MalformedRow {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    found: record.len(),
                });
            }

            let gene = &record[GENE_COL];
            let entry = SnpEntry {
                rsid: record[RSID_COL].to_string(),
                ancestral: record[ANCESTRAL_COL].to_string(),
                derived: record[DERIVED_COL].to_string(),
            };

            debug!(
                "Reference SNP {} for gene {} (ancestral={}, derived={})",
                entry.rsid, gene, entry.ancestral, entry.derived
            );

            panel.insert(gene, entry);
        }

        Ok(panel)
    }
}
