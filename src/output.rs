// ==============================================================================
// output.rs - Multi-Format Output Generation
// ==============================================================================
// Description: Render filtered SNPs and per-gene allele percentages
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-19
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::models::{FilteredReport, ReferencePanel};
use crate::parsers::{FilterStats, REPORT_HEADER};
use crate::tally::GeneTally;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Filtered genotype report (23andMe layout) plus summary table
    Text,
    /// Per-gene percentage table
    Csv,
    /// Full analysis document
    Json,
}

impl OutputFormat {
    /// File name used when writing to an output directory
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "filtered_snps.txt",
            OutputFormat::Csv => "gene_percentages.csv",
            OutputFormat::Json => "summary.json",
        }
    }
}

/// Analysis metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub run_id: Uuid,
    pub processing_date: String,
    pub report_file: String,
    pub report_sha256: String,
    pub reference_file: String,
    pub genes: usize,
    pub reference_snps: usize,
    pub matched_snps: usize,
    pub report_lines: usize,
    pub skipped_lines: usize,
}

impl AnalysisMetadata {
    pub fn new(
        report_file: String,
        report_sha256: String,
        reference_file: String,
        panel: &ReferencePanel,
        filtered: &FilteredReport,
        stats: &FilterStats,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            processing_date: chrono::Utc::now().to_rfc3339(),
            report_file,
            report_sha256,
            reference_file,
            genes: panel.len(),
            reference_snps: panel.snp_count(),
            matched_snps: filtered.matched_count(),
            report_lines: stats.lines_read,
            skipped_lines: stats.skipped_lines,
        }
    }
}

/// Complete result of one run
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub metadata: AnalysisMetadata,
    pub filtered: FilteredReport,
    pub genes: Vec<GeneTally>,
}

/// One row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Gene")]
    pub gene: String,

    #[serde(rename = "Derived Allele Percentage")]
    pub derived: String,

    #[serde(rename = "Ancestral Allele Percentage")]
    pub ancestral: String,
}

/// Two decimals with a percent sign (e.g., "66.67%")
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Summary table rows, one per gene
pub fn summary_rows(tallies: &[GeneTally]) -> Vec<SummaryRow> {
    tallies
        .iter()
        .map(|t| SummaryRow {
            gene: t.gene.clone(),
            derived: format_percentage(t.derived_percentage),
            ancestral: format_percentage(t.ancestral_percentage),
        })
        .collect()
}

/// Header line followed by every matched line, newline-joined
pub fn render_filtered_text(filtered: &FilteredReport) -> String {
    std::iter::once(REPORT_HEADER)
        .chain(filtered.matched_lines())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary table as aligned plain text
pub fn render_table(rows: &[SummaryRow]) -> String {
    let gene_width = rows
        .iter()
        .map(|r| r.gene.len())
        .chain(std::iter::once("Gene".len()))
        .max()
        .unwrap_or(4);

    let mut out = format!(
        "{:<width$}  {:>27}  {:>29}\n",
        "Gene",
        "Derived Allele Percentage",
        "Ancestral Allele Percentage",
        width = gene_width
    );
    for row in rows {
        out.push_str(&format!(
            "{:<width$}  {:>27}  {:>29}\n",
            row.gene,
            row.derived,
            row.ancestral,
            width = gene_width
        ));
    }
    out
}

/// Summary table as CSV
pub fn write_csv<W: Write>(rows: &[SummaryRow], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["Gene", "Derived Allele Percentage", "Ancestral Allele Percentage"])?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render one format to a string (for stdout)
pub fn render(output: &AnalysisOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!(
            "{}\n\n{}",
            render_filtered_text(&output.filtered),
            render_table(&summary_rows(&output.genes))
        )),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(&summary_rows(&output.genes), &mut buf)?;
            Ok(String::from_utf8(buf)?)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
    }
}

/// Writes output files into a directory
pub struct OutputGenerator {
    output_dir: PathBuf,
}

impl OutputGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Write each requested format, returning the path of every file written
    pub fn generate(
        &self,
        output: &AnalysisOutput,
        formats: &[OutputFormat],
    ) -> Result<HashMap<OutputFormat, PathBuf>> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {:?}", self.output_dir)
        })?;

        let mut paths = HashMap::new();
        for &format in formats {
            let path = self.output_dir.join(format.file_name());
            self.generate_format(output, format, &path)?;
            info!("Wrote {:?} output: {:?}", format, path);
            paths.insert(format, path);
        }

        Ok(paths)
    }

    fn generate_format(&self, output: &AnalysisOutput, format: OutputFormat, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let mut writer = BufWriter::new(file);

        match format {
            OutputFormat::Text => {
                writeln!(writer, "{}", render_filtered_text(&output.filtered))?;
            }
            OutputFormat::Csv => {
                write_csv(&summary_rows(&output.genes), &mut writer)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, output)
                    .context("Failed to write JSON output")?;
                writeln!(writer)?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}
