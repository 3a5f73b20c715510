// ==============================================================================
// genome23andme.rs - 23andMe Raw Data Filter
// ==============================================================================
// Description: Extracts SNPs of interest from 23andMe-style raw genome reports
// Author: Matt Barham
// Created: 2025-11-04
// Modified: 2026-10-19
// Version: 2.0.0
// ==============================================================================
// Format: Tab-delimited text with header comments
// Example:
//   # rsid    chromosome    position    genotype
//   rs548049170    1    69869    TT
//   rs13328684    1    74792    --
//   rs9283150    1    565508    AA
// ==============================================================================
// Parsing is lenient: lines that are not exactly 4 tab-delimited fields are
// skipped without error. When an rsid occurs more than once, the last line wins.
// ==============================================================================

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{FilteredReport, GeneMatches, ReferencePanel, SnpMatch};

/// Header written above filtered output
pub const REPORT_HEADER: &str = "# rsid\tchromosome\tposition\tgenotype";

const FIELD_COUNT: usize = 4;

/// One data line of a 23andMe report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    /// SNP identifier (e.g., "rs548049170")
    pub rsid: String,
    /// Chromosome ("1"-"22", "X", "Y", "MT")
    pub chromosome: String,
    /// Base pair position, kept as text
    pub position: String,
    /// Allele characters (e.g., "TT", "AG", "--" for no-call)
    pub genotype: String,
}

impl ReportLine {
    /// Split a report line into its four fields.
    ///
    /// Returns `None` for comment lines and for lines that do not have
    /// exactly 4 tab-delimited fields.
    pub fn parse(line: &str) -> Option<Self> {
        if line.starts_with('#') {
            return None;
        }
        Self::from_fields(line)
    }

    /// Split a line already accepted by the filter.
    ///
    /// No comment check: a line like ` #rs1\t1\t100\tGG` passes the filter
    /// and is stored trimmed, so its leading `#` belongs to the rsid.
    pub fn from_fields(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() != FIELD_COUNT {
            return None;
        }

        Some(Self {
            rsid: fields[0].trim().to_string(),
            chromosome: fields[1].trim().to_string(),
            position: fields[2].trim().to_string(),
            genotype: fields[3].trim().to_string(),
        })
    }
}

/// Errors that can occur while reading a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Report is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),
}

/// Decode raw report bytes as UTF-8 text
pub fn decode_report(bytes: Vec<u8>) -> Result<String, ReportError> {
    Ok(String::from_utf8(bytes)?)
}

/// Line counts gathered during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    pub lines_read: usize,
    pub comment_lines: usize,
    pub skipped_lines: usize,
    pub matched_lines: usize,
}

enum LineKind<'a> {
    Comment,
    Skipped,
    Data { rsid: &'a str, line: &'a str },
}

fn classify(raw: &str) -> LineKind<'_> {
    if raw.starts_with('#') {
        return LineKind::Comment;
    }

    let line = raw.trim();
    let mut fields = line.split('\t');
    let rsid = fields.next().unwrap_or_default().trim();

    // rsid already consumed, so three more fields make four
    if fields.count() != FIELD_COUNT - 1 {
        return LineKind::Skipped;
    }

    LineKind::Data { rsid, line }
}

/// Filter for 23andMe raw genome reports
#[derive(Debug, Clone, Default)]
pub struct Genome23Filter;

impl Genome23Filter {
    pub fn new() -> Self {
        Self
    }

    /// Keep the last report line for each rsid in `snp_ids`
    ///
    /// # Returns
    /// Map of rsid to trimmed line, plus scan statistics. SNP ids that never
    /// appear in the report are absent from the map.
    pub fn filter_snps(
        &self,
        report: &str,
        snp_ids: &HashSet<&str>,
    ) -> (HashMap<String, String>, FilterStats) {
        let mut stats = FilterStats::default();
        let mut matches: HashMap<String, String> = HashMap::new();

        for raw in report.lines() {
            stats.lines_read += 1;
            match classify(raw) {
                LineKind::Comment => stats.comment_lines += 1,
                LineKind::Skipped => stats.skipped_lines += 1,
                LineKind::Data { rsid, line } => {
                    if snp_ids.contains(rsid) {
                        stats.matched_lines += 1;
                        matches.insert(rsid.to_string(), line.to_string());
                    }
                }
            }
        }

        debug!(
            "Scanned {} lines ({} comments, {} skipped, {} matched)",
            stats.lines_read, stats.comment_lines, stats.skipped_lines, stats.matched_lines
        );

        (matches, stats)
    }

    /// Per-gene variant of [`filter_snps`](Self::filter_snps)
    ///
    /// Every gene of `panel` gets one entry per reference SNP, in reference
    /// order, holding the matched line or `None`. An rsid listed under several
    /// genes is filled in for each of them.
    pub fn filter_by_gene(&self, report: &str, panel: &ReferencePanel) -> (FilteredReport, FilterStats) {
        let lookup = panel.genes_by_snp();

        let mut filtered = FilteredReport {
            genes: panel
                .genes()
                .iter()
                .map(|gene| GeneMatches {
                    gene: gene.name.clone(),
                    snps: gene
                        .snps()
                        .iter()
                        .map(|snp| SnpMatch {
                            rsid: snp.rsid.clone(),
                            line: None,
                        })
                        .collect(),
                })
                .collect(),
        };

        let mut stats = FilterStats::default();

        for raw in report.lines() {
            stats.lines_read += 1;
            let (rsid, line) = match classify(raw) {
                LineKind::Comment => {
                    stats.comment_lines += 1;
                    continue;
                }
                LineKind::Skipped => {
                    stats.skipped_lines += 1;
                    continue;
                }
                LineKind::Data { rsid, line } => (rsid, line),
            };

            let Some(gene_indices) = lookup.get(rsid) else {
                continue;
            };

            stats.matched_lines += 1;
            for &idx in gene_indices {
                let gene = &panel.genes()[idx];
                for (snp, slot) in gene.snps().iter().zip(filtered.genes[idx].snps.iter_mut()) {
                    if snp.rsid == rsid {
                        slot.line = Some(line.to_string());
                    }
                }
            }
        }

        info!(
            "Filtered report: {} of {} lines matched reference SNPs ({} skipped)",
            stats.matched_lines, stats.lines_read, stats.skipped_lines
        );

        (filtered, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnpEntry;

    fn entry(rsid: &str) -> SnpEntry {
        SnpEntry {
            rsid: rsid.to_string(),
            ancestral: "G".to_string(),
            derived: "A".to_string(),
        }
    }

    fn panel(rows: &[(&str, &str)]) -> ReferencePanel {
        let mut panel = ReferencePanel::new();
        for (gene, rsid) in rows {
            panel.insert(gene, entry(rsid));
        }
        panel
    }

    const REPORT: &str = "\
# This data file generated by 23andMe
# rsid\tchromosome\tposition\tgenotype
rs548049170\t1\t69869\tTT
rs13328684\t1\t74792\t--
rs9283150\t1\t565508\tAA
rs12345678\t2\t100000\tAG
";

    #[test]
    fn test_parse_report_line() {
        let line = ReportLine::parse("rs12345678\t2\t100000\tAG").unwrap();
        assert_eq!(line.rsid, "rs12345678");
        assert_eq!(line.chromosome, "2");
        assert_eq!(line.position, "100000");
        assert_eq!(line.genotype, "AG");

        assert!(ReportLine::parse("# rsid\tchromosome\tposition\tgenotype").is_none());
        assert!(ReportLine::parse("rs1\t1\t100").is_none());
        assert!(ReportLine::parse("rs1\t1\t100\tAA\textra").is_none());

        let stored = ReportLine::from_fields("#rs1\t1\t100\tGG").unwrap();
        assert_eq!(stored.rsid, "#rs1");
        assert_eq!(stored.genotype, "GG");
    }

    #[test]
    fn test_filter_snps_flat() {
        let ids: HashSet<&str> = ["rs9283150", "rs12345678", "rs000"].into_iter().collect();
        let (matches, stats) = Genome23Filter::new().filter_snps(REPORT, &ids);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches["rs9283150"], "rs9283150\t1\t565508\tAA");
        assert_eq!(matches["rs12345678"], "rs12345678\t2\t100000\tAG");
        assert!(!matches.contains_key("rs000"));

        assert_eq!(stats.lines_read, 6);
        assert_eq!(stats.comment_lines, 2);
        assert_eq!(stats.skipped_lines, 0);
        assert_eq!(stats.matched_lines, 2);
    }

    #[test]
    fn test_last_match_wins() {
        let report = "rs1\t1\t100\tAA\nrs1\t1\t100\tGG\n";
        let ids: HashSet<&str> = ["rs1"].into_iter().collect();
        let (matches, _) = Genome23Filter::new().filter_snps(report, &ids);

        assert_eq!(matches["rs1"], "rs1\t1\t100\tGG");
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let report = "\
rs1\t1\t100
rs2\t1\t200\tAA\tEXTRA

rs3 1 300 AA
rs4\t1\t400\tCT
";
        let ids: HashSet<&str> = ["rs1", "rs2", "rs3", "rs4"].into_iter().collect();
        let (matches, stats) = Genome23Filter::new().filter_snps(report, &ids);

        assert_eq!(matches.len(), 1);
        assert!(matches.contains_key("rs4"));
        assert_eq!(stats.skipped_lines, 4);
    }

    #[test]
    fn test_whitespace_and_crlf() {
        let report = "  rs1  \t 1 \t 100 \t AG  \r\n";
        let ids: HashSet<&str> = ["rs1"].into_iter().collect();
        let (matches, _) = Genome23Filter::new().filter_snps(report, &ids);

        assert_eq!(matches["rs1"], "rs1  \t 1 \t 100 \t AG");
    }

    #[test]
    fn test_indented_comment_is_data_candidate() {
        // Only a leading '#' on the raw line marks a comment
        let report = " #rs1\t1\t100\tAA\n";
        let ids: HashSet<&str> = ["#rs1"].into_iter().collect();
        let (matches, stats) = Genome23Filter::new().filter_snps(report, &ids);

        assert_eq!(stats.comment_lines, 0);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_filter_by_gene_reference_order() {
        let panel = panel(&[("HERC2", "rs12345678"), ("HERC2", "rs9283150"), ("OCA2", "rs404")]);
        let (filtered, _) = Genome23Filter::new().filter_by_gene(REPORT, &panel);

        assert_eq!(filtered.genes.len(), 2);
        let lines: Vec<&str> = filtered.matched_lines().collect();
        assert_eq!(
            lines,
            vec!["rs12345678\t2\t100000\tAG", "rs9283150\t1\t565508\tAA"]
        );

        assert_eq!(filtered.genes[1].gene, "OCA2");
        assert_eq!(filtered.genes[1].snps[0].line, None);
    }

    #[test]
    fn test_filter_by_gene_shared_rsid() {
        let panel = panel(&[("A", "rs9283150"), ("B", "rs9283150")]);
        let (filtered, stats) = Genome23Filter::new().filter_by_gene(REPORT, &panel);

        assert_eq!(filtered.line("A", "rs9283150"), Some("rs9283150\t1\t565508\tAA"));
        assert_eq!(filtered.line("B", "rs9283150"), Some("rs9283150\t1\t565508\tAA"));
        assert_eq!(stats.matched_lines, 1);
        assert_eq!(filtered.matched_count(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let panel = panel(&[("HERC2", "rs9283150"), ("MC1R", "rs548049170")]);
        let filter = Genome23Filter::new();

        let first = filter.filter_by_gene(REPORT, &panel);
        let second = filter.filter_by_gene(REPORT, &panel);
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_report_rejects_invalid_utf8() {
        assert_eq!(decode_report(b"rs1\t1\t1\tAA".to_vec()).unwrap(), "rs1\t1\t1\tAA");
        assert!(matches!(
            decode_report(vec![0xff, 0xfe, 0x00]),
            Err(ReportError::InvalidEncoding(_))
        ));
    }
}
