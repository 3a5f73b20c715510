// ==============================================================================
// tally.rs - Ancestral/Derived Allele Tally
// ==============================================================================
// Description: Counts ancestral and derived alleles per gene from filtered SNPs
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   For every matched SNP of a gene, each character of the genotype adds one
//   to the gene's allele total. It is then counted as:
//   - ancestral if it equals the ancestral allele (checked first)
//   - derived if it equals the derived allele
//   - neither otherwise (still part of the total)
//   Percentages are 100 * count / total, or 0.0 when the total is 0.
// ==============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{FilteredReport, ReferencePanel};
use crate::parsers::ReportLine;

/// Allele counts and percentages for one gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneTally {
    pub gene: String,
    /// SNPs of the gene found in the report
    pub matched_snps: usize,
    pub ancestral_count: usize,
    pub derived_count: usize,
    /// Every genotype character seen, including ones matching neither allele
    pub total_alleles: usize,
    pub ancestral_percentage: f64,
    pub derived_percentage: f64,
}

impl GeneTally {
    fn new(gene: &str) -> Self {
        Self {
            gene: gene.to_string(),
            matched_snps: 0,
            ancestral_count: 0,
            derived_count: 0,
            total_alleles: 0,
            ancestral_percentage: 0.0,
            derived_percentage: 0.0,
        }
    }

    /// Count the characters of one genotype
    pub fn add_genotype(&mut self, genotype: &str, ancestral: &str, derived: &str) {
        for allele in genotype.chars() {
            self.total_alleles += 1;
            if is_allele(allele, ancestral) {
                self.ancestral_count += 1;
            } else if is_allele(allele, derived) {
                self.derived_count += 1;
            }
        }
    }

    /// Alleles matching neither the ancestral nor the derived state
    pub fn other_count(&self) -> usize {
        self.total_alleles - self.ancestral_count - self.derived_count
    }

    fn finish(&mut self) {
        self.ancestral_percentage = percentage(self.ancestral_count, self.total_alleles);
        self.derived_percentage = percentage(self.derived_count, self.total_alleles);
    }
}

/// `allele` is a single character equal to `c`
fn is_allele(c: char, allele: &str) -> bool {
    let mut chars = allele.chars();
    chars.next() == Some(c) && chars.next().is_none()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Tally alleles for every gene of the filtered report
///
/// Genes come back in the order of `filtered`. SNPs without a matched line
/// contribute nothing; a gene with no matched SNPs reports 0.0 for both
/// percentages.
pub fn tally_genes(filtered: &FilteredReport, panel: &ReferencePanel) -> Vec<GeneTally> {
    filtered
        .genes
        .iter()
        .map(|gene_matches| {
            let mut tally = GeneTally::new(&gene_matches.gene);
            let reference = panel.gene(&gene_matches.gene);

            debug!(
                "Gene: {}, Total SNPs: {}",
                gene_matches.gene,
                gene_matches.snps.len()
            );

            for snp in &gene_matches.snps {
                let Some(line) = snp.line.as_deref() else {
                    continue;
                };
                let Some(entry) = reference.and_then(|g| g.get(&snp.rsid)) else {
                    continue;
                };
                let Some(record) = ReportLine::from_fields(line) else {
                    continue;
                };

                tally.matched_snps += 1;
                tally.add_genotype(&record.genotype, &entry.ancestral, &entry.derived);

                debug!(
                    "Gene: {}, SNP: {}, Genotype: {}, Ancestral: {}, Derived: {} -> ancestral={}, derived={}, total={}",
                    tally.gene,
                    snp.rsid,
                    record.genotype,
                    entry.ancestral,
                    entry.derived,
                    tally.ancestral_count,
                    tally.derived_count,
                    tally.total_alleles
                );
            }

            tally.finish();

            debug!(
                "Gene: {}, Ancestral Percentage: {}, Derived Percentage: {}",
                tally.gene, tally.ancestral_percentage, tally.derived_percentage
            );

            tally
        })
        .collect()
}
