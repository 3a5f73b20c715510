// ==============================================================================
// models.rs - Gene/SNP Data Models
// ==============================================================================
// Description: Reference panel and filtered report structures
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A SNP of interest with its two allele states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnpEntry {
    /// rsID (e.g., "rs12345")
    pub rsid: String,

    /// Ancestral allele (e.g., "G")
    pub ancestral: String,

    /// Derived allele (e.g., "A")
    pub derived: String,
}

/// A gene and its SNPs, in the order they appear in the reference table
#[derive(Debug, Clone, Default)]
pub struct Gene {
    pub name: String,
    snps: Vec<SnpEntry>,
    index: HashMap<String, usize>,
}

impl Gene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snps: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a SNP entry.
    ///
    /// A repeated rsid keeps its original position but takes the new alleles.
    /// Returns `true` if the rsid was not already present.
    pub fn insert(&mut self, entry: SnpEntry) -> bool {
        match self.index.get(&entry.rsid) {
            Some(&pos) => {
                self.snps[pos] = entry;
                false
            }
            None => {
                self.index.insert(entry.rsid.clone(), self.snps.len());
                self.snps.push(entry);
                true
            }
        }
    }

    pub fn get(&self, rsid: &str) -> Option<&SnpEntry> {
        self.index.get(rsid).map(|&pos| &self.snps[pos])
    }

    pub fn snps(&self) -> &[SnpEntry] {
        &self.snps
    }

    pub fn len(&self) -> usize {
        self.snps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snps.is_empty()
    }
}

/// Genes of interest in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ReferencePanel {
    genes: Vec<Gene>,
    index: HashMap<String, usize>,
}

impl ReferencePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a SNP under `gene`, creating the gene on first sight
    pub fn insert(&mut self, gene: &str, entry: SnpEntry) {
        let pos = match self.index.get(gene) {
            Some(&pos) => pos,
            None => {
                self.index.insert(gene.to_string(), self.genes.len());
                self.genes.push(Gene::new(gene));
                self.genes.len() - 1
            }
        };
        self.genes[pos].insert(entry);
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn gene(&self, name: &str) -> Option<&Gene> {
        self.index.get(name).map(|&pos| &self.genes[pos])
    }

    /// Number of distinct genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Total (gene, SNP) pairs across all genes
    pub fn snp_count(&self) -> usize {
        self.genes.iter().map(Gene::len).sum()
    }

    /// Every distinct rsid of interest
    pub fn snp_ids(&self) -> HashSet<&str> {
        self.genes
            .iter()
            .flat_map(|g| g.snps.iter().map(|s| s.rsid.as_str()))
            .collect()
    }

    /// rsid -> indices of the genes listing it
    pub fn genes_by_snp(&self) -> HashMap<&str, Vec<usize>> {
        let mut lookup: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, gene) in self.genes.iter().enumerate() {
            for snp in &gene.snps {
                lookup.entry(snp.rsid.as_str()).or_default().push(idx);
            }
        }
        lookup
    }
}

/// Matched report line for one SNP of a gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnpMatch {
    pub rsid: String,
    /// Trimmed report line, `None` if the SNP was not in the report
    pub line: Option<String>,
}

/// Per-gene filter result, SNPs in reference order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneMatches {
    pub gene: String,
    pub snps: Vec<SnpMatch>,
}

/// Filter result for every gene of the reference panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredReport {
    pub genes: Vec<GeneMatches>,
}

impl FilteredReport {
    /// Matched line for `rsid` under `gene`
    pub fn line(&self, gene: &str, rsid: &str) -> Option<&str> {
        self.genes
            .iter()
            .find(|g| g.gene == gene)?
            .snps
            .iter()
            .find(|s| s.rsid == rsid)?
            .line
            .as_deref()
    }

    /// All matched lines in gene order, then SNP order
    pub fn matched_lines(&self) -> impl Iterator<Item = &str> {
        self.genes
            .iter()
            .flat_map(|g| g.snps.iter().filter_map(|s| s.line.as_deref()))
    }

    pub fn matched_count(&self) -> usize {
        self.matched_lines().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rsid: &str, ancestral: &str, derived: &str) -> SnpEntry {
        SnpEntry {
            rsid: rsid.to_string(),
            ancestral: ancestral.to_string(),
            derived: derived.to_string(),
        }
    }

    #[test]
    fn test_gene_order_is_first_seen() {
        let mut panel = ReferencePanel::new();
        panel.insert("MC1R", entry("rs3", "C", "T"));
        panel.insert("HERC2", entry("rs1", "A", "G"));
        panel.insert("MC1R", entry("rs2", "G", "A"));

        let names: Vec<&str> = panel.genes().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["MC1R", "HERC2"]);

        let mc1r: Vec<&str> = panel.gene("MC1R").unwrap().snps().iter().map(|s| s.rsid.as_str()).collect();
        assert_eq!(mc1r, vec!["rs3", "rs2"]);
        assert_eq!(panel.snp_count(), 3);
    }

    #[test]
    fn test_repeated_rsid_keeps_position() {
        let mut gene = Gene::new("OCA2");
        assert!(gene.insert(entry("rs1", "A", "G")));
        assert!(gene.insert(entry("rs2", "C", "T")));
        assert!(!gene.insert(entry("rs1", "T", "C")));

        assert_eq!(gene.len(), 2);
        assert_eq!(gene.snps()[0].rsid, "rs1");
        assert_eq!(gene.get("rs1").unwrap().ancestral, "T");
    }

    #[test]
    fn test_genes_by_snp_shared_rsid() {
        let mut panel = ReferencePanel::new();
        panel.insert("A", entry("rs1", "A", "G"));
        panel.insert("B", entry("rs1", "A", "G"));
        panel.insert("B", entry("rs2", "C", "T"));

        let lookup = panel.genes_by_snp();
        assert_eq!(lookup["rs1"], vec![0, 1]);
        assert_eq!(lookup["rs2"], vec![1]);
        assert_eq!(panel.snp_ids().len(), 2);
    }

    #[test]
    fn test_filtered_report_lookup() {
        let report = FilteredReport {
            genes: vec![GeneMatches {
                gene: "HERC2".to_string(),
                snps: vec![
                    SnpMatch { rsid: "rs1".to_string(), line: None },
                    SnpMatch { rsid: "rs2".to_string(), line: Some("rs2\t15\t100\tAG".to_string()) },
                ],
            }],
        };

        assert_eq!(report.line("HERC2", "rs2"), Some("rs2\t15\t100\tAG"));
        assert_eq!(report.line("HERC2", "rs1"), None);
        assert_eq!(report.line("MC1R", "rs2"), None);
        assert_eq!(report.matched_count(), 1);
    }
}
