// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for the gene reference table and genotype reports
// Author: Matt Barham
// Created: 2025-11-03
// Modified: 2026-10-19
// Version: 2.0.0
// ==============================================================================

pub mod genome23andme;
pub mod reference;

pub use genome23andme::{decode_report, FilterStats, Genome23Filter, ReportError, ReportLine, REPORT_HEADER};
pub use reference::{ReferenceParseError, ReferenceParser};
