// ==============================================================================
// lib.rs - SNP Filter Library
// ==============================================================================
// Description: Library interface for SNP filter modules
// Author: Matt Barham
// Created: 2025-11-03
// Modified: 2026-10-19
// Version: 2.0.0
// ==============================================================================

pub mod parsers;
pub mod validator;
pub mod models;
pub mod tally;
pub mod processor;
pub mod output;
