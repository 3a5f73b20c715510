// ==============================================================================
// validator.rs - Genotype Report Upload Validation
// ==============================================================================
// Description: Validates and reads uploaded genotype reports (size, type, gzip)
// Author: Matt Barham
// Created: 2025-10-31
// Modified: 2026-10-19
// Version: 2.0.0
// Security: Allowlist-only file types, magic number verification
// ==============================================================================

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::parsers::decode_report;

pub const DEFAULT_MAX_FILE_SIZE: usize = 100 * 1024 * 1024; // 100 MB

const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// A report that passed validation, decoded to text
#[derive(Debug)]
pub struct ValidatedReport {
    pub original_name: String,
    pub extension: String,
    /// Size on disk (compressed size for .txt.gz)
    pub size: u64,
    pub hash_sha256: String,
    pub validated_at: chrono::DateTime<chrono::Utc>,
    pub contents: String,
}

pub struct FileValidator {
    max_file_size: usize,
    allowed_types: HashMap<String, Vec<u8>>,
}

impl FileValidator {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_size(max_file_size: usize) -> Self {
        let mut allowed_types = HashMap::new();

        // 23andMe raw text file (plain text, no specific magic number)
        allowed_types.insert("txt".to_string(), vec![]);

        // Gzip compressed raw text file
        allowed_types.insert("txt.gz".to_string(), GZIP_MAGIC.to_vec());

        Self {
            max_file_size,
            allowed_types,
        }
    }

    /// Validate a report file and read its contents
    pub fn validate_report(&self, file_path: &Path) -> Result<ValidatedReport> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file path"))?
            .to_string_lossy()
            .to_string();

        info!("Validating report: {}", file_name);

        // 1. Size check
        let metadata = std::fs::metadata(file_path).context("Failed to get file metadata")?;
        let size = metadata.len() as usize;

        if size > self.max_file_size {
            anyhow::bail!(
                "File too large: {} bytes (max: {} bytes)",
                size,
                self.max_file_size
            );
        }
        debug!("Size check passed: {} bytes", size);

        // 2. Extension check (allowlist)
        let ext = self.get_extension(&file_name)?;
        let expected_magic = self
            .allowed_types
            .get(&ext)
            .ok_or_else(|| anyhow::anyhow!("Invalid file type: {}", ext))?;
        debug!("Extension check passed: {}", ext);

        let raw = std::fs::read(file_path).context("Failed to read report file")?;

        // 3. Magic number verification
        if !self.verify_magic_number(expected_magic, &raw) {
            anyhow::bail!("Magic number mismatch for .{} file", ext);
        }

        // 4. SHA-256 of the bytes as uploaded
        let hash = self.compute_sha256(&raw);
        debug!("SHA-256: {}", hash);

        // 5. Decompress and decode
        let bytes = if ext == "txt.gz" {
            let limit = self.max_file_size as u64;
            let mut decoded = Vec::new();
            GzDecoder::new(raw.as_slice())
                .take(limit + 1)
                .read_to_end(&mut decoded)
                .context("Failed to decompress report")?;

            if decoded.len() as u64 > limit {
                anyhow::bail!(
                    "Decompressed report too large: exceeds {} bytes",
                    self.max_file_size
                );
            }
            debug!("Decompressed {} -> {} bytes", raw.len(), decoded.len());
            decoded
        } else {
            raw
        };

        let contents = decode_report(bytes).context("Failed to decode report")?;

        Ok(ValidatedReport {
            original_name: file_name,
            extension: ext,
            size: metadata.len(),
            hash_sha256: hash,
            validated_at: chrono::Utc::now(),
            contents,
        })
    }

    fn get_extension(&self, filename: &str) -> Result<String> {
        let lower = filename.to_lowercase();

        // Handle compound extension
        if lower.ends_with(".txt.gz") {
            return Ok("txt.gz".to_string());
        }

        match lower.rsplit_once('.') {
            Some((_, ext)) => Ok(ext.to_string()),
            None => anyhow::bail!("No file extension found"),
        }
    }

    fn verify_magic_number(&self, expected: &[u8], actual: &[u8]) -> bool {
        actual.starts_with(expected)
    }

    fn compute_sha256(&self, data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        format!("{:x}", hasher.finalize())
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new()
    }
}
