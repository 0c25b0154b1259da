//! Parameters for building epoch caches and datasets
//!
//! Loaded from JSON; every field has a default.

use std::fs;
use std::path::Path;

use dagger_core::{Hasher, Keccak512Hasher, MIX_BYTES, ROW_BYTES, Row, Sha512Hasher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default cache size (16 MiB)
pub const DEFAULT_CACHE_BYTES: usize = 16 * 1024 * 1024;

/// Default logical dataset size (1 GiB)
pub const DEFAULT_DATASET_BYTES: u64 = 1024 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 512-bit primitive used for every hash in the scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    #[default]
    Sha512,
    Keccak512,
}

impl HashKind {
    pub fn hasher(self) -> SelectedHasher {
        match self {
            HashKind::Sha512 => SelectedHasher::Sha512(Sha512Hasher::default()),
            HashKind::Keccak512 => SelectedHasher::Keccak512(Keccak512Hasher::default()),
        }
    }
}

/// Hasher picked from configuration at runtime
#[derive(Clone)]
pub enum SelectedHasher {
    Sha512(Sha512Hasher),
    Keccak512(Keccak512Hasher),
}

impl Hasher for SelectedHasher {
    #[inline]
    fn digest_parts(&mut self, parts: &[&[u8]]) -> Row {
        match self {
            SelectedHasher::Sha512(h) => h.digest_parts(parts),
            SelectedHasher::Keccak512(h) => h.digest_parts(parts),
        }
    }
}

/// Sizes and primitive for every epoch built from this configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaggerConfig {
    /// Cache size in bytes, a multiple of 64
    pub cache_bytes: usize,
    /// Logical dataset size in bytes, a multiple of 128
    pub dataset_bytes: u64,
    /// Hash primitive
    pub hash: HashKind,
    /// Materialise the full dataset on every rollover
    pub full_dataset: bool,
}

impl Default for DaggerConfig {
    fn default() -> Self {
        Self {
            cache_bytes: DEFAULT_CACHE_BYTES,
            dataset_bytes: DEFAULT_DATASET_BYTES,
            hash: HashKind::default(),
            full_dataset: false,
        }
    }
}

impl DaggerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_bytes == 0 || self.cache_bytes % ROW_BYTES != 0 {
            return Err(ConfigError::Invalid {
                field: "cache_bytes",
                reason: format!("{} is not a positive multiple of {}", self.cache_bytes, ROW_BYTES),
            });
        }

        if self.dataset_bytes == 0 || self.dataset_bytes % MIX_BYTES as u64 != 0 {
            return Err(ConfigError::Invalid {
                field: "dataset_bytes",
                reason: format!(
                    "{} is not a positive multiple of {}",
                    self.dataset_bytes, MIX_BYTES
                ),
            });
        }

        if self.full_dataset && usize::try_from(self.dataset_bytes).is_err() {
            return Err(ConfigError::Invalid {
                field: "dataset_bytes",
                reason: "too large to materialise on this platform".to_string(),
            });
        }

        Ok(())
    }
}
