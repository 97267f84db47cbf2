//! Runtime configuration: data directory, size caps, and BOE endpoints.
//!
//! Loaded from an optional YAML file; every field has a default so the crate
//! runs with no configuration at all.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for the registry, stored uploads, and caches.
    pub data_dir: PathBuf,
    /// Fallback dataset used when no files have been uploaded yet.
    pub default_file: Option<PathBuf>,
    pub max_upload_bytes: u64,
    pub boe: BoeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoeConfig {
    pub city_endpoint: String,
    pub county_endpoint: String,
    pub timeout_secs: u64,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("calldeck-data"),
            default_file: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            boe: BoeConfig::default(),
        }
    }
}

impl Default for BoeConfig {
    fn default() -> Self {
        BoeConfig {
            city_endpoint: "https://data.boe.ca.gov/resource/city-valuations.json".to_string(),
            county_endpoint: "https://data.boe.ca.gov/resource/county-tax-allocations.json"
                .to_string(),
            timeout_secs: 20,
            page_size: 5000,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Opening config file {path:?}"))?;
                serde_yaml::from_str(&raw)
                    .with_context(|| format!("Parsing config file {path:?}"))
            }
            None => Ok(Config::default()),
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(crate::registry::REGISTRY_FILE)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn boe_snapshot_path(&self) -> PathBuf {
        self.data_dir.join(crate::boe::SNAPSHOT_FILE)
    }

    pub fn dataset_snapshot_path(&self) -> PathBuf {
        self.data_dir.join(crate::ingest::SNAPSHOT_FILE)
    }
}
