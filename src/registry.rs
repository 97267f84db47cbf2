//! Persistent metadata about every uploaded file.
//!
//! The registry is a JSON document in the data directory. Removal is a soft
//! delete (`active` flips to false); deleting the stored bytes is a separate,
//! optional step, so a restore normally brings the file straight back into
//! the merged dataset.

use std::{fs, fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REGISTRY_FILE: &str = "registry.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFile {
    pub id: Uuid,
    pub stored_path: PathBuf,
    pub original_name: String,
    pub size_bytes: u64,
    pub row_count: usize,
    /// Column list detected at upload time for this file. Never mutated.
    pub columns: Vec<String>,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    pub files: Vec<DataFile>,
}

impl Registry {
    /// Missing registry file loads as an empty registry (first run).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Registry::default());
        }
        let file =
            File::open(path).with_context(|| format!("Opening registry file {path:?}"))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("Parsing registry JSON")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating registry directory {parent:?}"))?;
        }
        let file =
            File::create(path).with_context(|| format!("Creating registry file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing registry JSON")
    }

    pub fn insert(&mut self, file: DataFile) {
        self.files.push(file);
    }

    /// Active entries in ascending upload order; ties keep insertion order.
    pub fn active_files(&self) -> Vec<&DataFile> {
        let mut active = self.files.iter().filter(|f| f.active).collect::<Vec<_>>();
        active.sort_by_key(|f| f.created_at);
        active
    }

    /// Soft delete. `purge_bytes` additionally removes the stored file from
    /// disk, which makes a later restore fail.
    pub fn deactivate(&mut self, id: Uuid, purge_bytes: bool) -> Result<&DataFile> {
        let file = self
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| anyhow!("No registered file with id {id}"))?;
        file.active = false;
        if purge_bytes && file.stored_path.exists() {
            fs::remove_file(&file.stored_path)
                .with_context(|| format!("Removing stored file {:?}", file.stored_path))?;
        }
        Ok(file)
    }

    pub fn restore(&mut self, id: Uuid) -> Result<&DataFile> {
        let file = self
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| anyhow!("No registered file with id {id}"))?;
        if !file.stored_path.exists() {
            return Err(anyhow!(
                "Stored bytes for '{}' were purged; cannot restore",
                file.original_name
            ));
        }
        file.active = true;
        Ok(file)
    }

    /// Column union across active files, ascending upload order.
    pub fn active_column_union(&self) -> Vec<String> {
        let mut union: Vec<String> = Vec::new();
        for file in self.active_files() {
            union = crate::schema::column_union(&union, &file.columns);
        }
        union
    }
}
