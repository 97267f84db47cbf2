//! The workspace: one value owning the registry, the merge cache, and the
//! BOE cache, injected into every surface operation.
//!
//! Reads are "read or lazily rebuild"; every mutating operation (upload,
//! soft delete, restore) invalidates the merge cache, and enrichment adopts
//! its output as the new cache contents. A forced refresh always rebuilds
//! from the registry alone, so a stale enrichment snapshot can never clobber
//! a registry mutation.

use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    boe::BoeCache,
    config::Config,
    data::parse_naive_date,
    enrich,
    error::CoreError,
    ingest::{self, MergeCache, MergedDataset},
    parse::{self, ParsedFile},
    query::{self, QueryOutcome, QuerySpec, QueryTranslator},
    registry::{DataFile, Registry},
    schema::{self, SchemaDiff},
};

const UPLOAD_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Share of a column's non-empty values that must parse as dates for the
/// column to supply the file's date range.
const DATE_COLUMN_THRESHOLD_PERCENT: usize = 50;

#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub file: DataFile,
    pub diff: SchemaDiff,
}

#[derive(Debug, Serialize)]
pub struct EnrichmentOutcome {
    pub message: String,
    pub enriched_count: usize,
    pub added_columns: Vec<String>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentKind {
    Carrier,
    Geocode,
    Timezone,
    PropertyTax,
    PropertyLinks,
}

pub struct Workspace {
    config: Config,
    registry: Registry,
    cache: MergeCache,
    boe: BoeCache,
}

impl Workspace {
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(config.uploads_dir())
            .with_context(|| format!("Creating data directory {:?}", config.data_dir))?;
        let registry = Registry::load(&config.registry_path())?;
        let boe = BoeCache::new(config.boe_snapshot_path());
        Ok(Workspace {
            config,
            registry,
            cache: MergeCache::default(),
            boe,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Offline and test seam: adopt pre-built BOE reference data so
    /// property-tax enrichment needs no network.
    pub fn seed_boe(&mut self, data: crate::boe::BoeData) {
        self.boe.seed(data);
    }

    pub fn list_files(&self) -> &[DataFile] {
        &self.registry.files
    }

    /// Returns the merged dataset, rebuilding at most once per cache epoch.
    /// An on-disk snapshot (written when enrichment adopts a dataset) fills
    /// an empty cache first, so enriched columns survive across processes; a
    /// forced refresh discards it and rebuilds from the registry alone.
    pub fn load_all(&mut self, force_refresh: bool) -> Result<&MergedDataset> {
        if force_refresh {
            self.cache.invalidate();
            self.discard_snapshot();
        }
        if self.cache.get().is_none() {
            if let Some(dataset) = self.load_snapshot() {
                self.cache.replace(dataset);
            } else {
                let dataset = self.rebuild()?;
                info!(
                    "Merged {} file(s) into {} row(s), {} column(s)",
                    dataset.source_files.len(),
                    dataset.rows.len(),
                    dataset.columns.len()
                );
                self.cache.replace(dataset);
            }
        }
        self.cache
            .get()
            .ok_or_else(|| anyhow!("Merge cache empty after rebuild"))
    }

    fn load_snapshot(&self) -> Option<MergedDataset> {
        let path = self.config.dataset_snapshot_path();
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<MergedDataset>(&raw) {
            Ok(dataset) => Some(dataset),
            Err(err) => {
                warn!("Ignoring unreadable dataset snapshot {path:?}: {err}");
                None
            }
        }
    }

    fn write_snapshot(&self, dataset: &MergedDataset) {
        let path = self.config.dataset_snapshot_path();
        match serde_json::to_string_pretty(dataset) {
            Ok(serialized) => {
                if let Err(err) = fs::write(&path, serialized) {
                    warn!("Failed to write dataset snapshot {path:?}: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize dataset snapshot: {err}"),
        }
    }

    /// Registry mutations and forced refreshes make any adopted enrichment
    /// stale; the snapshot goes with the in-memory cache.
    fn discard_snapshot(&self) {
        let path = self.config.dataset_snapshot_path();
        if path.exists() {
            if let Err(err) = fs::remove_file(&path) {
                warn!("Failed to remove dataset snapshot {path:?}: {err}");
            }
        }
    }

    /// Rebuilds from the registry alone: active files in ascending upload
    /// order, one unreadable file skipped with a warning rather than failing
    /// the whole merge.
    fn rebuild(&self) -> Result<MergedDataset> {
        let active = self.registry.active_files();
        if active.is_empty() {
            if let Some(default) = &self.config.default_file {
                if default.exists() {
                    return self.merge_default(default);
                }
            }
            // Empty data is a valid state, not an error.
            return Ok(MergedDataset::empty());
        }

        let mut parsed = Vec::with_capacity(active.len());
        for file in active {
            match read_and_parse(&file.stored_path, &file.original_name) {
                Ok(contents) => parsed.push((file.clone(), contents)),
                Err(err) => warn!("Skipping '{}': {err}", file.original_name),
            }
        }
        Ok(ingest::merge_files(parsed))
    }

    fn merge_default(&self, path: &Path) -> Result<MergedDataset> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let contents = read_and_parse(path, &name)?;
        let file = DataFile {
            id: Uuid::new_v4(),
            stored_path: path.to_path_buf(),
            original_name: name,
            size_bytes: fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            row_count: contents.rows.len(),
            columns: contents.columns.clone(),
            date_range_start: None,
            date_range_end: None,
            uploaded_by: "default".to_string(),
            created_at: Utc::now(),
            active: true,
        };
        Ok(ingest::merge_files(vec![(file, contents)]))
    }

    pub fn upload(&mut self, source: &Path, uploaded_by: &str) -> Result<UploadOutcome> {
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CoreError::validation(format!(
                "Unsupported file type '.{extension}'; expected .csv, .tsv, or .txt"
            ))
            .into());
        }

        let size_bytes = fs::metadata(source)
            .with_context(|| format!("Reading upload {source:?}"))?
            .len();
        if size_bytes > self.config.max_upload_bytes {
            return Err(CoreError::validation(format!(
                "File is {size_bytes} bytes; the upload cap is {} bytes",
                self.config.max_upload_bytes
            ))
            .into());
        }

        let original_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        let bytes =
            fs::read(source).with_context(|| format!("Reading upload {source:?}"))?;
        // A parse failure rejects the upload before any state mutation.
        let contents = parse::parse_delimited(&bytes, &original_name)?;

        let diff = schema::diff(&self.registry.active_column_union(), &contents.columns);
        let (date_range_start, date_range_end) = detect_date_range(&contents);

        let id = Uuid::new_v4();
        let stored_path = self.config.uploads_dir().join(format!("{id}.{extension}"));
        fs::write(&stored_path, &bytes)
            .with_context(|| format!("Storing upload at {stored_path:?}"))?;

        let file = DataFile {
            id,
            stored_path,
            original_name,
            size_bytes,
            row_count: contents.rows.len(),
            columns: contents.columns,
            date_range_start,
            date_range_end,
            uploaded_by: uploaded_by.to_string(),
            created_at: Utc::now(),
            active: true,
        };
        self.registry.insert(file.clone());
        self.registry.save(&self.config.registry_path())?;
        self.cache.invalidate();
        self.discard_snapshot();

        info!(
            "Registered '{}' ({} row(s), {} column(s))",
            file.original_name,
            file.row_count,
            file.columns.len()
        );
        Ok(UploadOutcome { file, diff })
    }

    pub fn remove_file(&mut self, id: Uuid, purge_bytes: bool) -> Result<DataFile> {
        let file = self.registry.deactivate(id, purge_bytes)?.clone();
        self.registry.save(&self.config.registry_path())?;
        self.cache.invalidate();
        self.discard_snapshot();
        info!("Deactivated '{}'", file.original_name);
        Ok(file)
    }

    pub fn restore_file(&mut self, id: Uuid) -> Result<DataFile> {
        let file = self.registry.restore(id)?.clone();
        self.registry.save(&self.config.registry_path())?;
        self.cache.invalidate();
        self.discard_snapshot();
        info!("Restored '{}'", file.original_name);
        Ok(file)
    }

    /// Runs one enrichment pass over the merged dataset and adopts the
    /// result as the new cache contents.
    pub fn enrich(&mut self, kind: EnrichmentKind) -> Result<EnrichmentOutcome> {
        let (rows, columns, source_files) = {
            let dataset = self.load_all(false)?;
            (
                dataset.rows.clone(),
                dataset.columns.clone(),
                dataset.source_files.clone(),
            )
        };

        let result = match kind {
            EnrichmentKind::Carrier => enrich::carrier(rows),
            EnrichmentKind::Geocode => enrich::geocode(rows),
            EnrichmentKind::Timezone => enrich::timezone(rows),
            EnrichmentKind::PropertyTax => {
                let data = self.boe.get(&self.config.boe)?;
                enrich::property_tax(rows, data)
            }
            EnrichmentKind::PropertyLinks => enrich::property_links(rows),
        };

        // Different passes add different columns to different rows; recompute
        // the union and re-normalize before adopting the result.
        let mut rows = result.rows;
        let columns = schema::union_of_rows(&columns, &rows);
        ingest::normalize_rows(&mut rows, &columns);
        let row_count = rows.len();
        let dataset = MergedDataset {
            rows,
            columns,
            source_files,
        };
        // Persist the adopted dataset so the enriched columns are visible
        // to later invocations, not just this process.
        self.write_snapshot(&dataset);
        self.cache.replace(dataset);

        Ok(EnrichmentOutcome {
            message: result.message,
            enriched_count: result.enriched_count,
            added_columns: result.added_columns,
            row_count,
        })
    }

    pub fn query(&mut self, spec: &QuerySpec) -> Result<QueryOutcome> {
        let dataset = self.load_all(false)?;
        Ok(query::run_query(&dataset.rows, spec))
    }

    /// Natural-language entry point; the translator is the external black
    /// box behind a trait so callers (and tests) choose the implementation.
    pub fn query_message(
        &mut self,
        message: &str,
        translator: &dyn QueryTranslator,
    ) -> Result<QueryOutcome> {
        let columns = self.load_all(false)?.columns.clone();
        let translation = translator.translate(message, &columns)?;
        let mut outcome = self.query(&translation.spec)?;
        outcome.explanation = translation.explanation;
        Ok(outcome)
    }
}

fn read_and_parse(path: &Path, name: &str) -> Result<ParsedFile> {
    let bytes = fs::read(path).with_context(|| format!("Reading stored file {path:?}"))?;
    Ok(parse::parse_delimited(&bytes, name)?)
}

/// First column whose non-empty values are mostly dates supplies the range.
fn detect_date_range(contents: &ParsedFile) -> (Option<NaiveDate>, Option<NaiveDate>) {
    for column in &contents.columns {
        let mut non_empty = 0usize;
        let mut dates: Vec<NaiveDate> = Vec::new();
        for row in &contents.rows {
            let Some(raw) = row.get(column).and_then(|cell| cell.as_str()) else {
                continue;
            };
            non_empty += 1;
            if let Ok(date) = parse_naive_date(raw) {
                dates.push(date);
            }
        }
        if non_empty > 0 && dates.len() * 100 > non_empty * DATE_COLUMN_THRESHOLD_PERCENT {
            let start = dates.iter().min().copied();
            let end = dates.iter().max().copied();
            return (start, end);
        }
    }
    (None, None)
}
