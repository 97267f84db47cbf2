//! Merging parsed files into one rectangular dataset, plus the cache slot
//! that holds the latest merge.
//!
//! The critical correctness step is [`normalize_rows`]: after it runs, every
//! row carries exactly the dataset's column set, with `Null` substituted for
//! columns the row's source file never had. The query engine and any
//! downstream consumer assume that rectangular shape.
//!
//! The cache is rebuilt, never patched. Every registry mutation and every
//! enrichment adoption goes through [`MergeCache::invalidate`] or
//! [`MergeCache::replace`].

use serde::{Deserialize, Serialize};

use crate::{
    data::{Cell, Row},
    parse::ParsedFile,
    registry::DataFile,
    schema,
};

/// Provenance columns tagged onto every merged row. Not part of any user
/// schema; always appended after the user column union.
pub const SOURCE_FILE_ID: &str = "_sourceFileId";
pub const SOURCE_FILE_NAME: &str = "_sourceFile";

/// On-disk copy of the latest adopted dataset, written when enrichment
/// replaces the cache so later invocations see the enriched columns.
pub const SNAPSHOT_FILE: &str = "dataset_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedDataset {
    pub rows: Vec<Row>,
    pub columns: Vec<String>,
    #[serde(rename = "files")]
    pub source_files: Vec<DataFile>,
}

impl MergedDataset {
    pub fn empty() -> Self {
        MergedDataset {
            rows: Vec::new(),
            columns: Vec::new(),
            source_files: Vec::new(),
        }
    }
}

/// Merges parsed files in the order given (callers pass ascending upload
/// order). Accumulates the column union, tags provenance, and normalizes
/// every row to the full union.
pub fn merge_files(parsed: Vec<(DataFile, ParsedFile)>) -> MergedDataset {
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Row> = Vec::new();
    let mut source_files = Vec::with_capacity(parsed.len());

    for (file, contents) in parsed {
        columns = schema::column_union(&columns, &contents.columns);
        for mut row in contents.rows {
            row.insert(
                SOURCE_FILE_ID.to_string(),
                Cell::Str(file.id.to_string()),
            );
            row.insert(
                SOURCE_FILE_NAME.to_string(),
                Cell::Str(file.original_name.clone()),
            );
            rows.push(row);
        }
        source_files.push(file);
    }

    if !source_files.is_empty() {
        columns.push(SOURCE_FILE_ID.to_string());
        columns.push(SOURCE_FILE_NAME.to_string());
    }

    normalize_rows(&mut rows, &columns);
    MergedDataset {
        rows,
        columns,
        source_files,
    }
}

/// Forces every row's key set to equal `columns` exactly: absent keys get
/// `Null`, keys outside the set are dropped.
pub fn normalize_rows(rows: &mut [Row], columns: &[String]) {
    for row in rows.iter_mut() {
        row.retain(|key, _| columns.iter().any(|c| c == key));
        for column in columns {
            row.entry(column.clone()).or_insert(Cell::Null);
        }
    }
}

/// Cache slot for the latest merged dataset. Reads are "read or lazily
/// rebuild"; there is no background refresh.
#[derive(Debug, Default)]
pub struct MergeCache {
    slot: Option<MergedDataset>,
}

impl MergeCache {
    pub fn get(&self) -> Option<&MergedDataset> {
        self.slot.as_ref()
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn replace(&mut self, dataset: MergedDataset) -> &MergedDataset {
        self.slot.insert(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn data_file(name: &str, columns: &[&str]) -> DataFile {
        DataFile {
            id: Uuid::new_v4(),
            stored_path: PathBuf::from(name),
            original_name: name.to_string(),
            size_bytes: 0,
            row_count: 0,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            date_range_start: None,
            date_range_end: None,
            uploaded_by: "tester".to_string(),
            created_at: Utc::now(),
            active: true,
        }
    }

    fn parsed(columns: &[&str], rows: Vec<Vec<&str>>) -> ParsedFile {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|values| {
                columns
                    .iter()
                    .zip(values)
                    .map(|(c, v)| (c.clone(), Cell::from_raw(v)))
                    .collect::<Row>()
            })
            .collect();
        ParsedFile { columns, rows }
    }

    #[test]
    fn merge_computes_union_and_null_fills() {
        let a = data_file("a.csv", &["x", "y"]);
        let b = data_file("b.csv", &["y", "z"]);
        let merged = merge_files(vec![
            (a, parsed(&["x", "y"], vec![vec!["1", "2"]])),
            (b, parsed(&["y", "z"], vec![vec!["3", "4"]])),
        ]);

        assert_eq!(
            merged.columns,
            vec!["x", "y", "z", SOURCE_FILE_ID, SOURCE_FILE_NAME]
        );
        assert_eq!(merged.rows[0].get("z"), Some(&Cell::Null));
        assert_eq!(merged.rows[1].get("x"), Some(&Cell::Null));
    }

    #[test]
    fn merged_rows_are_rectangular() {
        let merged = merge_files(vec![
            (
                data_file("a.csv", &["x", "y"]),
                parsed(&["x", "y"], vec![vec!["1", "2"]]),
            ),
            (
                data_file("b.csv", &["y", "z"]),
                parsed(&["y", "z"], vec![vec!["3", "4"]]),
            ),
        ]);
        for row in &merged.rows {
            assert_eq!(row.len(), merged.columns.len());
            for column in &merged.columns {
                assert!(row.contains_key(column), "missing key {column}");
            }
        }
    }

    #[test]
    fn provenance_identifies_source_file() {
        let file = data_file("calls.csv", &["a"]);
        let id = file.id;
        let merged = merge_files(vec![(file, parsed(&["a"], vec![vec!["1"]]))]);
        assert_eq!(
            merged.rows[0].get(SOURCE_FILE_ID),
            Some(&Cell::Str(id.to_string()))
        );
        assert_eq!(
            merged.rows[0].get(SOURCE_FILE_NAME),
            Some(&Cell::Str("calls.csv".to_string()))
        );
    }

    #[test]
    fn empty_input_produces_empty_dataset_without_provenance_columns() {
        let merged = merge_files(Vec::new());
        assert!(merged.rows.is_empty());
        assert!(merged.columns.is_empty());
    }

    #[test]
    fn cache_replace_and_invalidate() {
        let mut cache = MergeCache::default();
        assert!(cache.get().is_none());
        cache.replace(MergedDataset::empty());
        assert!(cache.get().is_some());
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
