//! Schema reconciliation across source files.
//!
//! The merged column union preserves first-seen order: files are folded in
//! ascending upload order and newly introduced columns are appended at the
//! end, never reordering existing ones. [`diff`] powers the schema-drift
//! warning returned to uploaders.

use serde::Serialize;

use crate::data::Row;

/// Informational schema-drift diff between the existing column union and a
/// newly uploaded file. Never an error.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SchemaDiff {
    #[serde(rename = "newColumns")]
    pub new_columns: Vec<String>,
    #[serde(rename = "missingColumns")]
    pub missing_columns: Vec<String>,
    #[serde(rename = "hasChanges")]
    pub has_changes: bool,
}

/// Folds `incoming` into `existing`, appending unseen columns in order.
pub fn column_union(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut union = existing.to_vec();
    for column in incoming {
        if !union.iter().any(|c| c == column) {
            union.push(column.clone());
        }
    }
    union
}

/// `new_columns = incoming − existing`, `missing_columns = existing − incoming`,
/// each preserving the order of the operand it came from.
pub fn diff(existing: &[String], incoming: &[String]) -> SchemaDiff {
    let new_columns = incoming
        .iter()
        .filter(|c| !existing.contains(c))
        .cloned()
        .collect::<Vec<_>>();
    let missing_columns = existing
        .iter()
        .filter(|c| !incoming.contains(c))
        .cloned()
        .collect::<Vec<_>>();
    let has_changes = !new_columns.is_empty() || !missing_columns.is_empty();
    SchemaDiff {
        new_columns,
        missing_columns,
        has_changes,
    }
}

/// Recomputes the column union over a mutated row set, seeded with the
/// existing ordered columns. Used after enrichment passes, which may add
/// different columns to different rows.
pub fn union_of_rows(seed: &[String], rows: &[Row]) -> Vec<String> {
    let mut union = seed.to_vec();
    for row in rows {
        for key in row.keys() {
            if !union.iter().any(|c| c == key) {
                union.push(key.clone());
            }
        }
    }
    union
}
