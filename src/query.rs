//! Ad-hoc query engine: structured filter/sort/aggregation specifications
//! applied to the in-memory merged dataset.
//!
//! Specifications normally arrive from an external natural-language
//! translator (see [`QueryTranslator`]); the engine itself only understands
//! the structured form. Results are capped to a bounded page while
//! `result_count` reports the true pre-cap match count.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    data::{Cell, Row},
    error::CoreError,
};

pub const RESULT_CAP: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default)]
    pub filters: HashMap<String, String>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub aggregation: Option<AggregationSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationSpec {
    #[serde(rename = "type")]
    pub kind: AggregationKind,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(rename = "groupBy", alias = "group_by", default)]
    pub group_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregationKind {
    fn label(&self) -> &'static str {
        match self {
            AggregationKind::Count => "count",
            AggregationKind::Sum => "sum",
            AggregationKind::Avg => "avg",
            AggregationKind::Max => "max",
            AggregationKind::Min => "min",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationBucket {
    pub key: String,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct Aggregation {
    pub kind: AggregationKind,
    pub group_by: String,
    pub buckets: Vec<AggregationBucket>,
}

#[derive(Debug, Clone)]
pub struct QueryOutcome {
    /// True match count before the page cap.
    pub result_count: usize,
    pub results: Vec<Row>,
    pub aggregation: Option<Aggregation>,
    /// Human-readable account of how the query was interpreted. Only the
    /// natural-language path supplies one; structured specs leave it unset.
    pub explanation: Option<String>,
}

/// A translated natural-language request: the structured spec to run plus
/// the translator's account of its interpretation.
#[derive(Debug, Clone)]
pub struct Translation {
    pub spec: QuerySpec,
    pub explanation: Option<String>,
}

/// The natural-language black box, reproduced here only as a seam. Tests
/// supply canned translations.
pub trait QueryTranslator {
    fn translate(&self, message: &str, available_columns: &[String]) -> Result<Translation>;
}

/// A malformed specification is a validation error, never a crash.
pub fn parse_spec(raw: &str) -> Result<QuerySpec, CoreError> {
    serde_json::from_str(raw)
        .map_err(|err| CoreError::validation(format!("Invalid query specification: {err}")))
}

pub fn run_query(rows: &[Row], spec: &QuerySpec) -> QueryOutcome {
    let mut matched = rows
        .iter()
        .filter(|row| matches_filters(row, &spec.filters))
        .cloned()
        .collect::<Vec<_>>();

    if let Some(sort) = &spec.sort {
        matched.sort_by(|a, b| {
            compare_cells(a.get(&sort.column), b.get(&sort.column), sort.direction)
        });
    }

    let aggregation = spec
        .aggregation
        .as_ref()
        .and_then(|agg| aggregate(&matched, agg));

    let result_count = matched.len();
    matched.truncate(RESULT_CAP);

    QueryOutcome {
        result_count,
        results: matched,
        aggregation,
        explanation: None,
    }
}

/// Substring OR exact match, case-insensitive; matching either satisfies.
fn matches_filters(row: &Row, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(column, target)| {
        let cell = match row.get(column) {
            Some(cell) if !cell.is_null() => cell.display().to_lowercase(),
            _ => return false,
        };
        let target = target.to_lowercase();
        cell == target || cell.contains(&target)
    })
}

/// Numeric comparison when both sides parse as numbers, lexicographic
/// otherwise. Nulls sort last in either direction.
fn compare_cells(a: Option<&Cell>, b: Option<&Cell>, direction: SortDirection) -> Ordering {
    let a = a.filter(|cell| !cell.is_null());
    let b = b.filter(|cell| !cell.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.display().cmp(&b.display()),
            };
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

/// Aggregation without a group key yields no aggregation, by contract.
fn aggregate(rows: &[Row], spec: &AggregationSpec) -> Option<Aggregation> {
    let group_by = spec.group_by.as_ref()?;

    let groups = rows
        .iter()
        .map(|row| {
            let key = match row.get(group_by) {
                Some(cell) if !cell.is_null() => cell.display(),
                _ => "Unknown".to_string(),
            };
            (key, row)
        })
        .into_group_map();

    let buckets = groups
        .into_iter()
        .map(|(key, members)| AggregationBucket {
            value: statistic(&members, spec),
            key,
        })
        .sorted_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)))
        .collect::<Vec<_>>();

    Some(Aggregation {
        kind: spec.kind,
        group_by: group_by.clone(),
        buckets,
    })
}

fn statistic(members: &[&Row], spec: &AggregationSpec) -> f64 {
    if spec.kind == AggregationKind::Count {
        return members.len() as f64;
    }
    let values = spec
        .column
        .as_ref()
        .map(|column| {
            members
                .iter()
                .filter_map(|row| row.get(column).and_then(Cell::as_number))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    if values.is_empty() {
        return 0.0;
    }
    match spec.kind {
        AggregationKind::Count => unreachable!("handled above"),
        AggregationKind::Sum => values.iter().sum(),
        AggregationKind::Avg => values.iter().sum::<f64>() / values.len() as f64,
        AggregationKind::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationKind::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
    }
}

impl Aggregation {
    /// Buckets as JSON objects keyed by the group column and statistic name,
    /// e.g. `{"CallerState": "CA", "count": 40}`.
    pub fn to_json(&self) -> serde_json::Value {
        let buckets = self
            .buckets
            .iter()
            .map(|bucket| {
                let value = if self.kind == AggregationKind::Count {
                    json!(bucket.value as u64)
                } else {
                    json!(bucket.value)
                };
                json!({ &self.group_by: bucket.key, self.kind.label(): value })
            })
            .collect::<Vec<_>>();
        serde_json::Value::Array(buckets)
    }
}

impl QueryOutcome {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "resultCount": self.result_count,
            "results": self.results,
            "aggregation": self.aggregation.as_ref().map(Aggregation::to_json),
            "explanation": self.explanation,
        })
    }
}
