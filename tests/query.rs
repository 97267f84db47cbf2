mod common;

use std::collections::HashMap;
use std::fmt::Write as _;

use anyhow::Result;
use calldeck::query::{
    parse_spec, AggregationKind, AggregationSpec, QuerySpec, QueryTranslator, SortDirection,
    SortSpec, Translation,
};
use common::TestEnv;

/// 100-row call log with 40 CA rows and 60 spread across other states.
fn hundred_row_log() -> String {
    let mut csv = String::from("CallerID,CallerState,Duration\n");
    for i in 0..100 {
        let state = if i < 40 {
            "CA"
        } else if i < 70 {
            "NY"
        } else {
            "TX"
        };
        let _ = writeln!(csv, "555000{i:04},{state},{}", i % 50);
    }
    csv
}

#[test]
fn ca_count_aggregation_scenario() {
    let env = TestEnv::new();
    let calls = env.write("calls.csv", &hundred_row_log());

    let mut workspace = env.workspace();
    workspace.upload(&calls, "tester").unwrap();

    let spec = parse_spec(
        r#"{"filters":{"CallerState":"CA"},"aggregation":{"type":"count","groupBy":"CallerState"}}"#,
    )
    .unwrap();
    let outcome = workspace.query(&spec).unwrap();

    assert_eq!(outcome.result_count, 40);
    let aggregation = outcome.aggregation.unwrap();
    assert_eq!(aggregation.buckets.len(), 1);
    assert_eq!(aggregation.buckets[0].key, "CA");
    assert_eq!(aggregation.buckets[0].value, 40.0);
}

#[test]
fn results_are_capped_at_one_hundred() {
    let env = TestEnv::new();
    let mut csv = String::from("CallerID\n");
    for i in 0..150 {
        let _ = writeln!(csv, "{i}");
    }
    let calls = env.write("calls.csv", &csv);

    let mut workspace = env.workspace();
    workspace.upload(&calls, "tester").unwrap();

    let outcome = workspace.query(&QuerySpec::default()).unwrap();
    assert_eq!(outcome.result_count, 150);
    assert_eq!(outcome.results.len(), 100);
}

#[test]
fn sorted_query_over_merged_data() {
    let env = TestEnv::new();
    let calls = env.write(
        "calls.csv",
        "CallerID,Duration\na,30\nb,4\nc,120\n",
    );

    let mut workspace = env.workspace();
    workspace.upload(&calls, "tester").unwrap();

    let spec = QuerySpec {
        sort: Some(SortSpec {
            column: "Duration".to_string(),
            direction: SortDirection::Desc,
        }),
        ..Default::default()
    };
    let outcome = workspace.query(&spec).unwrap();
    let order = outcome
        .results
        .iter()
        .map(|row| row.get("Duration").unwrap().display())
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["120", "30", "4"]);
}

struct CannedTranslator(Translation);

impl QueryTranslator for CannedTranslator {
    fn translate(&self, _message: &str, available_columns: &[String]) -> Result<Translation> {
        assert!(available_columns.contains(&"CallerState".to_string()));
        Ok(self.0.clone())
    }
}

#[test]
fn natural_language_queries_go_through_the_translator_seam() {
    let env = TestEnv::new();
    let calls = env.write("calls.csv", &hundred_row_log());

    let mut workspace = env.workspace();
    workspace.upload(&calls, "tester").unwrap();

    let translator = CannedTranslator(Translation {
        spec: QuerySpec {
            filters: HashMap::from([("CallerState".to_string(), "TX".to_string())]),
            aggregation: Some(AggregationSpec {
                kind: AggregationKind::Avg,
                column: Some("Duration".to_string()),
                group_by: Some("CallerState".to_string()),
            }),
            ..Default::default()
        },
        explanation: Some("Average duration of Texas calls".to_string()),
    });

    let outcome = workspace
        .query_message("average duration of texas calls", &translator)
        .unwrap();
    assert_eq!(outcome.result_count, 30);
    assert!(outcome.aggregation.is_some());
    assert_eq!(
        outcome.explanation.as_deref(),
        Some("Average duration of Texas calls")
    );
    assert_eq!(
        outcome.to_json()["explanation"],
        "Average duration of Texas calls"
    );
}

#[test]
fn aggregation_json_buckets_use_group_column_and_stat_names() {
    let env = TestEnv::new();
    let calls = env.write("calls.csv", &hundred_row_log());

    let mut workspace = env.workspace();
    workspace.upload(&calls, "tester").unwrap();

    let spec = parse_spec(r#"{"aggregation":{"type":"count","groupBy":"CallerState"}}"#).unwrap();
    let outcome = workspace.query(&spec).unwrap();
    let json = outcome.to_json();

    assert_eq!(json["resultCount"], 100);
    // Structured specs carry no translator explanation.
    assert!(json["explanation"].is_null());
    let buckets = json["aggregation"].as_array().unwrap();
    assert_eq!(buckets[0]["CallerState"], "CA");
    assert_eq!(buckets[0]["count"], 40);
}
