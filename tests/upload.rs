mod common;

use calldeck::data::Cell;
use calldeck::ingest::{SOURCE_FILE_ID, SOURCE_FILE_NAME};
use common::{TestEnv, CALLS_CA_NY};

#[test]
fn schema_drift_reports_new_columns_and_backfills_null() {
    let env = TestEnv::new();
    let first = env.write("calls-jan.csv", CALLS_CA_NY);
    let second = env.write(
        "calls-feb.csv",
        "CallerID,CallerState,CallerCity\n5550001111,CA,Fresno\n",
    );

    let mut workspace = env.workspace();
    let first_outcome = workspace.upload(&first, "tester").unwrap();
    assert!(!first_outcome.diff.has_changes);

    let second_outcome = workspace.upload(&second, "tester").unwrap();
    assert!(second_outcome.diff.has_changes);
    assert_eq!(second_outcome.diff.new_columns, vec!["CallerCity"]);
    assert!(second_outcome.diff.missing_columns.is_empty());

    let dataset = workspace.load_all(false).unwrap();
    assert!(dataset.columns.contains(&"CallerCity".to_string()));
    let first_id = first_outcome.file.id.to_string();
    for row in dataset
        .rows
        .iter()
        .filter(|row| row.get(SOURCE_FILE_ID) == Some(&Cell::Str(first_id.clone())))
    {
        assert_eq!(row.get("CallerCity"), Some(&Cell::Null));
    }
}

#[test]
fn drift_is_symmetric_for_missing_columns() {
    let env = TestEnv::new();
    let first = env.write("wide.csv", "CallerID,CallerState,Duration\na,CA,5\n");
    let second = env.write("narrow.csv", "CallerID,Notes\nb,follow up\n");

    let mut workspace = env.workspace();
    workspace.upload(&first, "tester").unwrap();
    let outcome = workspace.upload(&second, "tester").unwrap();

    assert_eq!(outcome.diff.new_columns, vec!["Notes"]);
    assert_eq!(
        outcome.diff.missing_columns,
        vec!["CallerState", "Duration"]
    );
}

#[test]
fn rejected_extension_leaves_registry_untouched() {
    let env = TestEnv::new();
    let bad = env.write("calls.xlsx", "not a spreadsheet");

    let mut workspace = env.workspace();
    let err = workspace.upload(&bad, "tester").unwrap_err();
    assert!(err.to_string().contains("Unsupported file type"), "{err:#}");
    assert!(workspace.list_files().is_empty());
}

#[test]
fn oversized_upload_is_rejected() {
    let env = TestEnv::new();
    let calls = env.write("calls.csv", CALLS_CA_NY);

    let mut config = env.config();
    config.max_upload_bytes = 8;
    let mut workspace = calldeck::workspace::Workspace::open(config).unwrap();
    let err = workspace.upload(&calls, "tester").unwrap_err();
    assert!(err.to_string().contains("upload cap"), "{err:#}");
}

#[test]
fn upload_records_metadata_and_provenance() {
    let env = TestEnv::new();
    let calls = env.write("march_calls.tsv", "CallerID\tCallDate\n5551230000\t2026-03-04\n");

    let mut workspace = env.workspace();
    let outcome = workspace.upload(&calls, "alice").unwrap();

    assert_eq!(outcome.file.original_name, "march_calls.tsv");
    assert_eq!(outcome.file.row_count, 1);
    assert_eq!(outcome.file.uploaded_by, "alice");
    assert_eq!(
        outcome.file.date_range_start.map(|d| d.to_string()),
        Some("2026-03-04".to_string())
    );

    let dataset = workspace.load_all(false).unwrap();
    assert_eq!(
        dataset.rows[0].get(SOURCE_FILE_NAME),
        Some(&Cell::Str("march_calls.tsv".to_string()))
    );
}

#[test]
fn stored_copy_survives_source_deletion() {
    let env = TestEnv::new();
    let calls = env.write("calls.csv", CALLS_CA_NY);

    let mut workspace = env.workspace();
    workspace.upload(&calls, "tester").unwrap();
    std::fs::remove_file(&calls).unwrap();

    let dataset = workspace.load_all(true).unwrap();
    assert_eq!(dataset.rows.len(), 2);
}
