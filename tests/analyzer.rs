//! Library-level integration tests: CSV snapshots through the analyzer,
//! checking bucket structure, drift annotation, and the enumeration view.

use std::fs;
use std::path::Path;

use encoding_rs::UTF_8;
use tempfile::tempdir;

use csv_profiler::analyzer::{AnalyzerResults, ProfileAnalyzer, ProfileResult};
use csv_profiler::dataset::Dataset;
use csv_profiler::mapping::{ColumnMapping, Task, UtilityColumns};
use csv_profiler::stats::FIELD_ORDER;

fn write_csv(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write csv");
    path
}

fn mapping() -> ColumnMapping {
    ColumnMapping {
        numeric: vec!["score".to_string()],
        categorical: vec!["status".to_string()],
        datetime: vec!["signup_at".to_string()],
        utility: UtilityColumns {
            target: Some("label".to_string()),
            date: Some("observed_on".to_string()),
        },
        task: Some(Task::Classification),
    }
}

#[test]
fn analyzer_builds_reference_and_current_profiles_from_csv() {
    let dir = tempdir().expect("temp dir");
    let reference_path = write_csv(
        dir.path(),
        "reference.csv",
        "score,status,signup_at,observed_on,label\n\
         10,good,2024-01-01 08:00:00,2024-01-01,yes\n\
         20,good,2024-01-03 09:30:00,2024-01-02,no\n\
         30,backorder,2024-01-02 10:00:00,2024-01-03,yes\n",
    );
    let current_path = write_csv(
        dir.path(),
        "current.csv",
        "score,status,signup_at,observed_on,label\n\
         15,good,2024-02-01 08:00:00,2024-02-01,yes\n\
         25,cancelled,2024-02-02 09:00:00,2024-02-02,no\n",
    );

    let mapping = mapping();
    let reference = Dataset::from_csv(&reference_path, &mapping, b',', UTF_8).expect("reference");
    let current = Dataset::from_csv(&current_path, &mapping, b',', UTF_8).expect("current");

    let result = ProfileAnalyzer::run(&reference, Some(&current), &mapping).expect("run");

    let score = result.reference.feature("score").expect("score stats");
    assert!(score.is_numeric());
    assert_eq!(score.common().count, 3);
    assert_eq!(score.common().unique_count, Some(3));

    let signup = result.reference.feature("signup_at").expect("signup stats");
    assert!(signup.is_datetime());
    let fields = signup.fields();
    let min = fields.iter().find(|(name, _)| *name == "min").unwrap();
    assert_eq!(min.1.as_deref(), Some("2024-01-01 08:00:00"));
    let max = fields.iter().find(|(name, _)| *name == "max").unwrap();
    assert_eq!(max.1.as_deref(), Some("2024-01-03 09:30:00"));

    // The utility date column lands in the datetime bucket.
    assert!(result.reference.feature("observed_on").expect("date").is_datetime());

    // No missing values on either side: 'cancelled' is new, 'backorder'
    // unused, and no compensation applies.
    let status = result.reference.feature("status").expect("status stats");
    assert_eq!(status.drift_counts(), Some((1, 1)));

    let current_profile = result.current.as_ref().expect("current profile");
    assert_eq!(current_profile.feature("status").unwrap().common().count, 2);
}

#[test]
fn reference_only_run_has_no_current_profile() {
    let dir = tempdir().expect("temp dir");
    let reference_path = write_csv(
        dir.path(),
        "reference.csv",
        "score,status,signup_at,observed_on,label\n10,good,2024-01-01,2024-01-01,yes\n",
    );
    let mapping = mapping();
    let reference = Dataset::from_csv(&reference_path, &mapping, b',', UTF_8).expect("reference");

    let result = ProfileAnalyzer::run(&reference, None, &mapping).expect("run");
    assert!(result.current.is_none());
    let status = result.reference.feature("status").expect("status stats");
    assert_eq!(status.drift_counts(), None);
}

#[test]
fn every_record_exposes_the_full_field_enumeration() {
    let dir = tempdir().expect("temp dir");
    let reference_path = write_csv(
        dir.path(),
        "reference.csv",
        "score,status,signup_at,observed_on,label\n10,good,2024-01-01,2024-01-01,yes\n",
    );
    let mapping = mapping();
    let reference = Dataset::from_csv(&reference_path, &mapping, b',', UTF_8).expect("reference");
    let result = ProfileAnalyzer::run(&reference, None, &mapping).expect("run");

    for (name, stats) in result.reference.all_features() {
        let fields = stats.fields();
        let names: Vec<&str> = fields.iter().map(|(field, _)| *field).collect();
        assert_eq!(names, FIELD_ORDER, "unstable enumeration for '{name}'");
    }
}

#[test]
fn results_registry_round_trips_the_profile_result() {
    let reference = Dataset::from_columns([(
        "status".to_string(),
        vec![csv_profiler::data::Cell::value(csv_profiler::data::Value::String(
            "good".to_string(),
        ))],
    )]);
    let mapping = ColumnMapping {
        categorical: vec!["status".to_string()],
        ..ColumnMapping::default()
    };
    let result = ProfileAnalyzer::run(&reference, None, &mapping).expect("run");

    let mut store = AnalyzerResults::new();
    store.insert::<ProfileAnalyzer, ProfileResult>(result.clone());
    assert_eq!(ProfileAnalyzer::results(&store), Some(&result));
}
