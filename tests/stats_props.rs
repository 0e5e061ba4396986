//! Property tests for the statistics invariants: count accounting,
//! fraction bounds and rounding, idempotence, and drift-count behavior.

use proptest::prelude::*;

use csv_profiler::data::{Cell, Value};
use csv_profiler::dataset::Dataset;
use csv_profiler::drift::annotate_categorical_drift;
use csv_profiler::mapping::ColumnMapping;
use csv_profiler::profile::profile_dataset;
use csv_profiler::stats::{FeatureStats, FeatureType, feature_stats, round2};

fn cell_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        2 => Just(Cell::missing()),
        5 => (-1000i64..1000).prop_map(|v| Cell::value(Value::Integer(v))),
        3 => (-1000.0f64..1000.0).prop_map(|v| Cell::value(Value::Float(v))),
        1 => Just(Cell::value(Value::Float(f64::INFINITY))),
    ]
}

fn category_strategy() -> impl Strategy<Value = Cell> {
    prop_oneof![
        1 => Just(Cell::missing()),
        4 => "[a-e]".prop_map(|v| Cell::value(Value::String(v))),
    ]
}

fn check_fraction(fraction: Option<f64>) {
    if let Some(value) = fraction {
        assert!((0.0..=1.0).contains(&value), "fraction out of range: {value}");
        assert_eq!(round2(value), value, "fraction not rounded: {value}");
    }
}

proptest! {
    #[test]
    fn count_and_missing_sum_to_total(cells in proptest::collection::vec(cell_strategy(), 0..50)) {
        let stats = feature_stats(&cells, FeatureType::Numeric);
        let common = stats.common();
        let missing = common.missing_count.unwrap_or(0);
        prop_assert_eq!(common.count + missing, cells.len());
    }

    #[test]
    fn fractions_are_bounded_and_rounded(cells in proptest::collection::vec(cell_strategy(), 0..50)) {
        let stats = feature_stats(&cells, FeatureType::Numeric);
        let common = stats.common();
        check_fraction(common.missing_fraction);
        check_fraction(common.unique_fraction);
        check_fraction(common.most_common_value_fraction);
        check_fraction(common.most_common_not_null_value_fraction);
        if let FeatureStats::Numeric(numeric) = &stats {
            check_fraction(numeric.infinite_fraction);
        }
    }

    #[test]
    fn computation_is_idempotent(cells in proptest::collection::vec(category_strategy(), 0..40)) {
        let first = feature_stats(&cells, FeatureType::Categorical);
        let second = feature_stats(&cells, FeatureType::Categorical);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn numeric_records_carry_extrema_whenever_values_exist(
        cells in proptest::collection::vec(cell_strategy(), 1..50)
    ) {
        let stats = feature_stats(&cells, FeatureType::Numeric);
        let FeatureStats::Numeric(numeric) = &stats else {
            panic!("expected numeric record");
        };
        if stats.common().count > 0 {
            prop_assert!(numeric.min.is_some());
            prop_assert!(numeric.max.is_some());
            prop_assert!(numeric.mean.is_some());
            prop_assert!(numeric.percentile_25.is_some());
            prop_assert!(numeric.percentile_50.is_some());
            prop_assert!(numeric.percentile_75.is_some());
        } else {
            prop_assert!(numeric.min.is_none());
            prop_assert!(numeric.mean.is_none());
        }
    }

    #[test]
    fn identical_snapshots_show_zero_drift(
        cells in proptest::collection::vec(category_strategy(), 1..40)
    ) {
        let reference = Dataset::from_columns([("status".to_string(), cells.clone())]);
        let current = Dataset::from_columns([("status".to_string(), cells)]);
        let mapping = ColumnMapping {
            categorical: vec!["status".to_string()],
            ..ColumnMapping::default()
        };
        let profile = profile_dataset(&reference, &mapping).expect("profile");
        let annotated = annotate_categorical_drift(profile, &reference, &current).expect("annotate");
        let stats = annotated.feature("status").expect("feature");
        prop_assert_eq!(stats.drift_counts(), Some((0, 0)));
    }

    #[test]
    fn drift_counts_stay_within_distinct_value_bounds(
        reference_cells in proptest::collection::vec(category_strategy(), 1..40),
        current_cells in proptest::collection::vec(category_strategy(), 1..40),
    ) {
        let reference = Dataset::from_columns([("status".to_string(), reference_cells.clone())]);
        let current = Dataset::from_columns([("status".to_string(), current_cells.clone())]);
        let mapping = ColumnMapping {
            categorical: vec!["status".to_string()],
            ..ColumnMapping::default()
        };
        let profile = profile_dataset(&reference, &mapping).expect("profile");
        let annotated = annotate_categorical_drift(profile, &reference, &current).expect("annotate");
        let (new_in_current, unused_in_current) = annotated
            .feature("status")
            .expect("feature")
            .drift_counts()
            .expect("drift counts");

        let distinct = |cells: &[Cell]| {
            cells.iter().collect::<std::collections::HashSet<_>>().len()
        };
        prop_assert!(new_in_current <= distinct(&current_cells));
        prop_assert!(unused_in_current <= distinct(&reference_cells));
    }
}
