//! Categorical value drift between the reference and current snapshots.
//!
//! For each categorical feature in the reference profile we count distinct
//! values that are new in the current snapshot and reference values the
//! current snapshot no longer uses. The differ is two-phase: it consumes
//! the freshly built reference profile and returns a new one with the drift
//! counts merged, so published records are never mutated.

use std::collections::HashSet;

use log::debug;

use crate::{
    data::Cell,
    dataset::Dataset,
    error::ProfileError,
    profile::{DatasetProfile, FeatureBucket},
};

/// Merge drift counts into the categorical bucket of a reference profile.
pub fn annotate_categorical_drift(
    mut profile: DatasetProfile,
    reference: &Dataset,
    current: &Dataset,
) -> Result<DatasetProfile, ProfileError> {
    let Some(bucket) = profile.categorical.take() else {
        return Ok(profile);
    };

    let mut annotated = FeatureBucket::new();
    for (name, stats) in bucket {
        let (new_in_current, unused_in_current) = drift_counts(reference, current, &name)?;
        debug!(
            "Feature '{name}': {new_in_current} new value(s) in current, \
             {unused_in_current} unused"
        );
        annotated.insert(name, stats.with_drift_counts(new_in_current, unused_in_current));
    }
    profile.categorical = Some(annotated);
    Ok(profile)
}

/// Distinct-value diff for one feature: `(new_in_current, unused_in_current)`.
///
/// The missing marker participates in the sets but never matches across
/// snapshots, so a marker present on either side lands in that side's raw
/// count. When both snapshots contain missing values the marker is a shared
/// value, not a novel or vanished one, and one count is compensated back on
/// each side. The compensation fires at most once per feature, so both
/// counts stay non-negative.
fn drift_counts(
    reference: &Dataset,
    current: &Dataset,
    feature: &str,
) -> Result<(usize, usize), ProfileError> {
    let current_values: HashSet<&Cell> = current.column(feature)?.iter().collect();
    let reference_values: HashSet<&Cell> = if reference.contains(feature) {
        reference.column(feature)?.iter().collect()
    } else {
        HashSet::new()
    };

    let current_has_missing = current_values.iter().any(|cell| cell.is_missing());
    let reference_has_missing = reference_values.iter().any(|cell| cell.is_missing());

    let mut new_in_current = current_values
        .iter()
        .filter(|cell| !cell.is_missing() && !reference_values.contains(*cell))
        .count()
        + usize::from(current_has_missing);
    let mut unused_in_current = reference_values
        .iter()
        .filter(|cell| !cell.is_missing() && !current_values.contains(*cell))
        .count()
        + usize::from(reference_has_missing);

    if current_has_missing && reference_has_missing {
        new_in_current -= 1;
        unused_in_current -= 1;
    }

    Ok((new_in_current, unused_in_current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;
    use crate::mapping::ColumnMapping;
    use crate::profile::profile_dataset;

    fn text(value: &str) -> Cell {
        Cell::value(Value::String(value.to_string()))
    }

    fn categorical_dataset(name: &str, values: Vec<Cell>) -> Dataset {
        Dataset::from_columns([(name.to_string(), values)])
    }

    fn categorical_mapping(name: &str) -> ColumnMapping {
        ColumnMapping {
            categorical: vec![name.to_string()],
            ..ColumnMapping::default()
        }
    }

    fn annotated_counts(reference: &Dataset, current: &Dataset, name: &str) -> (usize, usize) {
        let mapping = categorical_mapping(name);
        let profile = profile_dataset(reference, &mapping).expect("profile");
        let annotated =
            annotate_categorical_drift(profile, reference, current).expect("annotate");
        annotated.feature(name).expect("feature").drift_counts().expect("drift counts")
    }

    #[test]
    fn shared_missing_marker_is_compensated_once_per_side() {
        let reference =
            categorical_dataset("status", vec![text("a"), text("b"), Cell::missing()]);
        let current = categorical_dataset("status", vec![text("a"), text("c"), Cell::missing()]);
        // Raw diff counts the marker spuriously on both sides ('c' plus the
        // marker, 'b' plus the marker); the correction brings each back by 1.
        assert_eq!(annotated_counts(&reference, &current, "status"), (1, 1));
    }

    #[test]
    fn identical_value_sets_report_zero_drift() {
        let reference = categorical_dataset("status", vec![text("a"), text("b")]);
        let current = categorical_dataset("status", vec![text("b"), text("a"), text("a")]);
        assert_eq!(annotated_counts(&reference, &current, "status"), (0, 0));
    }

    #[test]
    fn one_sided_missing_counts_as_drift() {
        let reference = categorical_dataset("status", vec![text("a")]);
        let current = categorical_dataset("status", vec![text("a"), Cell::missing()]);
        assert_eq!(annotated_counts(&reference, &current, "status"), (1, 0));

        let reference = categorical_dataset("status", vec![text("a"), Cell::missing()]);
        let current = categorical_dataset("status", vec![text("a")]);
        assert_eq!(annotated_counts(&reference, &current, "status"), (0, 1));
    }

    #[test]
    fn feature_absent_from_reference_counts_all_current_values_as_new() {
        let reference = Dataset::from_columns([("other".to_string(), vec![text("z")])]);
        let current = categorical_dataset("status", vec![text("a"), text("b")]);
        let (new_in_current, unused_in_current) =
            drift_counts(&reference, &current, "status").expect("counts");
        assert_eq!((new_in_current, unused_in_current), (2, 0));
    }

    #[test]
    fn feature_absent_from_current_is_a_missing_column_error() {
        let reference = categorical_dataset("status", vec![text("a")]);
        let current = Dataset::from_columns([("other".to_string(), vec![text("z")])]);
        let err = drift_counts(&reference, &current, "status").unwrap_err();
        assert_eq!(err, ProfileError::MissingColumn("status".to_string()));
    }

    #[test]
    fn non_categorical_buckets_pass_through_untouched() {
        let reference = categorical_dataset("status", vec![text("a")]);
        let current = categorical_dataset("status", vec![text("a")]);
        let mapping = categorical_mapping("status");
        let before = profile_dataset(&reference, &mapping).expect("profile");
        let after = annotate_categorical_drift(before.clone(), &reference, &current)
            .expect("annotate");
        assert_eq!(after.numeric, before.numeric);
        assert_eq!(after.datetime, before.datetime);
        assert_eq!(after.target, before.target);
    }
}
