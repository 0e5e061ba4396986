//! Dataset-level profile: per-role buckets of feature statistics and the
//! profiler that fills them from a snapshot plus the column-role mapping.

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::{
    dataset::Dataset,
    error::ProfileError,
    mapping::ColumnMapping,
    stats::{FeatureStats, FeatureType, feature_stats},
};

pub type FeatureBucket = BTreeMap<String, FeatureStats>;

/// Statistics records grouped by column role. The numeric, categorical, and
/// datetime buckets are always built (possibly empty); the target bucket
/// exists only when a target column is declared and present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub target: Option<FeatureBucket>,
    pub datetime: Option<FeatureBucket>,
    pub categorical: Option<FeatureBucket>,
    pub numeric: Option<FeatureBucket>,
}

impl DatasetProfile {
    fn buckets(&self) -> [&Option<FeatureBucket>; 4] {
        // Fixed lookup priority: target, datetime, categorical, numeric.
        [
            &self.target,
            &self.datetime,
            &self.categorical,
            &self.numeric,
        ]
    }

    /// Look a feature up across the buckets in priority order.
    pub fn feature(&self, name: &str) -> Result<&FeatureStats, ProfileError> {
        self.buckets()
            .into_iter()
            .flatten()
            .find_map(|bucket| bucket.get(name))
            .ok_or_else(|| ProfileError::FeatureNotFound(name.to_string()))
    }

    /// Union of all buckets as a name-to-record map. On a name collision a
    /// lower-priority bucket wins, matching the bucket iteration order.
    pub fn all_features(&self) -> BTreeMap<&str, &FeatureStats> {
        let mut result = BTreeMap::new();
        for bucket in self.buckets().into_iter().flatten() {
            for (name, stats) in bucket {
                result.insert(name.as_str(), stats);
            }
        }
        result
    }
}

/// Compute one statistics record per declared column, grouped by role.
///
/// A declared numeric/categorical/datetime column missing from the dataset
/// propagates as [`ProfileError::MissingColumn`]; only the target column is
/// silently skipped when absent.
pub fn profile_dataset(
    dataset: &Dataset,
    mapping: &ColumnMapping,
) -> Result<DatasetProfile, ProfileError> {
    let mut profile = DatasetProfile::default();

    let mut numeric = FeatureBucket::new();
    for name in &mapping.numeric {
        let stats = feature_stats(dataset.column(name)?, FeatureType::Numeric);
        numeric.insert(name.clone(), stats);
    }
    profile.numeric = Some(numeric);

    let mut categorical = FeatureBucket::new();
    for name in &mapping.categorical {
        let stats = feature_stats(dataset.column(name)?, FeatureType::Categorical);
        categorical.insert(name.clone(), stats);
    }
    profile.categorical = Some(categorical);

    let mut datetime = FeatureBucket::new();
    for name in mapping.datetime_columns() {
        let stats = feature_stats(dataset.column(name)?, FeatureType::Datetime);
        datetime.insert(name.to_string(), stats);
    }
    profile.datetime = Some(datetime);

    if let Some(target) = mapping.utility.target.as_deref() {
        if dataset.contains(target) {
            let target_type = if mapping.target_is_categorical() {
                FeatureType::Categorical
            } else {
                FeatureType::Numeric
            };
            let stats = feature_stats(dataset.column(target)?, target_type);
            let mut bucket = FeatureBucket::new();
            bucket.insert(target.to_string(), stats);
            profile.target = Some(bucket);
        } else {
            debug!("Target column '{target}' absent from dataset; skipping");
        }
    }

    Ok(profile)
}
