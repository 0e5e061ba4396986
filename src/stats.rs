//! Per-feature descriptive statistics.
//!
//! [`feature_stats`] is the statistics-computation core: given one column's
//! cells and its declared type it produces a [`FeatureStats`] record. The
//! function is pure and total over well-formed columns; degenerate inputs
//! (zero rows, all-missing, single observation) yield partially unset
//! records instead of failing.
//!
//! Record shape follows the tagged-variant design: a numeric record cannot
//! carry drift counts and a categorical record cannot carry percentiles,
//! because the variant does not declare those fields.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::data::{Cell, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeatureType {
    #[serde(rename = "num")]
    Numeric,
    #[serde(rename = "cat")]
    Categorical,
    #[serde(rename = "datetime")]
    Datetime,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FeatureType::Numeric => "num",
            FeatureType::Categorical => "cat",
            FeatureType::Datetime => "datetime",
        };
        write!(f, "{tag}")
    }
}

/// Metrics shared by every feature type.
///
/// `count` is the number of non-missing observations and always equals
/// `total_row_count - missing_count`. The remaining fields are unset when
/// the guards in [`feature_stats`] stop early (empty or all-missing input).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommonStats {
    pub count: usize,
    pub missing_count: Option<usize>,
    pub missing_fraction: Option<f64>,
    pub unique_count: Option<usize>,
    pub unique_fraction: Option<f64>,
    pub most_common_value: Option<Cell>,
    pub most_common_value_fraction: Option<f64>,
    pub most_common_not_null_value: Option<Value>,
    pub most_common_not_null_value_fraction: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericFeatureStats {
    #[serde(flatten)]
    pub common: CommonStats,
    pub infinite_count: Option<usize>,
    pub infinite_fraction: Option<f64>,
    /// Raw extrema; deliberately not rounded, unlike every fraction field.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    /// Sample standard deviation; unset below two observations or when the
    /// column contains infinities.
    pub std: Option<f64>,
    pub percentile_25: Option<f64>,
    pub percentile_50: Option<f64>,
    pub percentile_75: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoricalFeatureStats {
    #[serde(flatten)]
    pub common: CommonStats,
    /// Distinct values seen in the current snapshot but not the reference.
    /// Populated by the drift differ on reference records only.
    pub new_in_current_count: Option<usize>,
    /// Distinct reference values absent from the current snapshot.
    pub unused_in_current_count: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatetimeFeatureStats {
    #[serde(flatten)]
    pub common: CommonStats,
    /// Extrema as canonical textual timestamps.
    pub min: Option<String>,
    pub max: Option<String>,
}

/// One statistics record, tagged by feature type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "feature_type")]
pub enum FeatureStats {
    #[serde(rename = "num")]
    Numeric(NumericFeatureStats),
    #[serde(rename = "cat")]
    Categorical(CategoricalFeatureStats),
    #[serde(rename = "datetime")]
    Datetime(DatetimeFeatureStats),
}

/// Canonical field order of the enumeration view. Downstream tabular
/// renderers depend on this order staying fixed.
pub const FIELD_ORDER: &[&str] = &[
    "feature_type",
    "count",
    "infinite_count",
    "infinite_fraction",
    "missing_count",
    "missing_fraction",
    "unique_count",
    "unique_fraction",
    "percentile_25",
    "percentile_50",
    "percentile_75",
    "max",
    "min",
    "mean",
    "most_common_value",
    "most_common_value_fraction",
    "std",
    "most_common_not_null_value",
    "most_common_not_null_value_fraction",
    "new_in_current_count",
    "unused_in_current_count",
];

impl FeatureStats {
    pub fn feature_type(&self) -> FeatureType {
        match self {
            FeatureStats::Numeric(_) => FeatureType::Numeric,
            FeatureStats::Categorical(_) => FeatureType::Categorical,
            FeatureStats::Datetime(_) => FeatureType::Datetime,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FeatureStats::Numeric(_))
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureStats::Categorical(_))
    }

    pub fn is_datetime(&self) -> bool {
        matches!(self, FeatureStats::Datetime(_))
    }

    pub fn common(&self) -> &CommonStats {
        match self {
            FeatureStats::Numeric(stats) => &stats.common,
            FeatureStats::Categorical(stats) => &stats.common,
            FeatureStats::Datetime(stats) => &stats.common,
        }
    }

    /// `(new_in_current, unused_in_current)` when the drift differ has
    /// annotated this record.
    pub fn drift_counts(&self) -> Option<(usize, usize)> {
        match self {
            FeatureStats::Categorical(stats) => stats
                .new_in_current_count
                .zip(stats.unused_in_current_count),
            _ => None,
        }
    }

    /// Stable field-enumeration view: every declared field in
    /// [`FIELD_ORDER`], unset fields as `None`.
    pub fn fields(&self) -> Vec<(&'static str, Option<String>)> {
        let common = self.common();
        let mut values: HashMap<&'static str, Option<String>> = HashMap::new();
        values.insert("feature_type", Some(self.feature_type().to_string()));
        values.insert("count", Some(common.count.to_string()));
        values.insert("missing_count", common.missing_count.map(|v| v.to_string()));
        values.insert("missing_fraction", common.missing_fraction.map(format_float));
        values.insert("unique_count", common.unique_count.map(|v| v.to_string()));
        values.insert("unique_fraction", common.unique_fraction.map(format_float));
        values.insert(
            "most_common_value",
            common.most_common_value.as_ref().map(Cell::as_display),
        );
        values.insert(
            "most_common_value_fraction",
            common.most_common_value_fraction.map(format_float),
        );
        values.insert(
            "most_common_not_null_value",
            common.most_common_not_null_value.as_ref().map(Value::as_display),
        );
        values.insert(
            "most_common_not_null_value_fraction",
            common.most_common_not_null_value_fraction.map(format_float),
        );
        match self {
            FeatureStats::Numeric(stats) => {
                values.insert("infinite_count", stats.infinite_count.map(|v| v.to_string()));
                values.insert("infinite_fraction", stats.infinite_fraction.map(format_float));
                values.insert("min", stats.min.map(format_float));
                values.insert("max", stats.max.map(format_float));
                values.insert("mean", stats.mean.map(format_float));
                values.insert("std", stats.std.map(format_float));
                values.insert("percentile_25", stats.percentile_25.map(format_float));
                values.insert("percentile_50", stats.percentile_50.map(format_float));
                values.insert("percentile_75", stats.percentile_75.map(format_float));
            }
            FeatureStats::Categorical(stats) => {
                values.insert(
                    "new_in_current_count",
                    stats.new_in_current_count.map(|v| v.to_string()),
                );
                values.insert(
                    "unused_in_current_count",
                    stats.unused_in_current_count.map(|v| v.to_string()),
                );
            }
            FeatureStats::Datetime(stats) => {
                values.insert("min", stats.min.clone());
                values.insert("max", stats.max.clone());
            }
        }
        FIELD_ORDER
            .iter()
            .map(|name| (*name, values.remove(name).flatten()))
            .collect()
    }

    /// Return the record with drift counts merged in. Only meaningful on
    /// categorical records; other variants pass through unchanged.
    pub(crate) fn with_drift_counts(self, new_in_current: usize, unused_in_current: usize) -> Self {
        match self {
            FeatureStats::Categorical(mut stats) => {
                stats.new_in_current_count = Some(new_in_current);
                stats.unused_in_current_count = Some(unused_in_current);
                FeatureStats::Categorical(stats)
            }
            other => other,
        }
    }
}

/// Compute the statistics record for one column.
pub fn feature_stats(cells: &[Cell], feature_type: FeatureType) -> FeatureStats {
    match feature_type {
        FeatureType::Numeric => FeatureStats::Numeric(numeric_stats(cells)),
        FeatureType::Categorical => FeatureStats::Categorical(CategoricalFeatureStats {
            common: common_stats(cells),
            ..CategoricalFeatureStats::default()
        }),
        FeatureType::Datetime => FeatureStats::Datetime(datetime_stats(cells)),
    }
}

/// Round to two decimal places; the rule applied to every fraction and to
/// mean/std/percentiles, never to raw extrema.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn common_stats(cells: &[Cell]) -> CommonStats {
    let total = cells.len();
    let mut common = CommonStats::default();
    if total == 0 {
        return common;
    }

    let missing_count = cells.iter().filter(|cell| cell.is_missing()).count();
    common.count = total - missing_count;
    common.missing_count = Some(missing_count);
    common.missing_fraction = Some(round2(missing_count as f64 / total as f64));
    if common.count == 0 {
        return common;
    }

    let table = frequency_table(cells);
    let (top_cell, top_count) = &table[0];
    common.most_common_value = Some(top_cell.clone());
    common.most_common_value_fraction = Some(round2(*top_count as f64 / total as f64));

    let unique_count = table.iter().filter(|(cell, _)| !cell.is_missing()).count();
    common.unique_count = Some(unique_count);
    common.unique_fraction = Some(round2(unique_count as f64 / total as f64));

    // Null fallback: when the marker itself is most common, expose the
    // runner-up as the most common concrete value.
    if top_cell.is_missing()
        && let Some((runner_up, runner_count)) = table.get(1)
    {
        common.most_common_not_null_value = runner_up.as_value().cloned();
        common.most_common_not_null_value_fraction =
            Some(round2(*runner_count as f64 / total as f64));
    }

    common
}

fn numeric_stats(cells: &[Cell]) -> NumericFeatureStats {
    let total = cells.len();
    let mut stats = NumericFeatureStats {
        common: common_stats(cells),
        ..NumericFeatureStats::default()
    };
    if total == 0 {
        return stats;
    }

    let infinite_count = cells
        .iter()
        .filter(|cell| cell.as_value().is_some_and(Value::is_infinite))
        .count();
    stats.infinite_count = Some(infinite_count);
    stats.infinite_fraction = Some(round2(infinite_count as f64 / total as f64));
    if stats.common.count == 0 {
        return stats;
    }

    let mut values: Vec<f64> = cells
        .iter()
        .filter_map(|cell| cell.as_value().and_then(Value::as_f64))
        .collect();
    values.sort_by(f64::total_cmp);
    stats.min = values.first().copied();
    stats.max = values.last().copied();

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    stats.mean = Some(round2(mean));
    stats.std = sample_std(&values, mean).map(round2);
    stats.percentile_25 = Some(round2(quantile(&values, 0.25)));
    stats.percentile_50 = Some(round2(quantile(&values, 0.50)));
    stats.percentile_75 = Some(round2(quantile(&values, 0.75)));
    stats
}

fn datetime_stats(cells: &[Cell]) -> DatetimeFeatureStats {
    let mut stats = DatetimeFeatureStats {
        common: common_stats(cells),
        ..DatetimeFeatureStats::default()
    };
    if stats.common.count == 0 {
        return stats;
    }
    match cells.iter().filter_map(Cell::as_value).minmax() {
        MinMaxResult::NoElements => {}
        MinMaxResult::OneElement(value) => {
            stats.min = Some(value.as_display());
            stats.max = Some(value.as_display());
        }
        MinMaxResult::MinMax(min, max) => {
            stats.min = Some(min.as_display());
            stats.max = Some(max.as_display());
        }
    }
    stats
}

/// Frequency table over all cells, missing marker included, ordered by
/// descending count. Ties keep first-appearance order (stable sort).
fn frequency_table(cells: &[Cell]) -> Vec<(Cell, usize)> {
    let mut counts: HashMap<&Cell, usize> = HashMap::new();
    let mut order: Vec<&Cell> = Vec::new();
    for cell in cells {
        let entry = counts.entry(cell).or_insert(0);
        if *entry == 0 {
            order.push(cell);
        }
        *entry += 1;
    }
    order.sort_by_key(|cell| Reverse(counts[cell]));
    order
        .into_iter()
        .map(|cell| (cell.clone(), counts[cell]))
        .collect()
}

fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() as f64 - 1.0);
    let std = variance.sqrt();
    std.is_finite().then_some(std)
}

/// Quantile with linear interpolation over a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
