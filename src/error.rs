use thiserror::Error;

/// Typed failures surfaced by the profiling core. Orchestration layers wrap
/// these in `anyhow` context; the core itself never retries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// A feature name was looked up that no profile bucket contains.
    #[error("Feature '{0}' not found in any profile bucket")]
    FeatureNotFound(String),
    /// A declared column is absent from the dataset it was indexed against.
    #[error("Column '{0}' is not present in the dataset")]
    MissingColumn(String),
}
