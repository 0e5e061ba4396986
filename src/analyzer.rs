//! Top-level analysis run and the type-keyed result store.
//!
//! [`ProfileAnalyzer::run`] profiles the reference snapshot, optionally
//! profiles the current snapshot, runs the categorical drift differ, and
//! packages everything as a [`ProfileResult`]. Downstream consumers can
//! stash results in an [`AnalyzerResults`] store keyed by the producing
//! analyzer's type.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use log::info;
use serde::Serialize;

use crate::{
    dataset::Dataset,
    drift::annotate_categorical_drift,
    error::ProfileError,
    mapping::ColumnMapping,
    profile::{DatasetProfile, profile_dataset},
};

/// The packaged outcome of one analysis run. `current` is present iff a
/// current snapshot was supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResult {
    pub reference: DatasetProfile,
    pub current: Option<DatasetProfile>,
}

pub struct ProfileAnalyzer;

impl ProfileAnalyzer {
    /// Run the full analysis. Drift annotation happens only when a current
    /// snapshot exists, and after both profiles are fully built.
    pub fn run(
        reference: &Dataset,
        current: Option<&Dataset>,
        mapping: &ColumnMapping,
    ) -> Result<ProfileResult, ProfileError> {
        let mut reference_profile = profile_dataset(reference, mapping)?;

        let current_profile = match current {
            Some(snapshot) => {
                let profile = profile_dataset(snapshot, mapping)?;
                reference_profile =
                    annotate_categorical_drift(reference_profile, reference, snapshot)?;
                Some(profile)
            }
            None => None,
        };

        info!(
            "Profiled {} reference feature(s){}",
            reference_profile.all_features().len(),
            if current_profile.is_some() {
                " with current-snapshot comparison"
            } else {
                ""
            }
        );

        Ok(ProfileResult {
            reference: reference_profile,
            current: current_profile,
        })
    }

    /// Retrieve this analyzer's result from a store.
    pub fn results(store: &AnalyzerResults) -> Option<&ProfileResult> {
        store.get::<ProfileAnalyzer, ProfileResult>()
    }
}

/// Type-keyed result store: each analyzer type owns at most one slot.
#[derive(Default)]
pub struct AnalyzerResults {
    entries: HashMap<TypeId, Box<dyn Any>>,
}

impl AnalyzerResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<A: 'static, R: 'static>(&mut self, result: R) {
        self.entries.insert(TypeId::of::<A>(), Box::new(result));
    }

    pub fn get<A: 'static, R: 'static>(&self) -> Option<&R> {
        self.entries
            .get(&TypeId::of::<A>())
            .and_then(|entry| entry.downcast_ref())
    }
}
