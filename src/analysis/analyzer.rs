use crate::analysis::{compute_statistics, AnalysisSettings, StatsBundle};
use crate::error::TrackerError;
use crate::manager::DatasetManager;
use crate::models::Record;

/// Unified analysis API over one species' records.
pub struct Analyzer<'a> {
    species: String,
    records: Vec<Record>,
    settings: &'a AnalysisSettings,
}

impl<'a> Analyzer<'a> {
    /// Analyze an arbitrary subset of records.
    pub fn new(species: impl Into<String>, records: Vec<Record>, settings: &'a AnalysisSettings) -> Self {
        Self {
            species: species.into(),
            records,
            settings,
        }
    }

    /// Take a snapshot of one species from the dataset.
    pub fn for_species(manager: &DatasetManager, species: &str, settings: &'a AnalysisSettings) -> Self {
        Self::new(species.trim(), manager.filter_by_species(species), settings)
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Full statistics bundle; fails with `NoData` when the species has no records.
    pub fn statistics(&self) -> Result<StatsBundle, TrackerError> {
        compute_statistics(&self.records, self.settings).map_err(|e| match e {
            TrackerError::NoData(_) => {
                TrackerError::NoData(format!("no records for species '{}'", self.species))
            }
            other => other,
        })
    }
}
