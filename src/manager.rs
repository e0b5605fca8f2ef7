use std::path::{Path, PathBuf};

use crate::config::{DatasetSettings, TrackerConfig};
use crate::error::TrackerError;
use crate::io;
use crate::models::{Record, RecordDraft, RecordId, ValidationRules};

/// Owns the in-memory dataset and every mutation of it.
///
/// Records are addressed by position for the user-facing operations, and by
/// [`RecordId`] where a reference has to survive other edits.
#[derive(Debug, Clone)]
pub struct DatasetManager {
    records: Vec<Record>,
    path: Option<PathBuf>,
    unsaved: bool,
    next_id: u64,
    rules: ValidationRules,
    settings: DatasetSettings,
}

impl Default for DatasetManager {
    fn default() -> Self {
        Self::new(ValidationRules::default(), DatasetSettings::default())
    }
}

impl DatasetManager {
    /// Create an empty manager with the given policies.
    pub fn new(rules: ValidationRules, settings: DatasetSettings) -> Self {
        Self {
            records: Vec::new(),
            path: None,
            unsaved: false,
            next_id: 1,
            rules,
            settings,
        }
    }

    /// Create an empty manager from a full configuration.
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.validation.clone(), config.dataset.clone())
    }

    fn assign_id(&mut self, record: &mut Record) {
        record.id = RecordId(self.next_id);
        self.next_id += 1;
    }

    fn check_index(&self, index: usize) -> Result<(), TrackerError> {
        if index >= self.records.len() {
            return Err(TrackerError::Index {
                index,
                len: self.records.len(),
            });
        }
        Ok(())
    }

    /// Replace the dataset with the contents of a spreadsheet.
    ///
    /// Returns the number of records loaded. On failure the current dataset
    /// is left as it was.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, TrackerError> {
        let path = path.as_ref();
        let provinces = self
            .settings
            .normalize_provinces
            .then_some(self.rules.provinces.as_slice());

        let mut records =
            io::read_records(path, provinces).map_err(|e| TrackerError::load(path, e))?;
        for record in records.iter_mut() {
            self.assign_id(record);
        }

        let count = records.len();
        self.records = records;
        self.path = Some(path.to_path_buf());
        self.unsaved = false;
        tracing::info!(path = %path.display(), records = count, "dataset loaded");
        Ok(count)
    }

    /// Write the dataset to `path`, or to the remembered path when `None`.
    pub fn save(&mut self, path: Option<&Path>) -> Result<(), TrackerError> {
        let target = match path {
            Some(p) => p.to_path_buf(),
            None => self.path.clone().ok_or_else(|| {
                TrackerError::Save("no file path given and none remembered".to_string())
            })?,
        };

        io::write_records(&self.records, self.settings.header_style, &target)
            .map_err(|e| TrackerError::Save(format!("{}: {e}", target.display())))?;

        tracing::info!(path = %target.display(), records = self.records.len(), "dataset saved");
        self.path = Some(target);
        self.unsaved = false;
        Ok(())
    }

    /// Validate a draft and append it. Returns the new record's id.
    pub fn add_record(&mut self, draft: &RecordDraft) -> Result<RecordId, TrackerError> {
        let mut record = self.rules.validate(draft)?;
        self.assign_id(&mut record);
        let id = record.id;
        tracing::debug!(%id, %record, "record added");
        self.records.push(record);
        self.unsaved = true;
        Ok(id)
    }

    /// Validate a draft and overwrite the record at `index` with it.
    ///
    /// The record keeps its id and position.
    pub fn modify_record(&mut self, index: usize, draft: &RecordDraft) -> Result<(), TrackerError> {
        self.check_index(index)?;
        let mut record = self.rules.validate(draft)?;
        record.id = self.records[index].id;
        tracing::debug!(index, %record, "record modified");
        self.records[index] = record;
        self.unsaved = true;
        Ok(())
    }

    /// Remove and return the record at `index`; later records shift down.
    pub fn delete_record(&mut self, index: usize) -> Result<Record, TrackerError> {
        self.check_index(index)?;
        let record = self.records.remove(index);
        tracing::debug!(index, %record, "record deleted");
        self.unsaved = true;
        Ok(record)
    }

    /// Current position of the record with `id`, if it is still present.
    pub fn position_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    fn require_position(&self, id: RecordId) -> Result<usize, TrackerError> {
        self.position_of(id).ok_or_else(|| {
            tracing::debug!(%id, "record id no longer present");
            TrackerError::Index {
                index: usize::try_from(id.value()).unwrap_or(usize::MAX),
                len: self.records.len(),
            }
        })
    }

    pub fn modify_by_id(&mut self, id: RecordId, draft: &RecordDraft) -> Result<(), TrackerError> {
        let index = self.require_position(id)?;
        self.modify_record(index, draft)
    }

    pub fn delete_by_id(&mut self, id: RecordId) -> Result<Record, TrackerError> {
        let index = self.require_position(id)?;
        self.delete_record(index)
    }

    /// Distinct non-empty species names in case-sensitive sorted order.
    pub fn list_species(&self) -> Vec<String> {
        let mut species: Vec<String> = self
            .records
            .iter()
            .filter(|r| !r.species.is_empty())
            .map(|r| r.species.clone())
            .collect();
        species.sort();
        species.dedup();
        species
    }

    /// Copies of the records whose species matches `name` exactly.
    pub fn filter_by_species(&self, name: &str) -> Vec<Record> {
        let name = name.trim();
        self.records
            .iter()
            .filter(|r| r.species == name)
            .cloned()
            .collect()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the last successful load or save.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }
}
