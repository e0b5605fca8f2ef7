//! Two-step interactions between a front end and the dataset.
//!
//! A front end asks the library for a request, shows it to the user, and
//! hands the user's answer back. Nothing blocks and nothing is mutated until
//! the answer arrives.

use crate::error::TrackerError;
use crate::manager::DatasetManager;
use crate::models::{Record, RecordId};

/// A pending choice among the species present in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesSelection {
    choices: Vec<String>,
}

impl SpeciesSelection {
    /// Offer the species of `manager`, failing when there are none.
    pub fn from_manager(manager: &DatasetManager) -> Result<Self, TrackerError> {
        let choices = manager.list_species();
        if choices.is_empty() {
            return Err(TrackerError::NoData(
                "the dataset has no species to choose from".to_string(),
            ));
        }
        Ok(Self { choices })
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Resolve an answer given as an exact species name or a 1-based position.
    pub fn resolve(&self, answer: &str) -> Result<String, TrackerError> {
        let answer = answer.trim();
        if let Some(name) = self.choices.iter().find(|c| c.as_str() == answer) {
            return Ok(name.clone());
        }
        if let Ok(position) = answer.parse::<usize>() {
            if let Some(name) = position.checked_sub(1).and_then(|i| self.choices.get(i)) {
                return Ok(name.clone());
            }
        }
        Err(TrackerError::Validation(format!(
            "'{answer}' is not an available species; choose one of: {}",
            self.choices.join(", ")
        )))
    }
}

/// A delete waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRequest {
    index: usize,
    id: RecordId,
    record: Record,
}

impl DeleteRequest {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// The record as it was when the request was made.
    pub fn record(&self) -> &Record {
        &self.record
    }
}

impl DatasetManager {
    /// Start a delete of the record at `index`.
    pub fn request_delete(&self, index: usize) -> Result<DeleteRequest, TrackerError> {
        let record = self.get(index).cloned().ok_or(TrackerError::Index {
            index,
            len: self.len(),
        })?;
        Ok(DeleteRequest {
            index,
            id: record.id(),
            record,
        })
    }

    /// Carry out a confirmed delete.
    ///
    /// The record is found by id, so edits made since the request are
    /// tolerated; a request whose record is gone is rejected.
    pub fn confirm_delete(&mut self, request: DeleteRequest) -> Result<Record, TrackerError> {
        let position = self.position_of(request.id).ok_or(TrackerError::Index {
            index: request.index,
            len: self.len(),
        })?;
        self.delete_record(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetSettings;
    use crate::models::{RecordDraft, ValidationRules};

    fn manager_with(species: &[&str]) -> DatasetManager {
        let mut manager = DatasetManager::new(ValidationRules::lenient(), DatasetSettings::default());
        for name in species {
            manager
                .add_record(&RecordDraft::new(*name, "1", "2020", "Colón"))
                .unwrap();
        }
        manager
    }

    #[test]
    fn test_selection_empty_dataset_is_no_data() {
        let manager = DatasetManager::default();
        assert!(matches!(
            SpeciesSelection::from_manager(&manager),
            Err(TrackerError::NoData(_))
        ));
    }

    #[test]
    fn test_selection_choices_sorted() {
        let manager = manager_with(&["Tapir", "Jaguar", "Tapir"]);
        let selection = SpeciesSelection::from_manager(&manager).unwrap();
        assert_eq!(selection.choices(), ["Jaguar", "Tapir"]);
    }

    #[test]
    fn test_selection_resolve_by_name_and_position() {
        let manager = manager_with(&["Tapir", "Jaguar"]);
        let selection = SpeciesSelection::from_manager(&manager).unwrap();
        assert_eq!(selection.resolve(" Tapir ").unwrap(), "Tapir");
        assert_eq!(selection.resolve("1").unwrap(), "Jaguar");
        assert_eq!(selection.resolve("2").unwrap(), "Tapir");
    }

    #[test]
    fn test_selection_resolve_rejects_unknown() {
        let manager = manager_with(&["Jaguar"]);
        let selection = SpeciesSelection::from_manager(&manager).unwrap();
        for answer in ["0", "2", "jaguar", ""] {
            let err = selection.resolve(answer).unwrap_err();
            assert!(matches!(err, TrackerError::Validation(_)));
            assert!(err.to_string().contains("Jaguar"));
        }
    }

    #[test]
    fn test_selection_numeric_species_name_wins() {
        let manager = manager_with(&["2", "Jaguar"]);
        let selection = SpeciesSelection::from_manager(&manager).unwrap();
        assert_eq!(selection.resolve("2").unwrap(), "2");
    }

    #[test]
    fn test_delete_request_and_confirm() {
        let mut manager = manager_with(&["Jaguar", "Tapir"]);
        let request = manager.request_delete(1).unwrap();
        assert_eq!(request.record().species, "Tapir");
        let removed = manager.confirm_delete(request).unwrap();
        assert_eq!(removed.species, "Tapir");
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_delete_request_out_of_bounds() {
        let manager = manager_with(&["Jaguar"]);
        assert!(matches!(
            manager.request_delete(5),
            Err(TrackerError::Index { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_declined_request_changes_nothing() {
        let mut manager = manager_with(&["Jaguar", "Tapir"]);
        let request = manager.request_delete(0).unwrap();
        drop(request);
        assert_eq!(manager.len(), 2);
        assert!(manager.delete_record(0).is_ok());
    }

    #[test]
    fn test_confirm_follows_moved_record() {
        let mut manager = manager_with(&["Jaguar", "Tapir", "Rana"]);
        let request = manager.request_delete(2).unwrap();
        manager.delete_record(0).unwrap();
        let removed = manager.confirm_delete(request).unwrap();
        assert_eq!(removed.species, "Rana");
        assert_eq!(manager.list_species(), vec!["Tapir"]);
    }

    #[test]
    fn test_stale_request_rejected() {
        let mut manager = manager_with(&["Jaguar", "Tapir"]);
        let request = manager.request_delete(0).unwrap();
        manager.delete_record(0).unwrap();
        assert!(matches!(
            manager.confirm_delete(request),
            Err(TrackerError::Index { .. })
        ));
        assert_eq!(manager.len(), 1);
    }
}
