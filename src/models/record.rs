use serde::{Deserialize, Serialize};

/// Stable identifier assigned to a record when it enters a dataset.
///
/// Ids are never reused by the manager that issued them, so they stay valid
/// across deletes that shift positional indices.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RecordId(pub(crate) u64);

impl RecordId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One observation of a species' population count in a given year and province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier within the owning dataset; not part of the file format
    #[serde(skip)]
    pub(crate) id: RecordId,
    /// Species name (trimmed)
    pub species: String,
    /// Number of individuals observed
    pub count: u64,
    /// Observation year
    pub year: i32,
    /// Province name (trimmed, possibly normalized)
    pub province: String,
}

impl Record {
    /// Create a record that has not been assigned to a dataset yet.
    pub fn new(species: impl Into<String>, count: u64, year: i32, province: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            species: species.into(),
            count,
            year,
            province: province.into(),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Field-wise equality, ignoring the dataset id.
    pub fn same_fields(&self, other: &Record) -> bool {
        self.species == other.species
            && self.count == other.count
            && self.year == other.year
            && self.province == other.province
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.species, self.count, self.year, self.province
        )
    }
}

/// Raw, unvalidated field values as typed by a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub species: String,
    pub count: String,
    pub year: String,
    pub province: String,
}

impl RecordDraft {
    pub fn new(
        species: impl Into<String>,
        count: impl Into<String>,
        year: impl Into<String>,
        province: impl Into<String>,
    ) -> Self {
        Self {
            species: species.into(),
            count: count.into(),
            year: year.into(),
            province: province.into(),
        }
    }
}

impl From<&Record> for RecordDraft {
    fn from(record: &Record) -> Self {
        Self {
            species: record.species.clone(),
            count: record.count.to_string(),
            year: record.year.to_string(),
            province: record.province.clone(),
        }
    }
}
