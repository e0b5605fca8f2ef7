mod record;
mod rules;

pub use record::{Record, RecordDraft, RecordId};
pub use rules::{
    normalize_province, ValidationRules, YearRule, DEFAULT_SPECIES, PANAMA_PROVINCES,
};
