use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

use super::{Record, RecordDraft};

/// The ten provinces of Panama, in their canonical spelling.
pub const PANAMA_PROVINCES: [&str; 10] = [
    "Bocas del Toro",
    "Chiriquí",
    "Coclé",
    "Colón",
    "Darién",
    "Herrera",
    "Los Santos",
    "Panamá",
    "Veraguas",
    "Panamá Oeste",
];

/// Species tracked out of the box.
pub const DEFAULT_SPECIES: [&str; 6] = [
    "Águila Arpía",
    "Jaguar",
    "Perezoso de Tres Dedos",
    "Tapir Centroamericano",
    "Tortuga Carey",
    "Rana Dorada",
];

/// Rule applied to the year typed by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum YearRule {
    /// Exactly four ASCII digits, 1000-9999
    FourDigit,
    /// Any integer within `min..=max`
    Range { min: i32, max: i32 },
    /// Any integer
    Any,
}

impl Default for YearRule {
    fn default() -> Self {
        YearRule::Range {
            min: 1900,
            max: 2100,
        }
    }
}

impl YearRule {
    /// Parse and check a year, returning the user-facing message on failure.
    pub fn parse(&self, text: &str) -> Result<i32, String> {
        let text = text.trim();
        match self {
            YearRule::FourDigit => {
                if text.len() != 4 || !text.chars().all(|c| c.is_ascii_digit()) {
                    return Err("Year must have exactly four digits (1000-9999)".to_string());
                }
                match text.parse::<i32>() {
                    Ok(year) if (1000..=9999).contains(&year) => Ok(year),
                    _ => Err("Year must have exactly four digits (1000-9999)".to_string()),
                }
            }
            YearRule::Range { min, max } => match text.parse::<i32>() {
                Ok(year) if (*min..=*max).contains(&year) => Ok(year),
                _ => Err(format!("Year must be an integer between {min} and {max}")),
            },
            YearRule::Any => text
                .parse::<i32>()
                .map_err(|_| "Year must be an integer".to_string()),
        }
    }
}

/// Field validation policy applied to user-entered records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Reject species outside `species`
    pub enforce_species: bool,
    /// Allowed species names
    pub species: Vec<String>,
    /// Reject provinces outside `provinces`
    pub enforce_province: bool,
    /// Known province names; also the targets of load-time normalization
    pub provinces: Vec<String>,
    /// Year format rule
    pub year_rule: YearRule,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            enforce_species: true,
            species: DEFAULT_SPECIES.iter().map(|s| s.to_string()).collect(),
            enforce_province: true,
            provinces: PANAMA_PROVINCES.iter().map(|s| s.to_string()).collect(),
            year_rule: YearRule::default(),
        }
    }
}

impl ValidationRules {
    /// Rules that only check types: any species, any province, any integer year.
    pub fn lenient() -> Self {
        Self {
            enforce_species: false,
            enforce_province: false,
            year_rule: YearRule::Any,
            ..Self::default()
        }
    }

    /// Validate a draft and build an unassigned record from it.
    ///
    /// Checks run in a fixed order and the first failure is reported.
    pub fn validate(&self, draft: &RecordDraft) -> Result<Record, TrackerError> {
        let species = draft.species.trim();
        if species.is_empty() {
            return Err(TrackerError::Validation("Species is required".to_string()));
        }
        if self.enforce_species && !self.species.iter().any(|s| s == species) {
            return Err(TrackerError::Validation(format!(
                "Species '{species}' is not in the allowed list: {}",
                self.species.join(", ")
            )));
        }

        let count = draft
            .count
            .trim()
            .parse::<u64>()
            .map_err(|_| {
                TrackerError::Validation("Count must be a non-negative integer".to_string())
            })?;

        let year = self
            .year_rule
            .parse(&draft.year)
            .map_err(TrackerError::Validation)?;

        let province = draft.province.trim();
        if self.enforce_province && !self.provinces.iter().any(|p| p == province) {
            return Err(TrackerError::Validation(format!(
                "Province '{province}' is not one of: {}",
                self.provinces.join(", ")
            )));
        }

        Ok(Record::new(species, count, year, province))
    }
}

/// Map free text to the closest known province name.
///
/// Exact matches win; otherwise the first known name that contains, or is
/// contained in, the value (ignoring case). Unmatched values pass through
/// trimmed.
pub fn normalize_province(raw: &str, provinces: &[String]) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    if let Some(exact) = provinces.iter().find(|p| p.as_str() == value) {
        return exact.clone();
    }
    let lowered = value.to_lowercase();
    provinces
        .iter()
        .find(|p| {
            let known = p.to_lowercase();
            known.contains(&lowered) || lowered.contains(&known)
        })
        .cloned()
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provinces() -> Vec<String> {
        PANAMA_PROVINCES.iter().map(|s| s.to_string()).collect()
    }

    fn draft(species: &str, count: &str, year: &str, province: &str) -> RecordDraft {
        RecordDraft::new(species, count, year, province)
    }

    #[test]
    fn test_valid_draft_passes() {
        let rules = ValidationRules::default();
        let record = rules
            .validate(&draft(" Jaguar ", "12", "2021", "Darién"))
            .unwrap();
        assert_eq!(record.species, "Jaguar");
        assert_eq!(record.count, 12);
        assert_eq!(record.year, 2021);
        assert_eq!(record.province, "Darién");
    }

    #[test]
    fn test_empty_species_rejected_first() {
        let rules = ValidationRules::default();
        let err = rules.validate(&draft("  ", "x", "y", "z")).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Species is required");
    }

    #[test]
    fn test_unknown_species_rejected() {
        let rules = ValidationRules::default();
        let err = rules.validate(&draft("Dodo", "x", "y", "z")).unwrap_err();
        assert!(err.to_string().contains("not in the allowed list"));
    }

    #[test]
    fn test_species_match_is_case_sensitive() {
        let rules = ValidationRules::default();
        assert!(rules.validate(&draft("jaguar", "1", "2020", "Colón")).is_err());
    }

    #[test]
    fn test_negative_count_rejected() {
        let rules = ValidationRules::default();
        let err = rules.validate(&draft("Jaguar", "-3", "2020", "Colón")).unwrap_err();
        assert!(err.to_string().contains("non-negative integer"));
    }

    #[test]
    fn test_decimal_count_rejected() {
        let rules = ValidationRules::default();
        assert!(rules.validate(&draft("Jaguar", "2.5", "2020", "Colón")).is_err());
    }

    #[test]
    fn test_count_checked_before_year() {
        let rules = ValidationRules::default();
        let err = rules.validate(&draft("Jaguar", "abc", "abc", "Nowhere")).unwrap_err();
        assert!(err.to_string().contains("Count"));
    }

    #[test]
    fn test_year_out_of_range_rejected() {
        let rules = ValidationRules::default();
        let err = rules.validate(&draft("Jaguar", "3", "1850", "Colón")).unwrap_err();
        assert!(err.to_string().contains("between 1900 and 2100"));
    }

    #[test]
    fn test_year_checked_before_province() {
        let rules = ValidationRules::default();
        let err = rules.validate(&draft("Jaguar", "3", "3000", "Nowhere")).unwrap_err();
        assert!(err.to_string().contains("Year"));
    }

    #[test]
    fn test_unknown_province_rejected() {
        let rules = ValidationRules::default();
        let err = rules.validate(&draft("Jaguar", "3", "2000", "Nowhere")).unwrap_err();
        assert!(err.to_string().contains("Province 'Nowhere'"));
    }

    #[test]
    fn test_lenient_rules_accept_freeform() {
        let rules = ValidationRules::lenient();
        let record = rules.validate(&draft("Dodo", "3", "1500", "Atlantis")).unwrap();
        assert_eq!(record.species, "Dodo");
        assert_eq!(record.year, 1500);
        assert_eq!(record.province, "Atlantis");
    }

    #[test]
    fn test_four_digit_rule() {
        let rule = YearRule::FourDigit;
        assert_eq!(rule.parse("2024"), Ok(2024));
        assert_eq!(rule.parse(" 1000 "), Ok(1000));
        assert!(rule.parse("999").is_err());
        assert!(rule.parse("0999").is_err());
        assert!(rule.parse("20245").is_err());
        assert!(rule.parse("+202").is_err());
    }

    #[test]
    fn test_any_rule() {
        let rule = YearRule::Any;
        assert_eq!(rule.parse("-40"), Ok(-40));
        assert!(rule.parse("soon").is_err());
    }

    #[test]
    fn test_default_year_rule_is_range() {
        assert_eq!(
            YearRule::default(),
            YearRule::Range {
                min: 1900,
                max: 2100
            }
        );
    }

    #[test]
    fn test_normalize_exact_match() {
        assert_eq!(normalize_province("Colón", &provinces()), "Colón");
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_province("  Herrera ", &provinces()), "Herrera");
    }

    #[test]
    fn test_normalize_case_insensitive_substring() {
        assert_eq!(normalize_province("bocas", &provinces()), "Bocas del Toro");
        assert_eq!(normalize_province("VERAGUAS", &provinces()), "Veraguas");
    }

    #[test]
    fn test_normalize_value_containing_known_name() {
        assert_eq!(
            normalize_province("Provincia de Chiriquí", &provinces()),
            "Chiriquí"
        );
    }

    #[test]
    fn test_normalize_first_match_wins() {
        // "panamá" is contained in both "Panamá" and "Panamá Oeste"; list order decides
        assert_eq!(normalize_province("panamá", &provinces()), "Panamá");
    }

    #[test]
    fn test_normalize_unmatched_passes_through() {
        assert_eq!(normalize_province(" Atlantis ", &provinces()), "Atlantis");
    }

    #[test]
    fn test_normalize_empty_stays_empty() {
        assert_eq!(normalize_province("   ", &provinces()), "");
    }

    #[test]
    fn test_rules_toml_roundtrip() {
        let rules = ValidationRules {
            year_rule: YearRule::FourDigit,
            ..ValidationRules::default()
        };
        let text = toml::to_string(&rules).unwrap();
        let back: ValidationRules = toml::from_str(&text).unwrap();
        assert_eq!(back.year_rule, YearRule::FourDigit);
        assert_eq!(back.provinces.len(), 10);
    }
}
