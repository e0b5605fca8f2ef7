use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisSettings, TrendScheme};
use crate::error::TrackerError;
use crate::io::HeaderStyle;
use crate::models::{ValidationRules, YearRule};
use crate::report::ReportSettings;

/// How loaded spreadsheets are normalized and how saved ones are laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSettings {
    /// Fuzzy-match loaded province names onto the known list
    pub normalize_provinces: bool,
    /// Header row language used when saving
    pub header_style: HeaderStyle,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            normalize_provinces: true,
            header_style: HeaderStyle::Spanish,
        }
    }
}

/// Complete tracker configuration, usually read from a TOML file.
///
/// Every section and key is optional; missing values take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub validation: ValidationRules,
    pub dataset: DatasetSettings,
    pub analysis: AnalysisSettings,
    pub report: ReportSettings,
}

impl TrackerConfig {
    /// Read and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, TrackerError> {
        let config: TrackerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make later operations meaningless.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if let YearRule::Range { min, max } = self.validation.year_rule {
            if min > max {
                return Err(TrackerError::Config(format!(
                    "year range is inverted: min {min} > max {max}"
                )));
            }
        }
        if self.validation.enforce_species && self.validation.species.is_empty() {
            return Err(TrackerError::Config(
                "species whitelist is enforced but empty".to_string(),
            ));
        }
        if self.validation.enforce_province && self.validation.provinces.is_empty() {
            return Err(TrackerError::Config(
                "province whitelist is enforced but empty".to_string(),
            ));
        }
        if let TrendScheme::Tiered { threshold } = self.analysis.trend_scheme {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(TrackerError::Config(format!(
                    "trend threshold must be a non-negative number, got {threshold}"
                )));
            }
        }
        if self.analysis.projection_years == 0 {
            return Err(TrackerError::Config(
                "projection_years must be at least 1".to_string(),
            ));
        }
        if self.report.top_provinces == 0 {
            return Err(TrackerError::Config(
                "top_provinces must be at least 1".to_string(),
            ));
        }
        if self.report.chart_width < 200 || self.report.chart_height < 150 {
            return Err(TrackerError::Config(
                "chart dimensions must be at least 200x150 pixels".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_strict() {
        let config = TrackerConfig::default();
        assert!(config.validation.enforce_species);
        assert!(config.validation.enforce_province);
        assert!(config.dataset.normalize_provinces);
        assert!(config.analysis.clamp_projections);
        assert_eq!(config.analysis.projection_years, 3);
        assert_eq!(config.report.top_provinces, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = TrackerConfig::from_toml_str("").unwrap();
        assert_eq!(config.validation.provinces.len(), 10);
        assert_eq!(config.dataset.header_style, HeaderStyle::Spanish);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = TrackerConfig::from_toml_str(
            r#"
            [validation]
            enforce_species = false
            year_rule = { kind = "four_digit" }

            [dataset]
            header_style = "english"

            [analysis]
            trend_scheme = { kind = "simple" }
            clamp_projections = false

            [report]
            timestamp_suffix = false
            top_provinces = 3
            "#,
        )
        .unwrap();
        assert!(!config.validation.enforce_species);
        assert!(config.validation.enforce_province);
        assert_eq!(config.validation.year_rule, YearRule::FourDigit);
        assert_eq!(config.dataset.header_style, HeaderStyle::English);
        assert_eq!(config.analysis.trend_scheme, TrendScheme::Simple);
        assert!(!config.analysis.clamp_projections);
        assert!(!config.report.timestamp_suffix);
        assert_eq!(config.report.top_provinces, 3);
    }

    #[test]
    fn test_inverted_year_range_rejected() {
        let err = TrackerConfig::from_toml_str(
            "[validation]\nyear_rule = { kind = \"range\", min = 2100, max = 1900 }\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn test_zero_projection_years_rejected() {
        assert!(TrackerConfig::from_toml_str("[analysis]\nprojection_years = 0\n").is_err());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(TrackerConfig::from_toml_str(
            "[analysis]\ntrend_scheme = { kind = \"tiered\", threshold = -1.0 }\n"
        )
        .is_err());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TrackerConfig::from_toml_str("[validation\n").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_from_file_missing() {
        let err = TrackerConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_from_file_reads_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        std::fs::write(&path, "[report]\ntop_provinces = 4\n").unwrap();
        let config = TrackerConfig::from_file(&path).unwrap();
        assert_eq!(config.report.top_provinces, 4);
    }
}
