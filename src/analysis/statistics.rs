use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::TrackerError;
use crate::models::Record;

use super::trend::{Projection, Trend, TrendFit, TrendScheme};

/// Analysis policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub trend_scheme: TrendScheme,
    /// Floor projected counts at zero
    pub clamp_projections: bool,
    /// Number of future years to project
    pub projection_years: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            trend_scheme: TrendScheme::default(),
            clamp_projections: true,
            projection_years: 3,
        }
    }
}

/// Aggregates, trend and projections for one subset of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    pub total: u64,
    pub record_count: usize,
    /// Mean count per record
    pub mean: f64,
    /// `mean` rounded half away from zero, for display
    pub mean_rounded: i64,
    /// Sample standard deviation of per-record counts; 0 for a single record
    pub std_dev: f64,
    pub min_count: u64,
    pub max_count: u64,
    pub count_by_year: BTreeMap<i32, u64>,
    pub count_by_province: BTreeMap<String, u64>,
    pub trend: Trend,
    pub projections: Vec<Projection>,
}

impl StatsBundle {
    /// Provinces sorted by count descending, then by name.
    pub fn provinces_by_count(&self) -> Vec<(String, u64)> {
        let mut provinces: Vec<(String, u64)> = self
            .count_by_province
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        provinces.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        provinces
    }

    /// Percentage of the total represented by `count`; 0 when the total is 0.
    pub fn share_of_total(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// Most recent observed year and its total.
    pub fn last_observed(&self) -> Option<(i32, u64)> {
        self.count_by_year
            .iter()
            .next_back()
            .map(|(year, count)| (*year, *count))
    }
}

/// Compute statistics over a subset of records.
///
/// The trend is fitted on yearly totals; an empty subset is an error.
pub fn compute_statistics(
    records: &[Record],
    settings: &AnalysisSettings,
) -> Result<StatsBundle, TrackerError> {
    if records.is_empty() {
        return Err(TrackerError::NoData(
            "no records to compute statistics from".to_string(),
        ));
    }

    let counts: Vec<f64> = records.iter().map(|r| r.count as f64).collect();
    let total = records
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.count));
    let mean = counts.iter().mean();
    let std_dev = if counts.len() < 2 {
        0.0
    } else {
        counts.iter().std_dev()
    };
    let (min_count, max_count) = records
        .iter()
        .fold((u64::MAX, 0), |(lo, hi), r| (lo.min(r.count), hi.max(r.count)));

    let mut count_by_year: BTreeMap<i32, u64> = BTreeMap::new();
    let mut count_by_province: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        let year = count_by_year.entry(record.year).or_insert(0);
        *year = year.saturating_add(record.count);
        let province = count_by_province
            .entry(record.province.clone())
            .or_insert(0);
        *province = province.saturating_add(record.count);
    }

    let yearly: Vec<(i32, u64)> = count_by_year.iter().map(|(y, c)| (*y, *c)).collect();
    let (trend, projections) = match TrendFit::fit(&yearly) {
        Some(fit) => {
            let label = settings.trend_scheme.classify(fit.slope);
            let last_year = yearly.last().map(|(y, _)| *y).unwrap_or_default();
            let projections =
                fit.project(last_year, settings.projection_years, settings.clamp_projections);
            (Trend::Fitted { label, fit }, projections)
        }
        None => (Trend::InsufficientData, Vec::new()),
    };

    tracing::debug!(
        records = records.len(),
        total,
        years = yearly.len(),
        %trend,
        "statistics computed"
    );

    Ok(StatsBundle {
        total,
        record_count: records.len(),
        mean,
        mean_rounded: mean.round() as i64,
        std_dev,
        min_count,
        max_count,
        count_by_year,
        count_by_province,
        trend,
        projections,
    })
}
