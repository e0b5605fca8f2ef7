use std::fmt;

use serde::{Deserialize, Serialize};

/// Slopes closer to zero than this are treated as flat.
const SLOPE_EPSILON: f64 = 1e-9;

/// How a fitted slope is turned into a label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendScheme {
    /// Five labels; `threshold` (individuals per year) separates moderate from significant
    Tiered { threshold: f64 },
    /// Three labels by sign only
    Simple,
}

impl Default for TrendScheme {
    fn default() -> Self {
        TrendScheme::Tiered { threshold: 5.0 }
    }
}

impl TrendScheme {
    pub fn classify(&self, slope: f64) -> TrendLabel {
        let slope = if slope.abs() < SLOPE_EPSILON { 0.0 } else { slope };
        match *self {
            TrendScheme::Tiered { threshold } => {
                if slope > threshold {
                    TrendLabel::SignificantIncrease
                } else if slope > 0.0 {
                    TrendLabel::ModerateIncrease
                } else if slope < -threshold {
                    TrendLabel::SignificantDecrease
                } else if slope < 0.0 {
                    TrendLabel::ModerateDecrease
                } else {
                    TrendLabel::Stable
                }
            }
            TrendScheme::Simple => {
                if slope > 0.0 {
                    TrendLabel::Increasing
                } else if slope < 0.0 {
                    TrendLabel::Decreasing
                } else {
                    TrendLabel::Stable
                }
            }
        }
    }
}

/// Direction and magnitude of a population trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    SignificantIncrease,
    ModerateIncrease,
    Increasing,
    Stable,
    Decreasing,
    ModerateDecrease,
    SignificantDecrease,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TrendLabel::SignificantIncrease => "significant increase",
            TrendLabel::ModerateIncrease => "moderate increase",
            TrendLabel::Increasing => "increasing",
            TrendLabel::Stable => "stable",
            TrendLabel::Decreasing => "decreasing",
            TrendLabel::ModerateDecrease => "moderate decrease",
            TrendLabel::SignificantDecrease => "significant decrease",
        };
        f.write_str(text)
    }
}

/// Least-squares line through (year, yearly total) points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, 1.0 for a perfect fit
    pub r_squared: f64,
}

impl TrendFit {
    /// Fit a line, or `None` when fewer than two distinct years are given.
    pub fn fit(points: &[(i32, u64)]) -> Option<Self> {
        let n = points.len();
        if n < 2 {
            return None;
        }

        let xs: Vec<f64> = points.iter().map(|(x, _)| f64::from(*x)).collect();
        let ys: Vec<f64> = points.iter().map(|(_, y)| *y as f64).collect();
        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if sxx <= f64::EPSILON {
            return None;
        }
        let sxy: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
        let ss_res: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
            .sum();
        let r_squared = if ss_tot > f64::EPSILON {
            1.0 - ss_res / ss_tot
        } else {
            1.0
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    pub fn predict(&self, year: i32) -> f64 {
        self.slope * f64::from(year) + self.intercept
    }

    /// Evaluate the line at the `horizon` years after `last_year`, rounded
    /// half away from zero and optionally clamped at zero.
    pub fn project(&self, last_year: i32, horizon: u32, clamp: bool) -> Vec<Projection> {
        (1..=horizon)
            .filter_map(|step| i32::try_from(step).ok())
            .filter_map(|step| last_year.checked_add(step))
            .map(|year| {
                let value = self.predict(year).round();
                let count = (if clamp { value.max(0.0) } else { value }) as i64;
                Projection { year, count }
            })
            .collect()
    }
}

/// Outcome of trend analysis over yearly totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Trend {
    /// Fewer than two distinct years
    InsufficientData,
    Fitted { label: TrendLabel, fit: TrendFit },
}

impl Trend {
    pub fn label(&self) -> Option<TrendLabel> {
        match self {
            Trend::InsufficientData => None,
            Trend::Fitted { label, .. } => Some(*label),
        }
    }

    pub fn fit(&self) -> Option<&TrendFit> {
        match self {
            Trend::InsufficientData => None,
            Trend::Fitted { fit, .. } => Some(fit),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::InsufficientData => f.write_str("insufficient data"),
            Trend::Fitted { label, .. } => label.fmt(f),
        }
    }
}

/// A projected population count for a future year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub year: i32,
    /// May be negative when clamping is disabled
    pub count: i64,
}
