mod analyzer;
mod statistics;
mod trend;

pub use analyzer::Analyzer;
pub use statistics::{compute_statistics, AnalysisSettings, StatsBundle};
pub use trend::{Projection, Trend, TrendFit, TrendLabel, TrendScheme};
