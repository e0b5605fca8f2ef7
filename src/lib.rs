pub mod analysis;
pub mod config;
pub mod error;
pub mod flow;
pub mod io;
pub mod manager;
pub mod models;
pub mod report;
pub mod visualization;

pub use analysis::{compute_statistics, AnalysisSettings, Analyzer, StatsBundle, Trend, TrendLabel};
pub use config::TrackerConfig;
pub use error::TrackerError;
pub use flow::{DeleteRequest, SpeciesSelection};
pub use io::{DatasetReader, DatasetWriter};
pub use manager::DatasetManager;
pub use models::{Record, RecordDraft, RecordId, ValidationRules};
pub use report::{ReportGenerator, ReportSettings};
