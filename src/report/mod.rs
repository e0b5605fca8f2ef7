mod charts;
mod document;
mod pdf;

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::analysis::StatsBundle;
use crate::error::TrackerError;

pub use charts::{BarChart, ChartRenderer, PieChart, PlottersRenderer};
pub use document::{
    assemble_report, projection_rows, top_provinces, ChartImages, ReportDocument, Section,
    REPORT_TITLE, SYSTEM_NAME,
};
pub use pdf::{DocumentWriter, PdfWriter};

/// Report layout and output options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Default directory for generated reports
    pub output_dir: PathBuf,
    /// Append `_YYYYmmdd_HHMMSS` to report file names
    pub timestamp_suffix: bool,
    /// Provinces shown in the distribution chart
    pub top_provinces: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            timestamp_suffix: true,
            top_provinces: 7,
            chart_width: 1000,
            chart_height: 550,
        }
    }
}

/// `Report_<species>[_<YYYYmmdd_HHMMSS>].pdf`, with every character that is
/// not alphanumeric replaced by `_`.
pub fn report_file_name(species: &str, timestamp: Option<NaiveDateTime>) -> String {
    let safe: String = species
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    match timestamp {
        Some(ts) => format!("Report_{safe}_{}.pdf", ts.format("%Y%m%d_%H%M%S")),
        None => format!("Report_{safe}.pdf"),
    }
}

/// Yearly evolution chart data: observed totals, fitted line and projections.
pub fn yearly_chart(species: &str, stats: &StatsBundle, settings: &ReportSettings) -> BarChart {
    let bars: Vec<(i32, u64)> = stats.count_by_year.iter().map(|(y, c)| (*y, *c)).collect();
    let trend_line = stats
        .trend
        .fit()
        .map(|fit| bars.iter().map(|(year, _)| (*year, fit.predict(*year))).collect());
    BarChart {
        title: format!("Yearly evolution: {species}"),
        bars,
        trend_line,
        projections: stats
            .projections
            .iter()
            .map(|p| (p.year, p.count as f64))
            .collect(),
        width: settings.chart_width,
        height: settings.chart_height,
    }
}

/// Province distribution chart data for the largest provinces.
pub fn province_chart(species: &str, stats: &StatsBundle, settings: &ReportSettings) -> PieChart {
    PieChart {
        title: format!("Distribution by province: {species}"),
        slices: top_provinces(stats, settings.top_provinces),
        width: settings.chart_width,
        height: settings.chart_height,
    }
}

/// Produces one PDF report per species.
///
/// Charts are rendered into a private temporary directory that is removed
/// once the report is written. The report itself is staged next to its
/// final path and renamed into place, so a failed run leaves no partial
/// file in the output directory.
pub struct ReportGenerator<R = PlottersRenderer, W = PdfWriter> {
    renderer: R,
    writer: W,
    settings: ReportSettings,
}

impl ReportGenerator {
    pub fn new(settings: ReportSettings) -> Self {
        Self::with_backends(PlottersRenderer, PdfWriter, settings)
    }
}

impl<R: ChartRenderer, W: DocumentWriter> ReportGenerator<R, W> {
    pub fn with_backends(renderer: R, writer: W, settings: ReportSettings) -> Self {
        Self {
            renderer,
            writer,
            settings,
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Generate a report stamped with the current local time.
    pub fn generate(
        &self,
        species: &str,
        stats: &StatsBundle,
        output_dir: &Path,
    ) -> Result<PathBuf, TrackerError> {
        self.generate_at(species, stats, output_dir, chrono::Local::now().naive_local())
    }

    /// Generate a report with an explicit generation time.
    pub fn generate_at(
        &self,
        species: &str,
        stats: &StatsBundle,
        output_dir: &Path,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf, TrackerError> {
        let chart_dir = tempfile::tempdir().map_err(|e| {
            TrackerError::ReportGeneration(format!("cannot create chart directory: {e}"))
        })?;

        let result = self
            .write_report(species, stats, output_dir, chart_dir.path(), generated_at)
            .map_err(TrackerError::into_report_error);

        if let Err(e) = chart_dir.close() {
            tracing::debug!(error = %e, "failed to remove temporary chart directory");
        }

        match &result {
            Ok(path) => tracing::info!(species, path = %path.display(), "report generated"),
            Err(e) => tracing::warn!(species, error = %e, "report generation failed"),
        }
        result
    }

    fn write_report(
        &self,
        species: &str,
        stats: &StatsBundle,
        output_dir: &Path,
        chart_dir: &Path,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf, TrackerError> {
        let images = ChartImages::in_dir(chart_dir);
        self.renderer.render_bar_chart(
            &yearly_chart(species, stats, &self.settings),
            &images.yearly,
        )?;
        self.renderer.render_pie_chart(
            &province_chart(species, stats, &self.settings),
            &images.provinces,
        )?;

        let document = assemble_report(species, stats, &images, generated_at, &self.settings);

        std::fs::create_dir_all(output_dir)?;
        let stamp = self.settings.timestamp_suffix.then_some(generated_at);
        let final_path = output_dir.join(report_file_name(species, stamp));

        let staging = tempfile::Builder::new()
            .prefix(".report-")
            .suffix(".tmp")
            .tempfile_in(output_dir)?;
        self.writer.write_document(&document, staging.path())?;
        make_shareable(staging.as_file())?;
        staging.persist(&final_path).map_err(|e| e.error)?;

        Ok(final_path)
    }
}

/// Staged files are created owner-only; finished reports get the usual
/// `rw-r--r--` mode.
#[cfg(unix)]
fn make_shareable(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn make_shareable(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}
