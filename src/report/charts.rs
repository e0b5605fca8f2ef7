use std::f64::consts::PI;
use std::path::Path;

use plotters::prelude::*;

use crate::error::TrackerError;

/// Data for the yearly evolution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    /// Observed (year, total) bars in ascending year order
    pub bars: Vec<(i32, u64)>,
    /// Fitted values over the observed years, if a trend exists
    pub trend_line: Option<Vec<(i32, f64)>>,
    /// Projected (year, count) points drawn as a dashed series
    pub projections: Vec<(i32, f64)>,
    pub width: u32,
    pub height: u32,
}

/// Data for the province distribution chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<(String, u64)>,
    pub width: u32,
    pub height: u32,
}

/// Renders report charts to image files.
pub trait ChartRenderer {
    fn render_bar_chart(&self, chart: &BarChart, path: &Path) -> Result<(), TrackerError>;
    fn render_pie_chart(&self, chart: &PieChart, path: &Path) -> Result<(), TrackerError>;
}

/// PNG charts drawn with the plotters bitmap backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersRenderer;

const BAR_COLOR: RGBColor = RGBColor(46, 139, 87);
const TREND_COLOR: RGBColor = RGBColor(200, 0, 100);
const PROJECTION_COLOR: RGBColor = RGBColor(30, 144, 255);

const PALETTE: [RGBColor; 8] = [
    RGBColor(46, 139, 87),
    RGBColor(30, 144, 255),
    RGBColor(255, 165, 0),
    RGBColor(200, 0, 100),
    RGBColor(106, 90, 205),
    RGBColor(218, 165, 32),
    RGBColor(0, 128, 128),
    RGBColor(160, 82, 45),
];

fn chart_err<E: std::fmt::Display>(e: E) -> TrackerError {
    TrackerError::Chart(e.to_string())
}

/// X range covering every bar and projection with half a year of padding.
pub(crate) fn year_range(chart: &BarChart) -> (f64, f64) {
    let years = chart
        .bars
        .iter()
        .map(|(y, _)| *y)
        .chain(chart.projections.iter().map(|(y, _)| *y));
    let (lo, hi) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if lo > hi {
        return (0.0, 1.0);
    }
    (f64::from(lo) - 0.5, f64::from(hi) + 0.5)
}

/// Y upper bound with headroom; at least 1 so an all-zero chart still has an axis.
pub(crate) fn value_ceiling(chart: &BarChart) -> f64 {
    let bars = chart.bars.iter().map(|(_, v)| *v as f64);
    let trend = chart.trend_line.iter().flatten().map(|(_, v)| *v);
    let projected = chart.projections.iter().map(|(_, v)| *v);
    let max = bars.chain(trend).chain(projected).fold(0.0, f64::max);
    (max * 1.15).max(1.0)
}

/// Start angle and sweep, in radians, of each pie slice. Zero-valued
/// slices get a zero sweep.
pub(crate) fn slice_angles(values: &[u64]) -> Vec<(f64, f64)> {
    let total: f64 = values.iter().map(|v| *v as f64).sum();
    let mut start = -PI / 2.0;
    values
        .iter()
        .map(|v| {
            let sweep = if total == 0.0 {
                0.0
            } else {
                *v as f64 / total * 2.0 * PI
            };
            let slice = (start, sweep);
            start += sweep;
            slice
        })
        .collect()
}

/// Polygon outline of a pie wedge in pixel coordinates.
pub(crate) fn wedge_points(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep.abs() / (2.0 * PI)) * 120.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for i in 0..=steps {
        let angle = start + sweep * i as f64 / steps as f64;
        points.push((
            center.0 + (radius * angle.cos()).round() as i32,
            center.1 + (radius * angle.sin()).round() as i32,
        ));
    }
    points
}

impl ChartRenderer for PlottersRenderer {
    fn render_bar_chart(&self, chart: &BarChart, path: &Path) -> Result<(), TrackerError> {
        let root = BitMapBackend::new(path, (chart.width, chart.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let (x_min, x_max) = year_range(chart);
        let y_max = value_ceiling(chart);

        let mut plot = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 28))
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)
            .map_err(chart_err)?;

        let year_count = (x_max - x_min).round().max(1.0) as usize;
        plot.configure_mesh()
            .disable_x_mesh()
            .x_labels(year_count.min(20))
            .x_label_formatter(&|v| format!("{:.0}", v))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .x_desc("Year")
            .y_desc("Individuals")
            .draw()
            .map_err(chart_err)?;

        plot.draw_series(chart.bars.iter().map(|(year, count)| {
            let x = f64::from(*year);
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *count as f64)], BAR_COLOR.filled())
        }))
        .map_err(chart_err)?
        .label("Observed")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BAR_COLOR.filled()));

        if let Some(trend) = &chart.trend_line {
            plot.draw_series(LineSeries::new(
                trend.iter().map(|(y, v)| (f64::from(*y), *v)),
                ShapeStyle::from(&TREND_COLOR).stroke_width(3),
            ))
            .map_err(chart_err)?
            .label("Trend")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], &TREND_COLOR));
        }

        if !chart.projections.is_empty() {
            // Join the dashed series to the end of the trend line when there is one
            let anchor = chart
                .trend_line
                .as_ref()
                .and_then(|t| t.last())
                .map(|(y, v)| (f64::from(*y), *v));
            let points: Vec<(f64, f64)> = anchor
                .into_iter()
                .chain(chart.projections.iter().map(|(y, v)| (f64::from(*y), *v)))
                .collect();

            plot.draw_series(DashedLineSeries::new(
                points,
                10,
                6,
                ShapeStyle::from(&PROJECTION_COLOR).stroke_width(2),
            ))
            .map_err(chart_err)?
            .label("Projection")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], &PROJECTION_COLOR));

            plot.draw_series(
                chart
                    .projections
                    .iter()
                    .map(|(y, v)| Circle::new((f64::from(*y), *v), 5, PROJECTION_COLOR.filled())),
            )
            .map_err(chart_err)?;
        }

        plot.configure_series_labels()
            .background_style(&WHITE.mix(0.7))
            .border_style(&BLACK.mix(0.3))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
        tracing::debug!(path = %path.display(), bars = chart.bars.len(), "bar chart rendered");
        Ok(())
    }

    fn render_pie_chart(&self, chart: &PieChart, path: &Path) -> Result<(), TrackerError> {
        let root = BitMapBackend::new(path, (chart.width, chart.height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let title_style = ("sans-serif", 28).into_font().color(&BLACK);
        root.draw(&Text::new(chart.title.as_str(), (20, 15), title_style))
            .map_err(chart_err)?;

        let width = chart.width as i32;
        let height = chart.height as i32;
        let radius = f64::from((height - 90).min(width / 2 - 40).max(20)) / 2.0;
        let center = (20 + radius as i32 + 20, 60 + radius as i32);

        let values: Vec<u64> = chart.slices.iter().map(|(_, v)| *v).collect();
        let total: f64 = values.iter().map(|v| *v as f64).sum();
        let label_style = ("sans-serif", 18).into_font().color(&BLACK);

        if total == 0.0 {
            root.draw(&Text::new("No individuals recorded", (center.0 - 90, center.1), label_style))
                .map_err(chart_err)?;
        } else {
            for (i, (start, sweep)) in slice_angles(&values).into_iter().enumerate() {
                if sweep <= 0.0 {
                    continue;
                }
                let color = PALETTE[i % PALETTE.len()];
                root.draw(&Polygon::new(
                    wedge_points(center, radius, start, sweep),
                    color.filled(),
                ))
                .map_err(chart_err)?;
            }

            let legend_x = center.0 + radius as i32 + 40;
            for (i, (name, count)) in chart.slices.iter().enumerate() {
                let y = 70 + i as i32 * 30;
                let color = PALETTE[i % PALETTE.len()];
                root.draw(&Rectangle::new([(legend_x, y), (legend_x + 18, y + 18)], color.filled()))
                    .map_err(chart_err)?;
                let share = *count as f64 / total * 100.0;
                let text = format!("{name} ({share:.1}%)");
                root.draw(&Text::new(text, (legend_x + 28, y), label_style.clone()))
                    .map_err(chart_err)?;
            }
        }

        root.present().map_err(chart_err)?;
        tracing::debug!(path = %path.display(), slices = chart.slices.len(), "pie chart rendered");
        Ok(())
    }
}
