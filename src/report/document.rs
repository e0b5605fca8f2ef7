use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::analysis::{StatsBundle, Trend};

use super::ReportSettings;

pub const REPORT_TITLE: &str = "Conservation Report";
pub const SYSTEM_NAME: &str = "Endangered Species Tracker";

/// Display name for records without a province.
const UNSPECIFIED_PROVINCE: &str = "(unspecified)";

/// One block of a report, laid out top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Title {
        title: String,
        subtitle: String,
        generated: String,
    },
    Heading(String),
    Paragraph(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Image {
        path: PathBuf,
        caption: String,
    },
    Footer(String),
}

/// A complete report, independent of its output format.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

/// Rendered chart images referenced by a report.
#[derive(Debug, Clone)]
pub struct ChartImages {
    pub yearly: PathBuf,
    pub provinces: PathBuf,
}

impl ChartImages {
    /// Conventional chart file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            yearly: dir.join("yearly_evolution.png"),
            provinces: dir.join("province_distribution.png"),
        }
    }
}

fn province_label(name: &str) -> String {
    if name.is_empty() {
        UNSPECIFIED_PROVINCE.to_string()
    } else {
        name.to_string()
    }
}

fn percent(stats: &StatsBundle, count: u64) -> String {
    format!("{:.1}%", stats.share_of_total(count))
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> Section {
    Section::Table {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

/// Provinces for the pie chart: the `top` largest by count.
pub fn top_provinces(stats: &StatsBundle, top: usize) -> Vec<(String, u64)> {
    stats
        .provinces_by_count()
        .into_iter()
        .take(top)
        .map(|(name, count)| (province_label(&name), count))
        .collect()
}

/// Rows of the projection table: year, projected count, signed variation
/// against the previous period.
pub fn projection_rows(stats: &StatsBundle) -> Vec<Vec<String>> {
    let mut previous = stats
        .last_observed()
        .map(|(_, c)| i64::try_from(c).unwrap_or(i64::MAX))
        .unwrap_or(0);
    stats
        .projections
        .iter()
        .map(|p| {
            let variation = p.count.saturating_sub(previous);
            previous = p.count;
            vec![p.year.to_string(), p.count.to_string(), format!("{variation:+}")]
        })
        .collect()
}

fn projection_narrative(species: &str, stats: &StatsBundle) -> String {
    match &stats.trend {
        Trend::InsufficientData => format!(
            "Observations of {species} cover fewer than two distinct years, so no trend \
             line can be fitted and no projections are made. Record counts for additional \
             years to enable projections."
        ),
        Trend::Fitted { label, fit } => {
            let mut text = format!(
                "The population of {species} shows a {label} trend of {:+.2} individuals \
                 per year (R-squared {:.3}).",
                fit.slope, fit.r_squared
            );
            if let Some(last) = stats.projections.last() {
                text.push_str(&format!(
                    " If the trend holds, about {} individuals are expected by {}.",
                    last.count, last.year
                ));
            }
            text
        }
    }
}

/// Assemble the report sections for one species.
pub fn assemble_report(
    species: &str,
    stats: &StatsBundle,
    charts: &ChartImages,
    generated_at: NaiveDateTime,
    settings: &ReportSettings,
) -> ReportDocument {
    let stamp = generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let mut sections = Vec::new();

    sections.push(Section::Title {
        title: REPORT_TITLE.to_string(),
        subtitle: species.to_string(),
        generated: format!("Generated: {stamp}"),
    });

    sections.push(Section::Heading("Executive Summary".to_string()));
    sections.push(table(
        &["Metric", "Value"],
        vec![
            vec!["Total individuals".to_string(), stats.total.to_string()],
            vec!["Mean per record".to_string(), stats.mean_rounded.to_string()],
            vec!["Records".to_string(), stats.record_count.to_string()],
            vec!["Trend".to_string(), stats.trend.to_string()],
        ],
    ));

    sections.push(Section::Heading("Yearly Evolution".to_string()));
    sections.push(Section::Image {
        path: charts.yearly.clone(),
        caption: "Individuals per year with fitted trend and projections".to_string(),
    });
    sections.push(table(
        &["Year", "Individuals", "% of total"],
        stats
            .count_by_year
            .iter()
            .map(|(year, count)| vec![year.to_string(), count.to_string(), percent(stats, *count)])
            .collect(),
    ));

    sections.push(Section::Heading("Distribution by Province".to_string()));
    sections.push(Section::Image {
        path: charts.provinces.clone(),
        caption: format!("Top {} provinces by individuals", settings.top_provinces),
    });
    sections.push(table(
        &["Province", "Individuals", "% of total"],
        stats
            .provinces_by_count()
            .into_iter()
            .map(|(name, count)| vec![province_label(&name), count.to_string(), percent(stats, count)])
            .collect(),
    ));

    sections.push(Section::Heading("Projections".to_string()));
    sections.push(Section::Paragraph(projection_narrative(species, stats)));
    if !stats.projections.is_empty() {
        sections.push(table(
            &["Year", "Projected individuals", "Variation"],
            projection_rows(stats),
        ));
    }

    sections.push(Section::Footer(format!("{SYSTEM_NAME} | Generated {stamp}")));

    ReportDocument {
        title: format!("{REPORT_TITLE}: {species}"),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_statistics, AnalysisSettings};
    use crate::models::Record;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn stats(records: &[Record]) -> StatsBundle {
        compute_statistics(records, &AnalysisSettings::default()).unwrap()
    }

    fn growing() -> StatsBundle {
        stats(&[
            Record::new("Jaguar", 10, 2020, "Darién"),
            Record::new("Jaguar", 20, 2021, "Colón"),
            Record::new("Jaguar", 30, 2022, "Darién"),
        ])
    }

    fn assemble(stats: &StatsBundle) -> ReportDocument {
        let charts = ChartImages::in_dir(Path::new("/tmp/charts"));
        assemble_report("Jaguar", stats, &charts, generated_at(), &ReportSettings::default())
    }

    fn headings(doc: &ReportDocument) -> Vec<&str> {
        doc.sections
            .iter()
            .filter_map(|s| match s {
                Section::Heading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_section_order() {
        let doc = assemble(&growing());
        assert!(matches!(doc.sections.first(), Some(Section::Title { .. })));
        assert!(matches!(doc.sections.last(), Some(Section::Footer(_))));
        assert_eq!(
            headings(&doc),
            vec!["Executive Summary", "Yearly Evolution", "Distribution by Province", "Projections"]
        );
        let images = doc
            .sections
            .iter()
            .filter(|s| matches!(s, Section::Image { .. }))
            .count();
        assert_eq!(images, 2);
    }

    #[test]
    fn test_title_and_footer_carry_timestamp() {
        let doc = assemble(&growing());
        match &doc.sections[0] {
            Section::Title { title, subtitle, generated } => {
                assert_eq!(title, "Conservation Report");
                assert_eq!(subtitle, "Jaguar");
                assert_eq!(generated, "Generated: 2024-03-15 09:30:00");
            }
            other => panic!("unexpected first section: {other:?}"),
        }
        match doc.sections.last() {
            Some(Section::Footer(text)) => {
                assert!(text.contains("Endangered Species Tracker"));
                assert!(text.contains("2024-03-15 09:30:00"));
            }
            other => panic!("unexpected last section: {other:?}"),
        }
    }

    #[test]
    fn test_summary_table() {
        let doc = assemble(&growing());
        let Section::Table { rows, .. } = &doc.sections[2] else {
            panic!("summary table missing");
        };
        assert_eq!(rows[0], vec!["Total individuals", "60"]);
        assert_eq!(rows[1], vec!["Mean per record", "20"]);
        assert_eq!(rows[2], vec!["Records", "3"]);
        assert_eq!(rows[3], vec!["Trend", "significant increase"]);
    }

    #[test]
    fn test_year_table_percentages() {
        let doc = assemble(&growing());
        let Section::Table { headers, rows } = &doc.sections[5] else {
            panic!("year table missing");
        };
        assert_eq!(headers[0], "Year");
        assert_eq!(rows[0], vec!["2020", "10", "16.7%"]);
        assert_eq!(rows[2], vec!["2022", "30", "50.0%"]);
    }

    #[test]
    fn test_province_table_sorted_by_count() {
        let doc = assemble(&growing());
        let Section::Table { rows, .. } = &doc.sections[8] else {
            panic!("province table missing");
        };
        assert_eq!(rows[0], vec!["Darién", "40", "66.7%"]);
        assert_eq!(rows[1], vec!["Colón", "20", "33.3%"]);
    }

    #[test]
    fn test_projection_variation_signs() {
        let rows = projection_rows(&growing());
        assert_eq!(rows[0], vec!["2023", "40", "+10"]);
        assert_eq!(rows[1], vec!["2024", "50", "+10"]);

        let declining = stats(&[
            Record::new("Jaguar", 30, 2020, "Darién"),
            Record::new("Jaguar", 20, 2021, "Darién"),
        ]);
        let rows = projection_rows(&declining);
        assert_eq!(rows[0], vec!["2022", "10", "-10"]);
        assert_eq!(rows[1], vec!["2023", "0", "-10"]);
        assert_eq!(rows[2], vec!["2024", "0", "+0"]);
    }

    #[test]
    fn test_projection_variation_saturates_on_huge_totals() {
        let huge = i64::MAX as u64;
        let stats = stats(&[
            Record::new("Jaguar", huge, 2020, "Darién"),
            Record::new("Jaguar", huge, 2021, "Darién"),
            Record::new("Jaguar", huge, 2021, "Colón"),
        ]);
        let rows = projection_rows(&stats);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], i64::MAX.to_string());
        assert_eq!(rows[0][2], "+0");
    }

    #[test]
    fn test_insufficient_data_omits_projection_table() {
        let single = stats(&[Record::new("Jaguar", 4, 2021, "")]);
        let doc = assemble(&single);
        let projection_heading = doc
            .sections
            .iter()
            .position(|s| *s == Section::Heading("Projections".to_string()))
            .unwrap();
        let Section::Paragraph(text) = &doc.sections[projection_heading + 1] else {
            panic!("narrative missing");
        };
        assert!(text.contains("fewer than two distinct years"));
        assert!(matches!(doc.sections[projection_heading + 2], Section::Footer(_)));
    }

    #[test]
    fn test_unspecified_province_label() {
        let single = stats(&[Record::new("Jaguar", 4, 2021, "")]);
        let top = top_provinces(&single, 7);
        assert_eq!(top, vec![("(unspecified)".to_string(), 4)]);
    }

    #[test]
    fn test_top_provinces_truncates() {
        let many = stats(&[
            Record::new("Jaguar", 1, 2021, "Colón"),
            Record::new("Jaguar", 5, 2021, "Darién"),
            Record::new("Jaguar", 3, 2021, "Coclé"),
        ]);
        let top = top_provinces(&many, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "Darién");
        assert_eq!(top[1].0, "Coclé");
    }

    #[test]
    fn test_narrative_mentions_slope_and_last_projection() {
        let doc = assemble(&growing());
        let text = doc
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Paragraph(t) => Some(t.clone()),
                _ => None,
            })
            .unwrap();
        assert!(text.contains("significant increase"));
        assert!(text.contains("+10.00 individuals per year"));
        assert!(text.contains("about 60 individuals are expected by 2025"));
    }
}
