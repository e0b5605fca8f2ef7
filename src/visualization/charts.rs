use colored::Colorize;

use crate::analysis::StatsBundle;

/// Format a text histogram of yearly totals, followed by projected years.
pub fn format_yearly_histogram(stats: &StatsBundle) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Yearly Evolution".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if stats.count_by_year.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let observed_max = stats.count_by_year.values().copied().max().unwrap_or(0) as f64;
    let projected_max = stats
        .projections
        .iter()
        .map(|p| p.count.max(0) as f64)
        .fold(0.0f64, f64::max);
    let max = observed_max.max(projected_max);

    let bar_width = 40;
    let bar = |value: f64| {
        let len = if max > 0.0 {
            ((value / max) * bar_width as f64).round() as usize
        } else {
            0
        };
        "\u{2588}".repeat(len)
    };

    output.push_str(&format!("  {:>6}  {:>10}  Distribution\n", "Year", "Count"));
    output.push_str(&format!("  {}\n", "-".repeat(60)));

    for (year, count) in &stats.count_by_year {
        output.push_str(&format!(
            "  {:>6}  {:>10}  {}\n",
            year,
            count,
            bar(*count as f64).green()
        ));
    }
    for projection in &stats.projections {
        output.push_str(&format!(
            "  {:>6}  {:>10}  {}\n",
            format!("{}*", projection.year),
            projection.count,
            bar(projection.count.max(0) as f64).blue()
        ));
    }
    if !stats.projections.is_empty() {
        output.push_str(&format!("  {}\n", "* projected".dimmed()));
    }

    output.push('\n');
    output
}

/// Print a text histogram of yearly totals.
pub fn print_yearly_histogram(stats: &StatsBundle) {
    print!("{}", format_yearly_histogram(stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compute_statistics, AnalysisSettings};
    use crate::models::Record;

    #[test]
    fn test_format_histogram_with_projections() {
        let stats = compute_statistics(
            &[
                Record::new("Jaguar", 10, 2020, "Darién"),
                Record::new("Jaguar", 20, 2021, "Darién"),
            ],
            &AnalysisSettings::default(),
        )
        .unwrap();
        let output = format_yearly_histogram(&stats);
        assert!(output.contains("Yearly Evolution"));
        assert!(output.contains("2020"));
        assert!(output.contains("2022*"));
        assert!(output.contains("* projected"));
        assert!(output.contains('\u{2588}'));
    }

    #[test]
    fn test_format_histogram_all_zero() {
        let stats = compute_statistics(
            &[Record::new("Jaguar", 0, 2020, "Darién")],
            &AnalysisSettings::default(),
        )
        .unwrap();
        let output = format_yearly_histogram(&stats);
        assert!(output.contains("2020"));
        assert!(!output.contains('\u{2588}'));
        assert!(!output.contains("projected"));
    }
}
