use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::StatsBundle;
use crate::models::Record;
use crate::report::projection_rows;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn section_title(output: &mut String, title: &str, width: usize) {
    output.push_str(&format!("\n{}\n", title.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(width)));
}

/// Format dataset records with their positional indices.
pub fn format_records_table(records: &[(usize, &Record)]) -> String {
    let mut output = String::new();
    section_title(&mut output, "Records", 60);

    if records.is_empty() {
        output.push_str("  No records.\n");
        return output;
    }

    let mut table = new_table(vec!["Index", "Species", "Count", "Year", "Province"]);
    for (index, record) in records {
        table.add_row(vec![
            Cell::new(index),
            Cell::new(&record.species),
            Cell::new(record.count),
            Cell::new(record.year),
            Cell::new(&record.province),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print dataset records with their positional indices.
pub fn print_records_table(records: &[(usize, &Record)]) {
    print!("{}", format_records_table(records));
}

/// Format the numbered species list used for selection.
pub fn format_species_list(species: &[String]) -> String {
    let mut output = String::new();
    section_title(&mut output, "Species", 40);

    if species.is_empty() {
        output.push_str("  No species recorded.\n");
        return output;
    }

    let mut table = new_table(vec!["#", "Species"]);
    for (i, name) in species.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(name)]);
    }

    output.push_str(&format!("{table}"));
    output
}

pub fn print_species_list(species: &[String]) {
    print!("{}", format_species_list(species));
}

/// Format the headline statistics for one species.
pub fn format_stats_summary(species: &str, stats: &StatsBundle) -> String {
    let mut output = String::new();
    section_title(&mut output, &format!("Summary: {species}"), 50);

    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total individuals"), Cell::new(stats.total)]);
    table.add_row(vec![Cell::new("Records"), Cell::new(stats.record_count)]);
    table.add_row(vec![
        Cell::new("Mean per record"),
        Cell::new(format!("{} ({:.2})", stats.mean_rounded, stats.mean)),
    ]);
    table.add_row(vec![
        Cell::new("Std deviation"),
        Cell::new(format!("{:.2}", stats.std_dev)),
    ]);
    table.add_row(vec![
        Cell::new("Min / Max"),
        Cell::new(format!("{} / {}", stats.min_count, stats.max_count)),
    ]);
    table.add_row(vec![Cell::new("Trend"), Cell::new(&stats.trend)]);
    if let Some(fit) = stats.trend.fit() {
        table.add_row(vec![
            Cell::new("Slope"),
            Cell::new(format!("{:+.2} per year", fit.slope)),
        ]);
        table.add_row(vec![
            Cell::new("R-squared"),
            Cell::new(format!("{:.3}", fit.r_squared)),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

pub fn print_stats_summary(species: &str, stats: &StatsBundle) {
    print!("{}", format_stats_summary(species, stats));
}

/// Format the per-province totals, largest first.
pub fn format_province_table(stats: &StatsBundle) -> String {
    let mut output = String::new();
    section_title(&mut output, "Distribution by Province", 50);

    let mut table = new_table(vec!["Province", "Individuals", "% of total"]);
    for (name, count) in stats.provinces_by_count() {
        let label = if name.is_empty() {
            "(unspecified)".dimmed().to_string()
        } else {
            name
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count),
            Cell::new(format!("{:.1}%", stats.share_of_total(count))),
        ]);
    }

    output.push_str(&format!("{table}"));
    output
}

pub fn print_province_table(stats: &StatsBundle) {
    print!("{}", format_province_table(stats));
}

/// Format projected counts with their variation against the prior period.
pub fn format_projection_table(stats: &StatsBundle) -> String {
    let mut output = String::new();
    section_title(&mut output, "Projections", 50);

    if stats.projections.is_empty() {
        output.push_str(&format!(
            "  {}\n",
            "Not enough distinct years to project.".yellow()
        ));
        return output;
    }

    let mut table = new_table(vec!["Year", "Projected", "Variation"]);
    for row in projection_rows(stats) {
        table.add_row(row);
    }

    output.push_str(&format!("{table}"));
    output
}

pub fn print_projection_table(stats: &StatsBundle) {
    print!("{}", format_projection_table(stats));
}
