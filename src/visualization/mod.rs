mod tables;
mod charts;

pub use tables::{
    format_records_table, print_records_table,
    format_species_list, print_species_list,
    format_stats_summary, print_stats_summary,
    format_province_table, print_province_table,
    format_projection_table, print_projection_table,
};
pub use charts::{format_yearly_histogram, print_yearly_histogram};
