use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use species_tracker::{
    visualization::{
        print_projection_table, print_province_table, print_records_table, print_species_list,
        print_stats_summary, print_yearly_histogram,
    },
    Analyzer, DatasetManager, Record, RecordDraft, ReportGenerator, SpeciesSelection,
    TrackerConfig, TrackerError,
};

#[derive(Parser)]
#[command(
    name = "species-tracker",
    about = "Endangered Species Tracker - population records, trends and conservation reports",
    version,
    author
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the species present in a dataset
    List {
        /// Path to the dataset (CSV or Excel)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show records with their indices
    Show {
        #[arg(short, long)]
        input: PathBuf,

        /// Only show records of this species
        #[arg(short, long)]
        species: Option<String>,
    },

    /// Add a record
    Add {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        species: String,

        #[arg(long)]
        count: String,

        #[arg(long)]
        year: String,

        #[arg(long, default_value = "")]
        province: String,

        /// Save to this file instead of the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Modify the record at an index; omitted fields keep their value
    Modify {
        #[arg(short, long)]
        input: PathBuf,

        /// Zero-based record index, as printed by `show`
        #[arg(long)]
        index: usize,

        #[arg(long)]
        species: Option<String>,

        #[arg(long)]
        count: Option<String>,

        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        province: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete the record at an index
    Delete {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        index: usize,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Statistics, trend and projections for one species
    Stats {
        #[arg(short, long)]
        input: PathBuf,

        /// Species name or its position in `list`
        #[arg(short, long)]
        species: String,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a PDF conservation report for one species
    Report {
        #[arg(short, long)]
        input: PathBuf,

        /// Species name or its position in `list`
        #[arg(short, long)]
        species: String,

        /// Directory for the report (defaults to the configured one)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Use a stable file name without a timestamp suffix
        #[arg(long)]
        no_timestamp: bool,
    },

    /// Convert a dataset between spreadsheet formats
    Convert {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    match path {
        Some(path) => Ok(TrackerConfig::from_file(path)?),
        None => Ok(TrackerConfig::default()),
    }
}

fn open_dataset(config: &TrackerConfig, input: &Path) -> Result<DatasetManager> {
    let mut manager = DatasetManager::from_config(config);
    let count = manager.load(input)?;
    tracing::debug!(records = count, "dataset opened");
    Ok(manager)
}

fn save_dataset(manager: &mut DatasetManager, output: Option<&Path>) -> Result<()> {
    manager.save(output)?;
    if let Some(path) = manager.path() {
        println!("{} Saved {}", "Success:".green().bold(), path.display());
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List { input } => {
            let manager = open_dataset(&config, &input)?;
            print_species_list(&manager.list_species());
        }

        Commands::Show { input, species } => {
            let manager = open_dataset(&config, &input)?;
            let wanted = species.as_deref().map(str::trim);
            let rows: Vec<(usize, &Record)> = manager
                .records()
                .iter()
                .enumerate()
                .filter(|(_, r)| wanted.map_or(true, |name| r.species == name))
                .collect();
            print_records_table(&rows);
        }

        Commands::Add {
            input,
            species,
            count,
            year,
            province,
            output,
        } => {
            let mut manager = open_dataset(&config, &input)?;
            let draft = RecordDraft::new(species, count, year, province);
            manager.add_record(&draft)?;
            println!("  Added record at index {}", manager.len() - 1);
            save_dataset(&mut manager, output.as_deref())?;
        }

        Commands::Modify {
            input,
            index,
            species,
            count,
            year,
            province,
            output,
        } => {
            let mut manager = open_dataset(&config, &input)?;
            let current = manager.get(index).ok_or(TrackerError::Index {
                index,
                len: manager.len(),
            })?;
            let mut draft = RecordDraft::from(current);
            if let Some(v) = species {
                draft.species = v;
            }
            if let Some(v) = count {
                draft.count = v;
            }
            if let Some(v) = year {
                draft.year = v;
            }
            if let Some(v) = province {
                draft.province = v;
            }
            manager.modify_record(index, &draft)?;
            println!("  Modified record {index}");
            save_dataset(&mut manager, output.as_deref())?;
        }

        Commands::Delete {
            input,
            index,
            yes,
            output,
        } => {
            let mut manager = open_dataset(&config, &input)?;
            let request = manager.request_delete(index)?;
            println!("  Record {index}: {}", request.record());
            if !yes && !confirm("Delete this record?")? {
                println!("  Cancelled.");
                return Ok(());
            }
            manager.confirm_delete(request)?;
            println!("  Deleted record {index}");
            save_dataset(&mut manager, output.as_deref())?;
        }

        Commands::Stats {
            input,
            species,
            json,
        } => {
            let manager = open_dataset(&config, &input)?;
            let name = SpeciesSelection::from_manager(&manager)?.resolve(&species)?;
            let stats = Analyzer::for_species(&manager, &name, &config.analysis).statistics()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "\n{}",
                    format!("Population Analysis: {name}").bold().cyan()
                );
                print_stats_summary(&name, &stats);
                print_yearly_histogram(&stats);
                print_province_table(&stats);
                print_projection_table(&stats);
            }
        }

        Commands::Report {
            input,
            species,
            output_dir,
            no_timestamp,
        } => {
            let manager = open_dataset(&config, &input)?;
            let name = SpeciesSelection::from_manager(&manager)?.resolve(&species)?;
            let stats = Analyzer::for_species(&manager, &name, &config.analysis).statistics()?;

            let mut settings = config.report.clone();
            if no_timestamp {
                settings.timestamp_suffix = false;
            }
            let dir = output_dir.unwrap_or_else(|| settings.output_dir.clone());
            let path = ReportGenerator::new(settings).generate(&name, &stats, &dir)?;

            println!(
                "{} Report written to {}",
                "Success:".green().bold(),
                path.display()
            );
        }

        Commands::Convert { input, output } => {
            let mut manager = open_dataset(&config, &input)?;
            manager.save(Some(output.as_path()))?;
            println!(
                "{} Converted {} -> {}",
                "Success:".green().bold(),
                input.display(),
                output.display()
            );
        }
    }

    Ok(())
}
