use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ro_tax_data::WorkDayLoader;
use ro_tax_db_sqlite::SqliteRepository;

/// Load work days from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - date: The calendar day (YYYY-MM-DD)
/// - hours_worked: Hours billed that day (positive)
/// - hourly_rate: Rate for those hours (positive)
/// - notes: Free text (optional column, may be empty)
///
/// Work days already stored on a date present in the file are replaced.
#[derive(Parser, Debug)]
#[command(name = "work-day-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing work day data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:work_days.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:work_days.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    println!("Loading work days from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = WorkDayLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let inserted = WorkDayLoader::load(&repo, &records)
        .await
        .context("Failed to load work days into database")?;

    println!("Successfully loaded {} work days into the database.", inserted);

    Ok(())
}
