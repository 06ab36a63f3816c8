//! Command-line definition and command execution.
//!
//! `main` parses [`Cli`], loads [`AppConfig`], initializes logging and hands
//! the command to [`App::run`], which returns the text to print.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ro_tax_core::db::{DbConfig, RepositoryRegistry};
use ro_tax_core::validation::{validate_deductions, validate_year};
use ro_tax_core::{
    DeductionSet, IncomeAggregator, NewWorkDay, TaxCalculationInput, TaxEngine, WorkDayRepository,
};
use ro_tax_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::report;
use crate::utils::parse_decimal;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Romanian personal income tax calculator.
///
/// Computes income tax, health insurance (CASS) and social insurance (CAS)
/// for a yearly gross income, either given directly or derived from the
/// work days recorded in the database.
#[derive(Debug, Parser)]
#[command(name = "ro-tax", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./ro-tax.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database backend to use.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `work_days.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log level or filter directive (overridden by RUST_LOG).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Calculate taxes for a known gross income.
    Calculate(CalculateArgs),
    /// Calculate taxes on the income recorded as work days.
    WorkDays(WorkDaysArgs),
    /// Print the gross income recorded for a year.
    GrossIncome(YearArgs),
    /// Monthly breakdown of recorded income.
    Summary(YearArgs),
    /// Record a work day.
    AddWorkDay(AddWorkDayArgs),
    /// List recorded work days.
    ListWorkDays(ListWorkDaysArgs),
    /// Change fields of a recorded work day.
    UpdateWorkDay(UpdateWorkDayArgs),
    /// Delete a recorded work day.
    DeleteWorkDay(DeleteWorkDayArgs),
}

/// Deduction amounts, all optional. Omitting `--personal-deduction` applies
/// the statutory default.
#[derive(Debug, Clone, Default, Args)]
pub struct DeductionArgs {
    #[arg(long, value_parser = parse_decimal)]
    pub personal_deduction: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub professional_deductions: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub health_insurance_deductions: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub social_insurance_deductions: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub voluntary_pension_deductions: Option<Decimal>,
}

impl From<DeductionArgs> for DeductionSet {
    fn from(args: DeductionArgs) -> Self {
        DeductionSet {
            personal_deduction: args.personal_deduction,
            professional_deductions: args.professional_deductions,
            health_insurance_deductions: args.health_insurance_deductions,
            social_insurance_deductions: args.social_insurance_deductions,
            voluntary_pension_deductions: args.voluntary_pension_deductions,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct CalculateArgs {
    /// Yearly gross income in RON (accepts `1,234.56`).
    #[arg(long, value_parser = parse_decimal)]
    pub gross_income: Decimal,

    #[arg(long, default_value_t = 2024)]
    pub year: i32,

    #[command(flatten)]
    pub deductions: DeductionArgs,

    /// The taxpayer has no health insurance card.
    #[arg(long)]
    pub no_health_card: bool,

    /// The taxpayer lives in a rural area.
    #[arg(long)]
    pub rural: bool,

    /// Output as JSON instead of formatted text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct WorkDaysArgs {
    #[arg(long)]
    pub year: i32,

    #[command(flatten)]
    pub deductions: DeductionArgs,

    /// Output as JSON instead of formatted text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct YearArgs {
    #[arg(long)]
    pub year: i32,

    /// Output as JSON instead of formatted text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct AddWorkDayArgs {
    /// Calendar day, YYYY-MM-DD.
    #[arg(long)]
    pub date: NaiveDate,

    #[arg(long, value_parser = parse_decimal)]
    pub hours: Decimal,

    /// Hourly rate in RON.
    #[arg(long, value_parser = parse_decimal)]
    pub rate: Decimal,

    #[arg(long)]
    pub notes: Option<String>,
}

/// Only the given fields change.
#[derive(Debug, Clone, Args)]
pub struct UpdateWorkDayArgs {
    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long, value_parser = parse_decimal)]
    pub hours: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub rate: Option<Decimal>,

    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,

    /// Remove the notes.
    #[arg(long)]
    pub clear_notes: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ListWorkDaysArgs {
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Args)]
pub struct DeleteWorkDayArgs {
    #[arg(long)]
    pub id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GrossIncomeOutput {
    year: i32,
    gross_income: Decimal,
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    text.push('\n');
    Ok(text)
}

// ─── execution ───────────────────────────────────────────────────────────────

/// Hours and rate must be positive and their product representable.
fn check_work_day(
    hours: Decimal,
    rate: Decimal,
) -> Result<()> {
    anyhow::ensure!(hours > Decimal::ZERO, "hours must be positive, got {hours}");
    anyhow::ensure!(rate > Decimal::ZERO, "hourly rate must be positive, got {rate}");
    anyhow::ensure!(
        hours.checked_mul(rate).is_some(),
        "earnings for {hours} hours at {rate} are too large to represent"
    );
    Ok(())
}

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Database settings from the config file, overridden by `--backend`/`--db`.
pub fn resolve_db_config(
    cli: &Cli,
    config: &AppConfig,
) -> DbConfig {
    DbConfig {
        backend: cli
            .backend
            .clone()
            .unwrap_or_else(|| config.database.backend.clone()),
        connection_string: cli
            .db
            .clone()
            .unwrap_or_else(|| config.database.connection_string.clone()),
    }
}

pub struct App {
    engine: TaxEngine,
    registry: RepositoryRegistry,
    db_config: DbConfig,
}

impl App {
    pub fn new(
        engine: TaxEngine,
        registry: RepositoryRegistry,
        db_config: DbConfig,
    ) -> Self {
        Self {
            engine,
            registry,
            db_config,
        }
    }

    /// Builds the engine from the config's rule book and the default
    /// registry.
    pub fn from_config(
        config: &AppConfig,
        db_config: DbConfig,
    ) -> Result<Self> {
        let engine = TaxEngine::new(config.rule_book().context("failed to build tax rule book")?);
        debug!(years = ?engine.rules().years(), "tax rule book ready");
        Ok(Self::new(engine, build_registry(), db_config))
    }

    /// Runs `command` and returns the text to print.
    ///
    /// `calculate` never opens the database; every other command does.
    pub async fn run(
        &self,
        command: Command,
    ) -> Result<String> {
        if let Command::Calculate(args) = command {
            return self.calculate(args);
        }

        debug!(backend = %self.db_config.backend, "opening repository");
        let repo = self
            .registry
            .create(&self.db_config)
            .await
            .with_context(|| format!("failed to open '{}' database", self.db_config.backend))?;

        self.run_with_repository(&*repo, command).await
    }

    pub async fn run_with_repository(
        &self,
        repo: &dyn WorkDayRepository,
        command: Command,
    ) -> Result<String> {
        let aggregator = IncomeAggregator::new(repo, &self.engine);

        match command {
            Command::Calculate(args) => self.calculate(args),
            Command::WorkDays(args) => {
                validate_year(args.year)?;
                let deductions = DeductionSet::from(args.deductions);
                validate_deductions(&deductions)?;

                let result = aggregator
                    .calculate_taxes_from_work_days(args.year, Some(deductions))
                    .await?;
                info!(year = args.year, gross_income = %result.gross_income, "calculated taxes from work days");

                if args.json {
                    to_json(&result)
                } else {
                    Ok(report::render_calculation(&result, args.year))
                }
            }
            Command::GrossIncome(args) => {
                let gross_income = aggregator.get_yearly_gross_income(args.year).await?;

                if args.json {
                    to_json(&GrossIncomeOutput {
                        year: args.year,
                        gross_income,
                    })
                } else {
                    Ok(report::render_gross_income(args.year, gross_income))
                }
            }
            Command::Summary(args) => {
                let summary = aggregator.yearly_income_summary(args.year).await?;

                if args.json {
                    to_json(&summary)
                } else {
                    Ok(report::render_summary(&summary))
                }
            }
            Command::AddWorkDay(args) => {
                check_work_day(args.hours, args.rate)?;

                let work_day = repo
                    .create_work_day(NewWorkDay {
                        date: args.date,
                        hours_worked: args.hours,
                        hourly_rate: args.rate,
                        notes: args.notes,
                    })
                    .await?;
                info!(id = work_day.id, date = %work_day.date, "recorded work day");

                Ok(report::render_work_days(std::slice::from_ref(&work_day)))
            }
            Command::UpdateWorkDay(args) => {
                let mut work_day = repo
                    .get_work_day(args.id)
                    .await
                    .with_context(|| format!("failed to load work day {}", args.id))?;

                if let Some(date) = args.date {
                    work_day.date = date;
                }
                if let Some(hours) = args.hours {
                    work_day.hours_worked = hours;
                }
                if let Some(rate) = args.rate {
                    work_day.hourly_rate = rate;
                }
                if args.clear_notes {
                    work_day.notes = None;
                } else if let Some(notes) = args.notes {
                    work_day.notes = Some(notes);
                }
                check_work_day(work_day.hours_worked, work_day.hourly_rate)?;

                repo.update_work_day(&work_day)
                    .await
                    .with_context(|| format!("failed to update work day {}", args.id))?;
                info!(id = args.id, date = %work_day.date, "updated work day");

                let updated = repo.get_work_day(args.id).await?;
                Ok(report::render_work_days(std::slice::from_ref(&updated)))
            }
            Command::ListWorkDays(args) => {
                let work_days = repo.list_work_days(args.year).await?;
                Ok(report::render_work_days(&work_days))
            }
            Command::DeleteWorkDay(args) => {
                repo.delete_work_day(args.id)
                    .await
                    .with_context(|| format!("failed to delete work day {}", args.id))?;
                info!(id = args.id, "deleted work day");
                Ok(format!("Deleted work day {}.\n", args.id))
            }
        }
    }

    fn calculate(
        &self,
        args: CalculateArgs,
    ) -> Result<String> {
        let input = TaxCalculationInput {
            gross_income: args.gross_income,
            year: args.year,
            deductions: args.deductions.into(),
            has_health_card: !args.no_health_card,
            is_urban_area: !args.rural,
        };

        let result = self.engine.calculate(&input)?;
        info!(year = input.year, gross_income = %input.gross_income, "calculated taxes");

        if args.json {
            to_json(&result)
        } else {
            Ok(report::render_calculation(&result, input.year))
        }
    }
}
