use std::{fmt::Display, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    config::ActivityConfig,
    pipeline::fold_day,
    report::{print_summary, write_artifacts},
    sources::FsCaptureStore,
    utils::clock::DefaultClock,
};

use super::{Args, create_application_default_path};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(
        long,
        short,
        help = "Day to fold. Examples are \"yesterday\", \"last friday\", \"15/03/2025\". Defaults to today"
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long,
        help = "Directory holding the capture files. By default <state dir>/captures"
    )]
    data_dir: Option<PathBuf>,
    #[arg(
        long,
        help = "Directory the record and note are written into. By default <state dir>/reports"
    )]
    out_dir: Option<PathBuf>,
    #[arg(
        long,
        help = "Json file overriding the category, weight and search-engine tables"
    )]
    rules: Option<PathBuf>,
}

/// Command to process `report` command: fold the captures for one day and
/// persist the record and the note.
pub async fn process_report_command(
    ReportCommand {
        date,
        date_style,
        data_dir,
        out_dir,
        rules,
    }: ReportCommand,
) -> Result<()> {
    let date = parse_report_date(date, date_style)?;

    let config =
        ActivityConfig::load_or_default(rules.as_deref()).context("configuration is invalid")?;

    let default_dir = create_application_default_path()?;
    let data_dir = data_dir.unwrap_or_else(|| default_dir.join("captures"));
    let out_dir = out_dir.unwrap_or_else(|| default_dir.join("reports"));

    let store = FsCaptureStore::new(data_dir)?;
    let record = fold_day(&store, &config, &DefaultClock, date).await;

    let paths = write_artifacts(&out_dir, &record).await?;
    print_summary(&record);
    println!("wrote {} and {}", paths.record.display(), paths.note.display());
    Ok(())
}

fn parse_report_date(date: Option<String>, date_style: DateStyle) -> Result<Option<NaiveDate>> {
    let Some(date) = date else {
        return Ok(None);
    };
    match parse_date_string(&date, Local::now(), date_style.into()) {
        Ok(v) => Ok(Some(v.date_naive())),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
    }
}
