pub mod classify;
pub mod report;

use std::{env, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use classify::{ClassifyCommand, process_classify_command};
use report::{process_report_command, ReportCommand};
use tokio::io;
use tracing::level_filters::LevelFilter;

use crate::utils::logging::enable_logging;

#[derive(Parser, Debug)]
#[command(name = "Dayfold", version, long_about = None)]
#[command(
    about = "Folds captured app and browser activity into categorized daily reports",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Fold one day's captures into a record and a daily note")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Categorize a single app or url without touching any captures")]
    Classify {
        #[command(flatten)]
        command: ClassifyCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&create_application_default_path()?, logging_level, args.log)?;

    match args.commands {
        Commands::Report { command } => process_report_command(command).await,
        Commands::Classify { command } => process_classify_command(command),
    }
}

pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path =
                PathBuf::from(env::var("APPDATA").expect("APPDATA should be present on Windows"));
            path.push("dayfold");
            path
        }
        #[cfg(target_os = "macos")]
        {
            let mut path = PathBuf::from(env::var("HOME").expect("HOME should be present on macOS"));
            path.push("Library/Application Support");
            path.push("dayfold");
            path
        }
        #[cfg(target_os = "linux")]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
            path.push("dayfold");
            path
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
