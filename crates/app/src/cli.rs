use std::path::PathBuf;

use clap::{Parser, Subcommand};

use services::{DEFAULT_USER, TrainerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "cli-trainer",
    version,
    about = "Interactive trainer for command-line skills"
)]
pub struct Cli {
    /// Catalog of modules, tests and scenarios.
    #[arg(long, env = "TRAINER_CATALOG", default_value = "training_data.json", global = true)]
    pub catalog: PathBuf,

    /// Progress file shared by every user.
    #[arg(long, env = "TRAINER_PROGRESS", default_value = "user_progress.json", global = true)]
    pub progress: PathBuf,

    /// Text event log.
    #[arg(long = "log-file", env = "TRAINER_LOG", default_value = "training_log.txt", global = true)]
    pub log_file: PathBuf,

    /// Write a report file per session into this directory.
    #[arg(long, env = "TRAINER_REPORT_DIR", global = true)]
    pub report_dir: Option<PathBuf>,

    /// Sign in as this user instead of asking.
    #[arg(long, env = "TRAINER_USER")]
    pub user: Option<String>,

    /// Name used when none is entered.
    #[arg(long, env = "TRAINER_DEFAULT_USER", default_value = DEFAULT_USER)]
    pub default_user: String,

    /// Debug-level diagnostics on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the interactive trainer (default).
    Run,
    /// Print a user's progress report and exit.
    Stats {
        #[arg(long)]
        user: String,
    },
    /// Load and validate the catalog.
    CheckCatalog,
}

impl Cli {
    #[must_use]
    pub fn config(&self) -> TrainerConfig {
        TrainerConfig {
            catalog_path: self.catalog.clone(),
            progress_path: self.progress.clone(),
            log_path: Some(self.log_file.clone()),
            report_dir: self.report_dir.clone(),
            default_user: self.default_user.clone(),
        }
    }
}
