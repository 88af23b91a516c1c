//! Backup export and import commands for CLI.

use std::path::PathBuf;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use taskboard_core::backup::{self, ImportMode};
use taskboard_core::storage::BoardDb;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportModeArg {
    /// Replace everything with the snapshot, keeping its ids
    Overwrite,
    /// Keep existing data and insert the snapshot under fresh ids
    Merge,
}

impl From<ImportModeArg> for ImportMode {
    fn from(arg: ImportModeArg) -> Self {
        match arg {
            ImportModeArg::Overwrite => ImportMode::Overwrite,
            ImportModeArg::Merge => ImportMode::Merge,
        }
    }
}

#[derive(Subcommand)]
pub enum BackupAction {
    /// Export the whole board to a JSON snapshot file
    Export {
        /// Output path (defaults to ./taskboard-backup-<date>.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a snapshot file
    Import {
        path: PathBuf,
        #[arg(long, value_enum)]
        mode: ImportModeArg,
    },
}

pub fn run(action: BackupAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = BoardDb::open()?;

    match action {
        BackupAction::Export { out } => {
            let path =
                out.unwrap_or_else(|| PathBuf::from(backup::default_export_file_name(Utc::now())));
            backup::export_to_file(&db, &path)?;
            println!("Exported to {}", path.display());
        }
        BackupAction::Import { path, mode } => {
            let summary = backup::import_from_file(&db, &path, mode.into())?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
