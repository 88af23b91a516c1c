use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "taskboard-cli", version, about = "Taskboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Category management
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Subcategory management
    Subcategory {
        #[command(subcommand)]
        action: commands::subcategory::SubcategoryAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Archive listing, restore, and permanent deletion
    Archive {
        #[command(subcommand)]
        action: commands::archive::ArchiveAction,
    },
    /// Backup export and import
    Backup {
        #[command(subcommand)]
        action: commands::backup::BackupAction,
    },
    /// Configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Populate an empty board with sample data
    Seed,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Project { action } => commands::project::run(action),
        Commands::Category { action } => commands::category::run(action),
        Commands::Subcategory { action } => commands::subcategory::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Archive { action } => commands::archive::run(action),
        Commands::Backup { action } => commands::backup::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Seed => commands::seed::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
