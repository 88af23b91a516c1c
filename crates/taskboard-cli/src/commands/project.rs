//! Project management commands for CLI.

use clap::Subcommand;
use taskboard_core::archive;
use taskboard_core::board::{NewProject, ProjectPatch};
use taskboard_core::deletion;
use taskboard_core::progress;
use taskboard_core::storage::{BoardDb, Config};

use crate::common::ProjectStatusArg;

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
        /// Display color (defaults to the configured project color)
        #[arg(long)]
        color: Option<String>,
    },
    /// List projects (active only unless --all)
    List {
        /// Include archived projects
        #[arg(long)]
        all: bool,
    },
    /// Show a project with its progress overview
    Show { id: i64 },
    /// Update a project
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatusArg>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Move a project to the archive
    Archive { id: i64 },
    /// Restore a project from the archive
    Restore { id: i64 },
    /// Permanently delete a project and everything under it
    Delete { id: i64 },
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = BoardDb::open()?;

    match action {
        ProjectAction::Create {
            name,
            description,
            color,
        } => {
            let config = Config::load()?;
            let project = db.create_project(&NewProject {
                name,
                description,
                status: taskboard_core::ProjectStatus::Active,
                color: color.unwrap_or(config.ui.default_project_color),
            })?;
            println!("Project created: {}", project.id);
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::List { all } => {
            let mut projects = db.list_projects()?;
            if !all {
                projects.retain(|p| p.archived_at.is_none());
            }
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        ProjectAction::Show { id } => {
            let project = db
                .get_project(id)?
                .ok_or_else(|| format!("project {id} not found"))?;
            let overview = progress::project_overview(&db, id)?;
            println!("{}", serde_json::to_string_pretty(&project)?);
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        ProjectAction::Update {
            id,
            name,
            description,
            status,
            color,
        } => {
            let project = db.update_project(
                id,
                &ProjectPatch {
                    name,
                    description,
                    status: status.map(Into::into),
                    color,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::Archive { id } => {
            archive::archive_project(&db, id)?;
            println!("Project {id} archived");
        }
        ProjectAction::Restore { id } => {
            archive::restore_project(&db, id)?;
            println!("Project {id} restored");
        }
        ProjectAction::Delete { id } => {
            deletion::delete_project(&db, id)?;
            println!("Project {id} permanently deleted");
        }
    }
    Ok(())
}
