//! Category management commands for CLI.

use clap::Subcommand;
use taskboard_core::archive;
use taskboard_core::board::{CategoryPatch, NewCategory};
use taskboard_core::deletion;
use taskboard_core::notify::UndoAction;
use taskboard_core::propagation;
use taskboard_core::storage::BoardDb;

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Create a new category under a project
    Create {
        project_id: i64,
        name: String,
        /// Sibling sort key
        #[arg(long, default_value_t = 0)]
        order: i64,
    },
    /// List a project's categories
    List { project_id: i64 },
    /// Update a category
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        order: Option<i64>,
    },
    /// Reopen a completed category
    Reopen { id: i64 },
    /// Archive the category and everything under it
    Archive { id: i64 },
    /// Restore the category and what was archived together with it
    Restore { id: i64 },
    /// Permanently delete the category and everything under it
    Delete { id: i64 },
}

pub fn run(action: CategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = BoardDb::open()?;

    match action {
        CategoryAction::Create {
            project_id,
            name,
            order,
        } => {
            db.get_project(project_id)?
                .ok_or_else(|| format!("project {project_id} not found"))?;
            let category = db.create_category(&NewCategory {
                project_id,
                name,
                order,
            })?;
            println!("Category created: {}", category.id);
            println!("{}", serde_json::to_string_pretty(&category)?);
        }
        CategoryAction::List { project_id } => {
            let categories = db.categories_for_project(project_id)?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        CategoryAction::Update { id, name, order } => {
            let category = db.update_category(id, &CategoryPatch { name, order })?;
            println!("{}", serde_json::to_string_pretty(&category)?);
        }
        CategoryAction::Reopen { id } => {
            propagation::undo(&db, UndoAction::ReopenCategory { category_id: id })?;
            println!("Category {id} reopened");
        }
        CategoryAction::Archive { id } => {
            archive::archive_category(&db, id)?;
            println!("Category {id} archived with its subtree");
        }
        CategoryAction::Restore { id } => {
            archive::restore_category(&db, id)?;
            println!("Category {id} restored");
        }
        CategoryAction::Delete { id } => {
            deletion::delete_category(&db, id)?;
            println!("Category {id} permanently deleted");
        }
    }
    Ok(())
}
