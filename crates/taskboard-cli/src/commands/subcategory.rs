//! Subcategory management commands for CLI.

use clap::Subcommand;
use taskboard_core::archive;
use taskboard_core::board::{NewSubCategory, SubCategoryPatch};
use taskboard_core::deletion;
use taskboard_core::notify::UndoAction;
use taskboard_core::propagation;
use taskboard_core::storage::BoardDb;

#[derive(Subcommand)]
pub enum SubcategoryAction {
    /// Create a new subcategory under a category
    Create {
        category_id: i64,
        name: String,
        /// Sibling sort key
        #[arg(long, default_value_t = 0)]
        order: i64,
    },
    /// List a category's subcategories
    List { category_id: i64 },
    /// Update a subcategory
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        order: Option<i64>,
    },
    /// Reopen a completed subcategory
    Reopen {
        id: i64,
        /// Also reopen this category (for undoing a joint auto-completion)
        #[arg(long)]
        with_category: Option<i64>,
    },
    /// Archive the subcategory and its tasks
    Archive { id: i64 },
    /// Restore the subcategory and what was archived together with it
    Restore { id: i64 },
    /// Permanently delete the subcategory and its tasks
    Delete { id: i64 },
}

pub fn run(action: SubcategoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = BoardDb::open()?;

    match action {
        SubcategoryAction::Create {
            category_id,
            name,
            order,
        } => {
            let category = db
                .get_category(category_id)?
                .ok_or_else(|| format!("category {category_id} not found"))?;
            let sub = db.create_sub_category(&NewSubCategory {
                category_id,
                project_id: category.project_id,
                name,
                order,
            })?;
            println!("Subcategory created: {}", sub.id);
            println!("{}", serde_json::to_string_pretty(&sub)?);
        }
        SubcategoryAction::List { category_id } => {
            let subs = db.sub_categories_for_category(category_id)?;
            println!("{}", serde_json::to_string_pretty(&subs)?);
        }
        SubcategoryAction::Update { id, name, order } => {
            let sub = db.update_sub_category(id, &SubCategoryPatch { name, order })?;
            println!("{}", serde_json::to_string_pretty(&sub)?);
        }
        SubcategoryAction::Reopen { id, with_category } => {
            propagation::undo(
                &db,
                UndoAction::ReopenSubCategory {
                    sub_category_id: id,
                    category_id: with_category,
                },
            )?;
            println!("Subcategory {id} reopened");
        }
        SubcategoryAction::Archive { id } => {
            archive::archive_sub_category(&db, id)?;
            println!("Subcategory {id} archived with its tasks");
        }
        SubcategoryAction::Restore { id } => {
            archive::restore_sub_category(&db, id)?;
            println!("Subcategory {id} restored");
        }
        SubcategoryAction::Delete { id } => {
            deletion::delete_sub_category(&db, id)?;
            println!("Subcategory {id} permanently deleted");
        }
    }
    Ok(())
}
