//! Archive listing, restore, and permanent deletion commands for CLI.

use clap::Subcommand;
use taskboard_core::archive;
use taskboard_core::deletion;
use taskboard_core::storage::BoardDb;

use crate::common::EntityKindArg;

#[derive(Subcommand)]
pub enum ArchiveAction {
    /// List everything archived, newest first
    List,
    /// Restore one archived item (cascades for categories/subcategories)
    Restore {
        #[arg(value_enum)]
        kind: EntityKindArg,
        id: i64,
    },
    /// Permanently delete one archived item and its subtree
    Delete {
        #[arg(value_enum)]
        kind: EntityKindArg,
        id: i64,
    },
    /// Permanently delete everything in the archive
    Purge,
}

pub fn run(action: ArchiveAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = BoardDb::open()?;

    match action {
        ArchiveAction::List => {
            let items = archive::list_archived(&db)?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        ArchiveAction::Restore { kind, id } => {
            archive::restore_item(&db, kind.into(), id)?;
            println!("Restored {id}");
        }
        ArchiveAction::Delete { kind, id } => {
            deletion::delete_item(&db, kind.into(), id)?;
            println!("Permanently deleted {id}");
        }
        ArchiveAction::Purge => {
            let items: Vec<_> = archive::list_archived(&db)?
                .into_iter()
                .map(|item| (item.kind, item.id))
                .collect();
            let outcome = deletion::bulk_permanently_delete(&db, &items);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
