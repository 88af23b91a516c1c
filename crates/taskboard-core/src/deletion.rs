//! Cascade deletion service.
//!
//! Permanent removal of an entity and every descendant, history rows first
//! so no orphaned row is visible mid-transaction:
//! history → tasks → subcategories → categories → root. Irreversible.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::EntityKind;
use crate::error::{Error, Result};
use crate::storage::BoardDb;

/// Permanently delete a project and its whole subtree.
pub fn delete_project(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_project(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Project,
            id,
        })?;
        for task in db.tasks_for_project(id)? {
            db.delete_history_for_task(task.id)?;
        }
        let tasks = db.delete_tasks_for_project(id)?;
        let subs = db.delete_sub_categories_for_project(id)?;
        let categories = db.delete_categories_for_project(id)?;
        db.delete_project_row(id)?;
        debug!(project = id, categories, subs, tasks, "deleted project subtree");
        Ok(())
    })
}

/// Permanently delete a category, its subcategories, tasks, and history.
pub fn delete_category(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Category,
            id,
        })?;
        for task in db.tasks_for_category(id)? {
            db.delete_history_for_task(task.id)?;
        }
        let tasks = db.delete_tasks_for_category(id)?;
        let subs = db.delete_sub_categories_for_category(id)?;
        db.delete_category_row(id)?;
        debug!(category = id, subs, tasks, "deleted category subtree");
        Ok(())
    })
}

/// Permanently delete a subcategory, its tasks, and their history.
pub fn delete_sub_category(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_sub_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::SubCategory,
            id,
        })?;
        for task in db.tasks_for_sub_category(id)? {
            db.delete_history_for_task(task.id)?;
        }
        let tasks = db.delete_tasks_for_sub_category(id)?;
        db.delete_sub_category_row(id)?;
        debug!(sub_category = id, tasks, "deleted subcategory subtree");
        Ok(())
    })
}

/// Permanently delete a task and its history.
pub fn delete_task(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_task(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Task,
            id,
        })?;
        db.delete_history_for_task(id)?;
        db.delete_task_row(id)?;
        Ok(())
    })
}

/// Permanently delete any entity by kind.
pub fn delete_item(db: &BoardDb, kind: EntityKind, id: i64) -> Result<()> {
    match kind {
        EntityKind::Project => delete_project(db, id),
        EntityKind::Category => delete_category(db, id),
        EntityKind::SubCategory => delete_sub_category(db, id),
        EntityKind::Task => delete_task(db, id),
    }
}

/// One item the bulk deletion could not remove.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteFailure {
    pub kind: EntityKind,
    pub id: i64,
    pub reason: String,
}

/// Result of a bulk permanent deletion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteOutcome {
    pub deleted: usize,
    pub failed: Vec<BulkDeleteFailure>,
}

/// Delete a heterogeneous list of items one by one.
///
/// A failing item is recorded and the batch continues; each item still
/// deletes its own subtree atomically.
pub fn bulk_permanently_delete(db: &BoardDb, items: &[(EntityKind, i64)]) -> BulkDeleteOutcome {
    let mut outcome = BulkDeleteOutcome::default();
    for &(kind, id) in items {
        match delete_item(db, kind, id) {
            Ok(()) => outcome.deleted += 1,
            Err(err) => outcome.failed.push(BulkDeleteFailure {
                kind,
                id,
                reason: err.to_string(),
            }),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{
        NewCategory, NewProject, NewSubCategory, NewTask, ProjectStatus, TaskPriority, TaskStatus,
    };
    use chrono::Utc;

    fn seed(db: &BoardDb) -> (i64, i64, i64, i64) {
        let project = db
            .create_project(&NewProject {
                name: "Driver".to_string(),
                description: String::new(),
                status: ProjectStatus::Active,
                color: String::new(),
            })
            .unwrap();
        let category = db
            .create_category(&NewCategory {
                project_id: project.id,
                name: "Implementation".to_string(),
                order: 0,
            })
            .unwrap();
        let sub = db
            .create_sub_category(&NewSubCategory {
                category_id: category.id,
                project_id: project.id,
                name: "Socket IO".to_string(),
                order: 0,
            })
            .unwrap();
        let task = db
            .create_task(&NewTask {
                sub_category_id: sub.id,
                category_id: category.id,
                project_id: project.id,
                title: "Implement connect".to_string(),
                description: String::new(),
                status: TaskStatus::Todo,
                priority: TaskPriority::Medium,
                assignee: String::new(),
                due_date: String::new(),
                progress: 0,
                checklist: Vec::new(),
            })
            .unwrap();
        db.add_history(task.id, "status", "\"TODO\"", "\"DONE\"", Utc::now())
            .unwrap();
        (project.id, category.id, sub.id, task.id)
    }

    #[test]
    fn delete_task_removes_history_first() {
        let db = BoardDb::open_memory().unwrap();
        let (.., task) = seed(&db);

        delete_task(&db, task).unwrap();
        assert!(db.get_task(task).unwrap().is_none());
        assert!(db.history_for_task(task).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let db = BoardDb::open_memory().unwrap();
        assert!(matches!(
            delete_sub_category(&db, 404).unwrap_err(),
            Error::NotFound {
                kind: EntityKind::SubCategory,
                id: 404
            }
        ));
    }

    #[test]
    fn bulk_continues_past_failures_and_reports_them() {
        let db = BoardDb::open_memory().unwrap();
        let (.., task) = seed(&db);

        let items = [
            (EntityKind::Task, 404),
            (EntityKind::Task, task),
            (EntityKind::Category, 405),
        ];
        let outcome = bulk_permanently_delete(&db, &items);

        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.failed[0].id, 404);
        assert_eq!(outcome.failed[1].id, 405);
        assert!(db.get_task(task).unwrap().is_none());
    }
}
