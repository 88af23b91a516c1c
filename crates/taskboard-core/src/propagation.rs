//! Status propagation engine.
//!
//! [`apply_task_update`] is the single write path for tasks: it applies a
//! partial update, records history for every field that actually changed,
//! and cascades the status change into the ancestor chain:
//!
//! - a task turning DONE completes its subcategory when every non-archived
//!   sibling is already DONE, and that completion may in turn complete the
//!   parent category;
//! - a task leaving DONE reopens a COMPLETED subcategory and a COMPLETED
//!   category unconditionally.
//!
//! Completion requires *all* children done; reopening triggers on *any*
//! child leaving DONE. The asymmetry is intentional.
//!
//! Auto-completions enqueue undo-capable notifications. Undo payloads are
//! applied with [`undo`].

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::board::{EntityKind, GroupStatus, Task, TaskPatch, TaskStatus};
use crate::error::{Error, Result};
use crate::history;
use crate::notify::{NotificationQueue, UndoAction};
use crate::storage::BoardDb;

/// Apply a partial update to a task in one atomic transaction.
///
/// Records one history row per changed field (value equality, so an echoed
/// patch writes nothing) and runs auto-completion/auto-reopen when the
/// status changed. Returns the updated task.
///
/// # Errors
/// `Error::NotFound` if the task does not exist; database errors roll the
/// whole update back.
pub fn apply_task_update(
    db: &BoardDb,
    queue: &mut NotificationQueue,
    task_id: i64,
    patch: &TaskPatch,
) -> Result<Task> {
    db.transaction(|db| {
        let current = db.get_task(task_id)?.ok_or(Error::NotFound {
            kind: EntityKind::Task,
            id: task_id,
        })?;
        let now = Utc::now();

        let changes = history::diff_task(&current, patch);
        let updated = patch.apply_to(&current, now);
        db.update_task_row(&updated)?;
        history::record(db, task_id, &changes, now)?;

        if changes.iter().any(|c| c.field == "status") {
            if updated.status == TaskStatus::Done {
                auto_complete(db, queue, &updated, now)?;
            } else {
                auto_reopen(db, &updated, now)?;
            }
        }

        Ok(updated)
    })
}

/// A task just turned DONE: complete ancestors whose children are all done.
fn auto_complete(
    db: &BoardDb,
    queue: &mut NotificationQueue,
    task: &Task,
    now: DateTime<Utc>,
) -> Result<()> {
    let Some(sub) = db.get_sub_category(task.sub_category_id)? else {
        return Ok(());
    };

    // Vacuously true with no siblings; archived siblings don't count.
    let siblings_done = db
        .tasks_for_sub_category(sub.id)?
        .iter()
        .filter(|t| t.id != task.id && t.archived_at.is_none())
        .all(|t| t.status == TaskStatus::Done);

    if !siblings_done || sub.status == GroupStatus::Completed {
        return Ok(());
    }
    if !db.complete_sub_category(sub.id, now)? {
        return Ok(());
    }

    // The category completes too when its remaining subcategories are done.
    let category = db.get_category(sub.category_id)?;
    let mut completed_category = None;
    if let Some(category) = category {
        if category.status != GroupStatus::Completed {
            let sibling_subs_done = db
                .sub_categories_for_category(category.id)?
                .iter()
                .filter(|s| s.id != sub.id && s.archived_at.is_none())
                .all(|s| s.status == GroupStatus::Completed);
            if sibling_subs_done && db.complete_category(category.id, now)? {
                completed_category = Some(category);
            }
        }
    }

    debug!(
        sub_category = sub.id,
        category = completed_category.as_ref().map(|c| c.id),
        "auto-completed after task {} turned DONE",
        task.id
    );

    queue.push(
        format!("Subcategory \"{}\" completed automatically", sub.name),
        Some(UndoAction::ReopenSubCategory {
            sub_category_id: sub.id,
            category_id: completed_category.as_ref().map(|c| c.id),
        }),
    );
    if let Some(category) = completed_category {
        queue.push(
            format!("Category \"{}\" completed automatically", category.name),
            Some(UndoAction::ReopenCategory {
                category_id: category.id,
            }),
        );
    }

    Ok(())
}

/// A task left DONE: reopen COMPLETED ancestors unconditionally.
fn auto_reopen(db: &BoardDb, task: &Task, now: DateTime<Utc>) -> Result<()> {
    if let Some(sub) = db.get_sub_category(task.sub_category_id)? {
        if sub.status == GroupStatus::Completed && db.reopen_sub_category(sub.id, now)? {
            debug!(sub_category = sub.id, "reopened after task {} left DONE", task.id);
        }
    }
    if let Some(category) = db.get_category(task.category_id)? {
        if category.status == GroupStatus::Completed && db.reopen_category(category.id, now)? {
            debug!(category = category.id, "reopened after task {} left DONE", task.id);
        }
    }
    Ok(())
}

/// Apply a notification's undo payload, or an explicit user reopen.
///
/// # Errors
/// `Error::NotFound` if the target entity no longer exists.
pub fn undo(db: &BoardDb, action: UndoAction) -> Result<()> {
    db.transaction(|db| {
        let now = Utc::now();
        match action {
            UndoAction::ReopenSubCategory {
                sub_category_id,
                category_id,
            } => {
                db.get_sub_category(sub_category_id)?.ok_or(Error::NotFound {
                    kind: EntityKind::SubCategory,
                    id: sub_category_id,
                })?;
                db.reopen_sub_category(sub_category_id, now)?;
                if let Some(category_id) = category_id {
                    db.reopen_category(category_id, now)?;
                }
            }
            UndoAction::ReopenCategory { category_id } => {
                db.get_category(category_id)?.ok_or(Error::NotFound {
                    kind: EntityKind::Category,
                    id: category_id,
                })?;
                db.reopen_category(category_id, now)?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{NewCategory, NewProject, NewSubCategory, NewTask, ProjectStatus, TaskPriority};

    fn seed(db: &BoardDb) -> (i64, i64, i64) {
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
        (project.id, category.id, sub.id)
    }

    fn add_task(db: &BoardDb, project: i64, category: i64, sub: i64, status: TaskStatus) -> i64 {
        db.create_task(&NewTask {
            sub_category_id: sub,
            category_id: category,
            project_id: project,
            title: "t".to_string(),
            description: String::new(),
            status,
            priority: TaskPriority::Medium,
            assignee: String::new(),
            due_date: String::new(),
            progress: 0,
            checklist: Vec::new(),
        })
        .unwrap()
        .id
    }

    #[test]
    fn update_missing_task_is_not_found() {
        let db = BoardDb::open_memory().unwrap();
        let mut queue = NotificationQueue::new();
        let err = apply_task_update(&db, &mut queue, 404, &TaskPatch::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: EntityKind::Task,
                id: 404
            }
        ));
    }

    #[test]
    fn echoed_patch_writes_no_history() {
        let db = BoardDb::open_memory().unwrap();
        let (project, category, sub) = seed(&db);
        let task = add_task(&db, project, category, sub, TaskStatus::Todo);
        let mut queue = NotificationQueue::new();

        let patch = TaskPatch {
            status: Some(TaskStatus::Todo),
            title: Some("t".to_string()),
            ..Default::default()
        };
        apply_task_update(&db, &mut queue, task, &patch).unwrap();

        assert!(db.history_for_task(task).unwrap().is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn status_change_records_history_row() {
        let db = BoardDb::open_memory().unwrap();
        let (project, category, sub) = seed(&db);
        let task = add_task(&db, project, category, sub, TaskStatus::Todo);
        let mut queue = NotificationQueue::new();

        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        apply_task_update(&db, &mut queue, task, &patch).unwrap();

        let history = db.history_for_task(task).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].field, "status");
        assert_eq!(history[0].old_value, "\"TODO\"");
        assert_eq!(history[0].new_value, "\"IN_PROGRESS\"");
    }

    #[test]
    fn sole_task_done_completes_sub_category_vacuously() {
        let db = BoardDb::open_memory().unwrap();
        let (project, category, sub) = seed(&db);
        let task = add_task(&db, project, category, sub, TaskStatus::Todo);
        let mut queue = NotificationQueue::new();

        apply_task_update(
            &db,
            &mut queue,
            task,
            &TaskPatch {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            db.get_sub_category(sub).unwrap().unwrap().status,
            GroupStatus::Completed
        );
        // Sole subcategory: the category completes with it.
        assert_eq!(
            db.get_category(category).unwrap().unwrap().status,
            GroupStatus::Completed
        );
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn empty_sub_category_is_not_completed_on_create() {
        let db = BoardDb::open_memory().unwrap();
        let (_, _, sub) = seed(&db);
        assert_eq!(
            db.get_sub_category(sub).unwrap().unwrap().status,
            GroupStatus::Active
        );
    }
}
