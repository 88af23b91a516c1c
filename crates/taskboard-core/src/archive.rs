//! Cascade archival service.
//!
//! Archiving a category or subcategory stamps the whole subtree with one
//! shared timestamp and one fresh batch token; descendants that were already
//! archived keep their own. Restore walks the subtree and clears exactly the
//! rows carrying the parent's token, so entities archived independently stay
//! archived. Project and task archival never cascade.
//!
//! Restoring an item whose parent is still archived is allowed; the
//! `parent_archived_at` field on listings is how callers decide whether to
//! prompt for chain restoration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::board::EntityKind;
use crate::error::{Error, Result};
use crate::storage::BoardDb;

/// One archived entity in the flat archive listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveItem {
    pub id: i64,
    pub kind: EntityKind,
    pub name: String,
    pub project_id: Option<i64>,
    pub project_name: Option<String>,
    /// Archival timestamp of the direct parent, if that parent is archived
    /// too. None for projects and for children of active parents.
    pub parent_archived_at: Option<DateTime<Utc>>,
    pub archived_at: DateTime<Utc>,
}

/// Archive a project. No cascade: children stay as they are and are filtered
/// transitively at the read layer.
pub fn archive_project(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_project(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Project,
            id,
        })?;
        let batch = Uuid::new_v4().to_string();
        db.stamp_project_archived(id, Utc::now(), &batch)?;
        Ok(())
    })
}

/// Archive a category and its whole subtree under one batch token.
pub fn archive_category(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Category,
            id,
        })?;
        let now = Utc::now();
        let batch = Uuid::new_v4().to_string();
        db.stamp_category_archived(id, now, &batch)?;
        let subs = db.stamp_sub_categories_archived_for_category(id, now, &batch)?;
        let tasks = db.stamp_tasks_archived_for_category(id, now, &batch)?;
        debug!(category = id, subs, tasks, "archived category subtree");
        Ok(())
    })
}

/// Archive a subcategory and its tasks under one batch token.
pub fn archive_sub_category(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_sub_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::SubCategory,
            id,
        })?;
        let now = Utc::now();
        let batch = Uuid::new_v4().to_string();
        db.stamp_sub_category_archived(id, now, &batch)?;
        let tasks = db.stamp_tasks_archived_for_sub_category(id, now, &batch)?;
        debug!(sub_category = id, tasks, "archived subcategory subtree");
        Ok(())
    })
}

/// Archive a single task.
pub fn archive_task(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_task(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Task,
            id,
        })?;
        let batch = Uuid::new_v4().to_string();
        db.stamp_task_archived(id, Utc::now(), &batch)?;
        Ok(())
    })
}

/// Restore a project (no cascade).
pub fn restore_project(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_project(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Project,
            id,
        })?;
        db.clear_project_archived(id, Utc::now())?;
        Ok(())
    })
}

/// Restore a category and the descendants archived together with it.
///
/// Only subcategories and tasks carrying the category's batch token are
/// restored; anything archived independently before the cascade stays
/// archived.
pub fn restore_category(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        let category = db.get_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Category,
            id,
        })?;
        let now = Utc::now();
        let batch = category.archive_batch.clone();
        db.clear_category_archived(id, now)?;

        let Some(batch) = batch else {
            return Ok(());
        };
        let mut restored = 0usize;
        for sub in db.sub_categories_for_category(id)? {
            if sub.archive_batch.as_deref() != Some(batch.as_str()) {
                continue;
            }
            db.clear_sub_category_archived(sub.id, now)?;
            restored += 1;
            for task in db.tasks_for_sub_category(sub.id)? {
                if task.archive_batch.as_deref() == Some(batch.as_str()) {
                    db.clear_task_archived(task.id, now)?;
                }
            }
        }
        debug!(category = id, restored, "restored category subtree");
        Ok(())
    })
}

/// Restore a subcategory and the tasks archived together with it.
pub fn restore_sub_category(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        let sub = db.get_sub_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::SubCategory,
            id,
        })?;
        let now = Utc::now();
        let batch = sub.archive_batch.clone();
        db.clear_sub_category_archived(id, now)?;

        let Some(batch) = batch else {
            return Ok(());
        };
        for task in db.tasks_for_sub_category(id)? {
            if task.archive_batch.as_deref() == Some(batch.as_str()) {
                db.clear_task_archived(task.id, now)?;
            }
        }
        Ok(())
    })
}

/// Restore a single task (no cascade).
pub fn restore_task(db: &BoardDb, id: i64) -> Result<()> {
    db.transaction(|db| {
        db.get_task(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Task,
            id,
        })?;
        db.clear_task_archived(id, Utc::now())?;
        Ok(())
    })
}

/// Restore any archived item by kind, cascading where the kind cascades.
pub fn restore_item(db: &BoardDb, kind: EntityKind, id: i64) -> Result<()> {
    match kind {
        EntityKind::Project => restore_project(db, id),
        EntityKind::Category => restore_category(db, id),
        EntityKind::SubCategory => restore_sub_category(db, id),
        EntityKind::Task => restore_task(db, id),
    }
}

/// Flat listing of everything archived, newest first.
pub fn list_archived(db: &BoardDb) -> Result<Vec<ArchiveItem>> {
    let all_projects = db.list_projects()?;
    let project_names: HashMap<i64, String> = all_projects
        .iter()
        .map(|p| (p.id, p.name.clone()))
        .collect();
    let project_archived: HashMap<i64, Option<DateTime<Utc>>> =
        all_projects.iter().map(|p| (p.id, p.archived_at)).collect();

    let mut items = Vec::new();

    for project in db.archived_projects()? {
        let Some(archived_at) = project.archived_at else {
            continue;
        };
        items.push(ArchiveItem {
            id: project.id,
            kind: EntityKind::Project,
            name: project.name.clone(),
            project_id: Some(project.id),
            project_name: Some(project.name),
            parent_archived_at: None,
            archived_at,
        });
    }

    for category in db.archived_categories()? {
        let Some(archived_at) = category.archived_at else {
            continue;
        };
        items.push(ArchiveItem {
            id: category.id,
            kind: EntityKind::Category,
            name: category.name,
            project_id: Some(category.project_id),
            project_name: project_names.get(&category.project_id).cloned(),
            parent_archived_at: project_archived
                .get(&category.project_id)
                .copied()
                .flatten(),
            archived_at,
        });
    }

    for sub in db.archived_sub_categories()? {
        let Some(archived_at) = sub.archived_at else {
            continue;
        };
        let parent = db.get_category(sub.category_id)?;
        items.push(ArchiveItem {
            id: sub.id,
            kind: EntityKind::SubCategory,
            name: sub.name,
            project_id: Some(sub.project_id),
            project_name: project_names.get(&sub.project_id).cloned(),
            parent_archived_at: parent.and_then(|c| c.archived_at),
            archived_at,
        });
    }

    for task in db.archived_tasks()? {
        let Some(archived_at) = task.archived_at else {
            continue;
        };
        let parent = db.get_sub_category(task.sub_category_id)?;
        items.push(ArchiveItem {
            id: task.id,
            kind: EntityKind::Task,
            name: task.title,
            project_id: Some(task.project_id),
            project_name: project_names.get(&task.project_id).cloned(),
            parent_archived_at: parent.and_then(|s| s.archived_at),
            archived_at,
        });
    }

    items.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{
        NewCategory, NewProject, NewSubCategory, NewTask, ProjectStatus, TaskPriority, TaskStatus,
    };

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
        (project.id, category.id, sub.id, task.id)
    }

    #[test]
    fn archive_category_shares_one_batch_with_subtree() {
        let db = BoardDb::open_memory().unwrap();
        let (_, category, sub, task) = seed(&db);

        archive_category(&db, category).unwrap();

        let cat = db.get_category(category).unwrap().unwrap();
        let sub = db.get_sub_category(sub).unwrap().unwrap();
        let task = db.get_task(task).unwrap().unwrap();
        assert!(cat.archived_at.is_some());
        assert_eq!(cat.archived_at, sub.archived_at);
        assert_eq!(cat.archive_batch, sub.archive_batch);
        assert_eq!(cat.archive_batch, task.archive_batch);
    }

    #[test]
    fn archive_project_does_not_cascade() {
        let db = BoardDb::open_memory().unwrap();
        let (project, category, ..) = seed(&db);

        archive_project(&db, project).unwrap();

        assert!(db.get_project(project).unwrap().unwrap().archived_at.is_some());
        assert!(db.get_category(category).unwrap().unwrap().archived_at.is_none());
    }

    #[test]
    fn archive_missing_root_is_not_found() {
        let db = BoardDb::open_memory().unwrap();
        assert!(matches!(
            archive_category(&db, 404).unwrap_err(),
            Error::NotFound {
                kind: EntityKind::Category,
                id: 404
            }
        ));
    }

    #[test]
    fn listing_reports_parent_archival_and_sorts_newest_first() {
        let db = BoardDb::open_memory().unwrap();
        let (project, category, sub, task) = seed(&db);

        archive_category(&db, category).unwrap();
        let items = list_archived(&db).unwrap();
        assert_eq!(items.len(), 3);

        let sub_item = items
            .iter()
            .find(|i| i.kind == EntityKind::SubCategory)
            .unwrap();
        assert_eq!(sub_item.id, sub);
        assert!(sub_item.parent_archived_at.is_some());
        assert_eq!(sub_item.project_id, Some(project));
        assert_eq!(sub_item.project_name.as_deref(), Some("Driver"));

        let cat_item = items.iter().find(|i| i.kind == EntityKind::Category).unwrap();
        assert!(cat_item.parent_archived_at.is_none());

        let task_item = items.iter().find(|i| i.kind == EntityKind::Task).unwrap();
        assert_eq!(task_item.id, task);
        assert_eq!(task_item.name, "Implement connect");
    }
}
