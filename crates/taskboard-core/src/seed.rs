//! First-run sample data.

use tracing::info;

use crate::board::{
    ChecklistItem, EntityKind, NewCategory, NewProject, NewSubCategory, NewTask, ProjectStatus,
    TaskPriority, TaskStatus,
};
use crate::error::Result;
use crate::storage::BoardDb;

fn check(id: &str, text: &str, done: bool) -> ChecklistItem {
    ChecklistItem {
        id: id.to_string(),
        text: text.to_string(),
        done,
    }
}

/// Populate an empty store with one sample project.
///
/// A no-op when any project already exists. Returns whether data was seeded.
pub fn seed_database(db: &BoardDb) -> Result<bool> {
    if db.count(EntityKind::Project)? > 0 {
        return Ok(false);
    }

    db.transaction(|db| {
        let project = db.create_project(&NewProject {
            name: "Modbus TCP driver".to_string(),
            description: "Client driver library for factory equipment".to_string(),
            status: ProjectStatus::Active,
            color: "#3b82f6".to_string(),
        })?;

        let design = db.create_category(&NewCategory {
            project_id: project.id,
            name: "Design & architecture".to_string(),
            order: 0,
        })?;
        let implementation = db.create_category(&NewCategory {
            project_id: project.id,
            name: "Implementation".to_string(),
            order: 1,
        })?;

        let api = db.create_sub_category(&NewSubCategory {
            category_id: design.id,
            project_id: project.id,
            name: "Public API design".to_string(),
            order: 0,
        })?;
        let sockets = db.create_sub_category(&NewSubCategory {
            category_id: implementation.id,
            project_id: project.id,
            name: "Socket communication".to_string(),
            order: 0,
        })?;
        let reconnect = db.create_sub_category(&NewSubCategory {
            category_id: implementation.id,
            project_id: project.id,
            name: "Reconnect policy".to_string(),
            order: 1,
        })?;

        db.create_task(&NewTask {
            sub_category_id: api.id,
            category_id: design.id,
            project_id: project.id,
            title: "Define public driver header".to_string(),
            description: "Opaque handle type and global function signatures".to_string(),
            status: TaskStatus::Done,
            priority: TaskPriority::High,
            assignee: "me".to_string(),
            due_date: String::new(),
            progress: 100,
            checklist: vec![
                check("1", "Define handle type", true),
                check("2", "Declare create/destroy functions", true),
                check("3", "Declare synchronous send", true),
            ],
        })?;
        db.create_task(&NewTask {
            sub_category_id: sockets.id,
            category_id: implementation.id,
            project_id: project.id,
            title: "Implement TCP connect".to_string(),
            description: "connect, send, recv basics".to_string(),
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            assignee: "me".to_string(),
            due_date: "2026-03-15".to_string(),
            progress: 60,
            checklist: vec![
                check("1", "Socket lifetime RAII", true),
                check("2", "connect() call", true),
                check("3", "send/recv timeouts", false),
            ],
        })?;
        db.create_task(&NewTask {
            sub_category_id: reconnect.id,
            category_id: implementation.id,
            project_id: project.id,
            title: "Exponential backoff reconnect".to_string(),
            description: "1s doubling up to a 30s cap".to_string(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            assignee: "me".to_string(),
            due_date: "2026-03-20".to_string(),
            progress: 0,
            checklist: Vec::new(),
        })?;

        Ok(())
    })?;

    info!("seeded sample project");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_once_then_noops() {
        let db = BoardDb::open_memory().unwrap();
        assert!(seed_database(&db).unwrap());
        assert!(!seed_database(&db).unwrap());

        assert_eq!(db.count(EntityKind::Project).unwrap(), 1);
        assert_eq!(db.count(EntityKind::Category).unwrap(), 2);
        assert_eq!(db.count(EntityKind::SubCategory).unwrap(), 3);
        assert_eq!(db.count(EntityKind::Task).unwrap(), 3);
    }

    #[test]
    fn seeding_a_done_task_does_not_complete_its_group() {
        let db = BoardDb::open_memory().unwrap();
        seed_database(&db).unwrap();

        // The "Public API design" subcategory holds one DONE task but stays
        // ACTIVE: auto-completion never runs on create.
        let sub = db
            .list_sub_categories()
            .unwrap()
            .into_iter()
            .find(|s| s.name == "Public API design")
            .unwrap();
        assert_eq!(sub.status, crate::board::GroupStatus::Active);
    }
}
