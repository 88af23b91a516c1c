//! Shared argument types and output helpers.

use clap::ValueEnum;
use taskboard_core::board::{EntityKind, ProjectStatus, TaskPriority, TaskStatus};
use taskboard_core::notify::{NotificationQueue, UndoAction};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProjectStatusArg {
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl From<ProjectStatusArg> for ProjectStatus {
    fn from(arg: ProjectStatusArg) -> Self {
        match arg {
            ProjectStatusArg::Active => ProjectStatus::Active,
            ProjectStatusArg::OnHold => ProjectStatus::OnHold,
            ProjectStatusArg::Completed => ProjectStatus::Completed,
            ProjectStatusArg::Cancelled => ProjectStatus::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TaskStatusArg {
    Todo,
    InProgress,
    Done,
}

impl From<TaskStatusArg> for TaskStatus {
    fn from(arg: TaskStatusArg) -> Self {
        match arg {
            TaskStatusArg::Todo => TaskStatus::Todo,
            TaskStatusArg::InProgress => TaskStatus::InProgress,
            TaskStatusArg::Done => TaskStatus::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TaskPriorityArg {
    Low,
    Medium,
    High,
    Critical,
}

impl From<TaskPriorityArg> for TaskPriority {
    fn from(arg: TaskPriorityArg) -> Self {
        match arg {
            TaskPriorityArg::Low => TaskPriority::Low,
            TaskPriorityArg::Medium => TaskPriority::Medium,
            TaskPriorityArg::High => TaskPriority::High,
            TaskPriorityArg::Critical => TaskPriority::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EntityKindArg {
    Project,
    Category,
    Subcategory,
    Task,
}

impl From<EntityKindArg> for EntityKind {
    fn from(arg: EntityKindArg) -> Self {
        match arg {
            EntityKindArg::Project => EntityKind::Project,
            EntityKindArg::Category => EntityKind::Category,
            EntityKindArg::Subcategory => EntityKind::SubCategory,
            EntityKindArg::Task => EntityKind::Task,
        }
    }
}

/// Drain and print the notifications a mutation produced, with the commands
/// that apply their undo actions.
pub fn print_notifications(queue: &mut NotificationQueue) {
    for notification in queue.drain() {
        println!("note: {}", notification.message);
        match notification.undo {
            Some(UndoAction::ReopenSubCategory {
                sub_category_id,
                category_id: Some(category_id),
            }) => {
                println!(
                    "  undo: taskboard-cli subcategory reopen {sub_category_id} --with-category {category_id}"
                );
            }
            Some(UndoAction::ReopenSubCategory {
                sub_category_id, ..
            }) => {
                println!("  undo: taskboard-cli subcategory reopen {sub_category_id}");
            }
            Some(UndoAction::ReopenCategory { category_id }) => {
                println!("  undo: taskboard-cli category reopen {category_id}");
            }
            None => {}
        }
    }
}
