//! Read-layer progress rollups over non-archived tasks.

use serde::{Deserialize, Serialize};

use crate::board::{Task, TaskStatus};
use crate::error::Result;
use crate::storage::BoardDb;

/// Aggregate counters for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverview {
    pub task_count: usize,
    pub todo_count: usize,
    pub in_progress_count: usize,
    pub done_count: usize,
    /// Mean task progress, rounded. 0 for a project without tasks.
    pub progress: i64,
}

/// Mean progress over a slice of tasks, ignoring archived ones.
pub fn mean_progress(tasks: &[Task]) -> i64 {
    let active: Vec<&Task> = tasks.iter().filter(|t| t.archived_at.is_none()).collect();
    if active.is_empty() {
        return 0;
    }
    let sum: i64 = active.iter().map(|t| t.progress).sum();
    (sum as f64 / active.len() as f64).round() as i64
}

/// Counters and mean progress over a project's non-archived tasks.
pub fn project_overview(db: &BoardDb, project_id: i64) -> Result<ProjectOverview> {
    let tasks = db.tasks_for_project(project_id)?;
    let mut overview = ProjectOverview::default();
    let mut sum = 0i64;
    for task in tasks.iter().filter(|t| t.archived_at.is_none()) {
        overview.task_count += 1;
        sum += task.progress;
        match task.status {
            TaskStatus::Todo => overview.todo_count += 1,
            TaskStatus::InProgress => overview.in_progress_count += 1,
            TaskStatus::Done => overview.done_count += 1,
        }
    }
    if overview.task_count > 0 {
        overview.progress = (sum as f64 / overview.task_count as f64).round() as i64;
    }
    Ok(overview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ChecklistItem, TaskPriority};
    use chrono::Utc;

    fn task(progress: i64, status: TaskStatus, archived: bool) -> Task {
        let now = Utc::now();
        Task {
            id: 0,
            sub_category_id: 1,
            category_id: 1,
            project_id: 1,
            title: String::new(),
            description: String::new(),
            status,
            priority: TaskPriority::Medium,
            assignee: String::new(),
            due_date: String::new(),
            progress,
            checklist: Vec::<ChecklistItem>::new(),
            archived_at: archived.then_some(now),
            archive_batch: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn mean_progress_rounds_and_skips_archived() {
        let tasks = vec![
            task(100, TaskStatus::Done, false),
            task(60, TaskStatus::InProgress, false),
            task(0, TaskStatus::Todo, true), // archived, ignored
        ];
        assert_eq!(mean_progress(&tasks), 80);
    }

    #[test]
    fn mean_progress_of_nothing_is_zero() {
        assert_eq!(mean_progress(&[]), 0);
        assert_eq!(mean_progress(&[task(50, TaskStatus::Todo, true)]), 0);
    }
}
