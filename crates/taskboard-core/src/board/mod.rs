//! Entity types for the four-level board hierarchy.
//!
//! Project → Category → SubCategory → Task, plus the immutable TaskHistory
//! audit record. Serde field names match the backup file format (camelCase,
//! SCREAMING_SNAKE_CASE statuses), so these types serialize directly into
//! snapshots.
//!
//! Category and SubCategory status is system-maintained: it moves through
//! [`GroupStatus::can_transition_to`], driven by the propagation engine or an
//! explicit reopen, never by a free-form field write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project lifecycle status, set by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Active
    }
}

/// Derived status for Category and SubCategory.
///
/// Valid transitions:
/// - ACTIVE → COMPLETED (system-triggered, all children done)
/// - COMPLETED → ACTIVE (system-triggered on any child leaving DONE,
///   or user-triggered explicit reopen)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    Active,
    Completed,
}

impl GroupStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &GroupStatus) -> bool {
        match self {
            GroupStatus::Active => matches!(to, GroupStatus::Completed),
            GroupStatus::Completed => matches!(to, GroupStatus::Active),
        }
    }
}

impl Default for GroupStatus {
    fn default() -> Self {
        GroupStatus::Active
    }
}

/// Task status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// One checklist entry on a Task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub done: bool,
}

/// Top-level container, root of one hierarchy instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub color: String,
    /// None means active; Some is the archival timestamp.
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    /// Token shared by everything archived in the same operation.
    #[serde(default)]
    pub archive_batch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Second-level grouping under a Project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub status: GroupStatus,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archive_batch: Option<String>,
    /// Sibling sort key, not necessarily contiguous.
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Third-level grouping under a Category; aggregates Tasks.
///
/// `project_id` is denormalized from the parent Category and must stay
/// consistent with the ancestor chain under every cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: i64,
    pub category_id: i64,
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub status: GroupStatus,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archive_batch: Option<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Leaf work item.
///
/// `category_id` and `project_id` are denormalized copies of the ancestor
/// chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub sub_category_id: i64,
    pub category_id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: String,
    /// ISO date string, or empty when unset.
    pub due_date: String,
    /// Completion percentage, 0–100.
    pub progress: i64,
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archive_batch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable audit record of one Task field change.
///
/// Created only by the update path; `old_value`/`new_value` hold the JSON
/// serialization of the field before and after.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHistory {
    pub id: i64,
    pub task_id: i64,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_at: DateTime<Utc>,
}

/// Fields for creating a Project; ids and timestamps are store-assigned.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub color: String,
}

/// Fields for creating a Category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub project_id: i64,
    pub name: String,
    pub order: i64,
}

/// Fields for creating a SubCategory.
#[derive(Debug, Clone)]
pub struct NewSubCategory {
    pub category_id: i64,
    pub project_id: i64,
    pub name: String,
    pub order: i64,
}

/// Fields for creating a Task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub sub_category_id: i64,
    pub category_id: i64,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: String,
    pub due_date: String,
    pub progress: i64,
    pub checklist: Vec<ChecklistItem>,
}

/// Partial update to a Project.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub color: Option<String>,
}

/// Partial update to a Category (status is not freely settable).
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub order: Option<i64>,
}

/// Partial update to a SubCategory (status is not freely settable).
#[derive(Debug, Clone, Default)]
pub struct SubCategoryPatch {
    pub name: Option<String>,
    pub order: Option<i64>,
}

/// Partial update to a Task, applied by the propagation engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub progress: Option<i64>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl TaskPatch {
    /// Produce the task as it looks with this patch applied.
    ///
    /// `updated_at` is always refreshed to `now`, even for an empty patch.
    pub fn apply_to(&self, task: &Task, now: DateTime<Utc>) -> Task {
        let mut updated = task.clone();
        if let Some(title) = &self.title {
            updated.title = title.clone();
        }
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(priority) = self.priority {
            updated.priority = priority;
        }
        if let Some(assignee) = &self.assignee {
            updated.assignee = assignee.clone();
        }
        if let Some(due_date) = &self.due_date {
            updated.due_date = due_date.clone();
        }
        if let Some(progress) = self.progress {
            updated.progress = progress;
        }
        if let Some(checklist) = &self.checklist {
            updated.checklist = checklist.clone();
        }
        updated.updated_at = now;
        updated
    }
}

/// Which of the four entity tables (plus history) an id refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Project,
    Category,
    SubCategory,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => write!(f, "project"),
            EntityKind::Category => write!(f, "category"),
            EntityKind::SubCategory => write!(f, "subcategory"),
            EntityKind::Task => write!(f, "task"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: 1,
            sub_category_id: 10,
            category_id: 20,
            project_id: 30,
            title: "Define public header".to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::High,
            assignee: "me".to_string(),
            due_date: "2026-03-15".to_string(),
            progress: 0,
            checklist: vec![ChecklistItem {
                id: "1".to_string(),
                text: "Declare handle type".to_string(),
                done: false,
            }],
            archived_at: None,
            archive_batch: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_serialization_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
            "\"ON_HOLD\""
        );
        assert_eq!(
            serde_json::to_string(&GroupStatus::Completed).unwrap(),
            "\"COMPLETED\""
        );
        assert_eq!(
            serde_json::to_string(&TaskPriority::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }

    #[test]
    fn group_status_transitions() {
        assert!(GroupStatus::Active.can_transition_to(&GroupStatus::Completed));
        assert!(GroupStatus::Completed.can_transition_to(&GroupStatus::Active));
        assert!(!GroupStatus::Active.can_transition_to(&GroupStatus::Active));
        assert!(!GroupStatus::Completed.can_transition_to(&GroupStatus::Completed));
    }

    #[test]
    fn task_serialization_uses_camel_case_keys() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("subCategoryId").is_some());
        assert!(json.get("dueDate").is_some());
        assert!(json.get("archivedAt").is_some());

        let decoded: Task = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.id, task.id);
        assert_eq!(decoded.status, TaskStatus::Todo);
        assert_eq!(decoded.checklist, task.checklist);
    }

    #[test]
    fn task_deserializes_without_archival_fields() {
        // Rows exported before archival existed carry neither field.
        let json = r#"{
            "id": 1, "subCategoryId": 10, "categoryId": 20, "projectId": 30,
            "title": "t", "description": "", "status": "DONE",
            "priority": "LOW", "assignee": "", "dueDate": "", "progress": 100,
            "checklist": [],
            "createdAt": "2024-01-01T12:00:00Z", "updatedAt": "2024-01-01T12:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.archived_at.is_none());
        assert!(task.archive_batch.is_none());
    }

    #[test]
    fn category_status_defaults_to_active() {
        let json = r#"{
            "id": 1, "projectId": 30, "name": "c", "order": 0,
            "createdAt": "2024-01-01T12:00:00Z", "updatedAt": "2024-01-01T12:00:00Z"
        }"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.status, GroupStatus::Active);
    }

    #[test]
    fn patch_apply_overrides_only_given_fields() {
        let task = sample_task();
        let now = Utc::now();
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            progress: Some(100),
            ..Default::default()
        };
        let updated = patch.apply_to(&task, now);
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.progress, 100);
        assert_eq!(updated.title, task.title);
        assert_eq!(updated.updated_at, now);
        assert_eq!(updated.created_at, task.created_at);
    }
}
