//! Task management commands for CLI.

use clap::Subcommand;
use taskboard_core::archive;
use taskboard_core::board::{ChecklistItem, NewTask, TaskPatch};
use taskboard_core::deletion;
use taskboard_core::notify::NotificationQueue;
use taskboard_core::propagation;
use taskboard_core::storage::BoardDb;

use crate::common::{print_notifications, TaskPriorityArg, TaskStatusArg};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task under a subcategory
    Create {
        sub_category_id: i64,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, value_enum, default_value_t = TaskStatusArg::Todo)]
        status: TaskStatusArg,
        #[arg(long, value_enum, default_value_t = TaskPriorityArg::Medium)]
        priority: TaskPriorityArg,
        #[arg(long, default_value = "")]
        assignee: String,
        /// Due date as an ISO date (YYYY-MM-DD), empty for none
        #[arg(long, default_value = "")]
        due_date: String,
        #[arg(long, default_value_t = 0)]
        progress: i64,
    },
    /// List a subcategory's tasks
    List { sub_category_id: i64 },
    /// Show a task with its change history
    Show { id: i64 },
    /// Update a task; status changes propagate to ancestor groups
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatusArg>,
        #[arg(long, value_enum)]
        priority: Option<TaskPriorityArg>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
        #[arg(long)]
        progress: Option<i64>,
        /// Replace the checklist with this JSON array of {id, text, done}
        #[arg(long)]
        checklist: Option<String>,
    },
    /// Show a task's change history, newest first
    History { id: i64 },
    /// Archive a task
    Archive { id: i64 },
    /// Restore a task from the archive
    Restore { id: i64 },
    /// Permanently delete a task and its history
    Delete { id: i64 },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = BoardDb::open()?;

    match action {
        TaskAction::Create {
            sub_category_id,
            title,
            description,
            status,
            priority,
            assignee,
            due_date,
            progress,
        } => {
            let sub = db
                .get_sub_category(sub_category_id)?
                .ok_or_else(|| format!("subcategory {sub_category_id} not found"))?;
            let task = db.create_task(&NewTask {
                sub_category_id,
                category_id: sub.category_id,
                project_id: sub.project_id,
                title,
                description,
                status: status.into(),
                priority: priority.into(),
                assignee,
                due_date,
                progress,
                checklist: Vec::new(),
            })?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { sub_category_id } => {
            let tasks = db.tasks_for_sub_category(sub_category_id)?;
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Show { id } => {
            let task = db
                .get_task(id)?
                .ok_or_else(|| format!("task {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
            let history = db.history_for_task(id)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        TaskAction::Update {
            id,
            title,
            description,
            status,
            priority,
            assignee,
            due_date,
            progress,
            checklist,
        } => {
            let checklist: Option<Vec<ChecklistItem>> = match checklist {
                Some(json) => Some(serde_json::from_str(&json)?),
                None => None,
            };
            let patch = TaskPatch {
                title,
                description,
                status: status.map(Into::into),
                priority: priority.map(Into::into),
                assignee,
                due_date,
                progress,
                checklist,
            };
            let mut queue = NotificationQueue::new();
            let task = propagation::apply_task_update(&db, &mut queue, id, &patch)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
            print_notifications(&mut queue);
        }
        TaskAction::History { id } => {
            let history = db.history_for_task(id)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        TaskAction::Archive { id } => {
            archive::archive_task(&db, id)?;
            println!("Task {id} archived");
        }
        TaskAction::Restore { id } => {
            archive::restore_task(&db, id)?;
            println!("Task {id} restored");
        }
        TaskAction::Delete { id } => {
            deletion::delete_task(&db, id)?;
            println!("Task {id} permanently deleted");
        }
    }
    Ok(())
}
