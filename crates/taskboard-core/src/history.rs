//! History recorder: value-equality diffing of task updates.
//!
//! Old and new field values are fingerprinted with their JSON serialization;
//! two values whose serializations match are unchanged and produce no audit
//! record. Field names use the backup format's camelCase spelling so history
//! rows round-trip through snapshots unchanged.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::board::{Task, TaskPatch};
use crate::error::Result;
use crate::storage::BoardDb;

/// One changed field of a task update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old_value: String,
    pub new_value: String,
}

/// JSON fingerprint used to prove a value changed.
fn fingerprint<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn push_change<T: Serialize>(
    changes: &mut Vec<FieldChange>,
    field: &'static str,
    old: &T,
    new: &T,
) {
    let old_value = fingerprint(old);
    let new_value = fingerprint(new);
    if old_value != new_value {
        changes.push(FieldChange {
            field,
            old_value,
            new_value,
        });
    }
}

/// Compute the changed fields a patch would apply to `current`.
///
/// `updated_at` is never part of the diff.
pub fn diff_task(current: &Task, patch: &TaskPatch) -> Vec<FieldChange> {
    let mut changes = Vec::new();
    if let Some(title) = &patch.title {
        push_change(&mut changes, "title", &current.title, title);
    }
    if let Some(description) = &patch.description {
        push_change(&mut changes, "description", &current.description, description);
    }
    if let Some(status) = &patch.status {
        push_change(&mut changes, "status", &current.status, status);
    }
    if let Some(priority) = &patch.priority {
        push_change(&mut changes, "priority", &current.priority, priority);
    }
    if let Some(assignee) = &patch.assignee {
        push_change(&mut changes, "assignee", &current.assignee, assignee);
    }
    if let Some(due_date) = &patch.due_date {
        push_change(&mut changes, "dueDate", &current.due_date, due_date);
    }
    if let Some(progress) = &patch.progress {
        push_change(&mut changes, "progress", &current.progress, progress);
    }
    if let Some(checklist) = &patch.checklist {
        push_change(&mut changes, "checklist", &current.checklist, checklist);
    }
    changes
}

/// Append one audit record per changed field, all stamped `changed_at`.
pub fn record(
    db: &BoardDb,
    task_id: i64,
    changes: &[FieldChange],
    changed_at: DateTime<Utc>,
) -> Result<()> {
    for change in changes {
        db.add_history(
            task_id,
            change.field,
            &change.old_value,
            &change.new_value,
            changed_at,
        )?;
    }
    Ok(())
}
