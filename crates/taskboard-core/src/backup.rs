//! Backup transfer service: versioned full-store snapshots.
//!
//! Export dumps all five tables, archived rows included. Import validates,
//! normalizes older snapshot versions (v1.0 lacked `archivedAt` and group
//! `status`; serde defaults fill them uniformly before either mode runs),
//! then either overwrites the store preserving ids verbatim or merges with
//! freshly assigned ids, rewriting every foreign key through per-type
//! old→new maps. An import is one transaction: it all lands or nothing does.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Category, Project, SubCategory, Task, TaskHistory};
use crate::error::{Error, Result};
use crate::storage::BoardDb;

/// Snapshot format version written by [`export_snapshot`].
pub const SNAPSHOT_VERSION: &str = "2.0";

/// A full, disaster-recovery-grade dump of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub projects: Vec<Project>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub task_history: Vec<TaskHistory>,
}

/// How an import treats existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Clear all five tables, then insert preserving snapshot ids verbatim.
    Overwrite,
    /// Keep existing data; insert everything under fresh ids, remapping
    /// foreign keys.
    Merge,
}

/// Row counts inserted by one import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub projects: usize,
    pub categories: usize,
    pub sub_categories: usize,
    pub tasks: usize,
    pub task_history: usize,
}

/// Read all five tables in full.
pub fn export_snapshot(db: &BoardDb) -> Result<Snapshot> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        exported_at: Utc::now(),
        projects: db.list_projects()?,
        categories: db.list_categories()?,
        sub_categories: db.list_sub_categories()?,
        tasks: db.list_tasks()?,
        task_history: db.list_task_history()?,
    };
    debug!(
        projects = snapshot.projects.len(),
        tasks = snapshot.tasks.len(),
        "exported snapshot"
    );
    Ok(snapshot)
}

/// Parse and validate snapshot JSON.
///
/// # Errors
/// `Error::InvalidFormat` if the JSON is unparseable or the top-level
/// `version`/`projects` fields are missing.
pub fn parse_snapshot(json: &str) -> Result<Snapshot> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| Error::InvalidFormat(format!("not valid JSON: {e}")))?;
    if value.get("version").is_none() || value.get("projects").is_none() {
        return Err(Error::InvalidFormat(
            "missing required fields: version, projects".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidFormat(e.to_string()))
}

/// Import a snapshot in one atomic transaction.
pub fn import_snapshot(db: &BoardDb, snapshot: &Snapshot, mode: ImportMode) -> Result<ImportSummary> {
    let summary = db.transaction(|db| match mode {
        ImportMode::Overwrite => import_overwrite(db, snapshot),
        ImportMode::Merge => import_merge(db, snapshot),
    })?;
    info!(
        ?mode,
        projects = summary.projects,
        tasks = summary.tasks,
        "imported snapshot version {}",
        snapshot.version
    );
    Ok(summary)
}

fn import_overwrite(db: &BoardDb, snapshot: &Snapshot) -> Result<ImportSummary> {
    db.clear_all()?;
    for project in &snapshot.projects {
        db.insert_project(project, true)?;
    }
    for category in &snapshot.categories {
        db.insert_category(category, true)?;
    }
    for sub in &snapshot.sub_categories {
        db.insert_sub_category(sub, true)?;
    }
    for task in &snapshot.tasks {
        db.insert_task(task, true)?;
    }
    for record in &snapshot.task_history {
        db.insert_task_history(record, true)?;
    }
    Ok(summary_of(snapshot))
}

/// Merge-insert in dependency order so every id map is complete before the
/// next entity type needs it. Unmapped foreign keys fall back to their
/// original value; that only happens for malformed backups.
fn import_merge(db: &BoardDb, snapshot: &Snapshot) -> Result<ImportSummary> {
    let mut project_ids: HashMap<i64, i64> = HashMap::new();
    for project in &snapshot.projects {
        let new_id = db.insert_project(project, false)?;
        project_ids.insert(project.id, new_id);
    }

    let mut category_ids: HashMap<i64, i64> = HashMap::new();
    for category in &snapshot.categories {
        let mut remapped = category.clone();
        remapped.project_id = project_ids
            .get(&category.project_id)
            .copied()
            .unwrap_or(category.project_id);
        let new_id = db.insert_category(&remapped, false)?;
        category_ids.insert(category.id, new_id);
    }

    let mut sub_category_ids: HashMap<i64, i64> = HashMap::new();
    for sub in &snapshot.sub_categories {
        let mut remapped = sub.clone();
        remapped.project_id = project_ids
            .get(&sub.project_id)
            .copied()
            .unwrap_or(sub.project_id);
        remapped.category_id = category_ids
            .get(&sub.category_id)
            .copied()
            .unwrap_or(sub.category_id);
        let new_id = db.insert_sub_category(&remapped, false)?;
        sub_category_ids.insert(sub.id, new_id);
    }

    let mut task_ids: HashMap<i64, i64> = HashMap::new();
    for task in &snapshot.tasks {
        let mut remapped = task.clone();
        remapped.project_id = project_ids
            .get(&task.project_id)
            .copied()
            .unwrap_or(task.project_id);
        remapped.category_id = category_ids
            .get(&task.category_id)
            .copied()
            .unwrap_or(task.category_id);
        remapped.sub_category_id = sub_category_ids
            .get(&task.sub_category_id)
            .copied()
            .unwrap_or(task.sub_category_id);
        let new_id = db.insert_task(&remapped, false)?;
        task_ids.insert(task.id, new_id);
    }

    for record in &snapshot.task_history {
        let mut remapped = record.clone();
        remapped.task_id = task_ids
            .get(&record.task_id)
            .copied()
            .unwrap_or(record.task_id);
        db.insert_task_history(&remapped, false)?;
    }

    Ok(summary_of(snapshot))
}

fn summary_of(snapshot: &Snapshot) -> ImportSummary {
    ImportSummary {
        projects: snapshot.projects.len(),
        categories: snapshot.categories.len(),
        sub_categories: snapshot.sub_categories.len(),
        tasks: snapshot.tasks.len(),
        task_history: snapshot.task_history.len(),
    }
}

/// Date-stamped default export file name.
pub fn default_export_file_name(now: DateTime<Utc>) -> String {
    format!("taskboard-backup-{}.json", now.format("%Y-%m-%d"))
}

/// Serialize the whole store to a JSON file.
pub fn export_to_file(db: &BoardDb, path: &Path) -> Result<()> {
    let snapshot = export_snapshot(db)?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read a snapshot file and import it.
pub fn import_from_file(db: &BoardDb, path: &Path, mode: ImportMode) -> Result<ImportSummary> {
    let json = std::fs::read_to_string(path)?;
    let snapshot = parse_snapshot(&json)?;
    import_snapshot(db, &snapshot, mode)
}
