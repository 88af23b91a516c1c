//! SQLite-based storage for the board hierarchy.
//!
//! One table per entity type (projects, categories, sub_categories, tasks,
//! task_history) with indexes on parent ids and archival state. Ids are
//! store-assigned (AUTOINCREMENT) and immutable. Timestamps are stored as
//! RFC3339 text, enums as their canonical SCREAMING_SNAKE_CASE strings, and
//! checklists as JSON text.
//!
//! Multi-step mutations go through [`BoardDb::transaction`]; the CRUD
//! methods themselves never open transactions so they compose.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::data_dir;
use super::migrations;
use crate::board::{
    Category, CategoryPatch, ChecklistItem, EntityKind, GroupStatus, NewCategory, NewProject,
    NewSubCategory, NewTask, Project, ProjectPatch, ProjectStatus, SubCategory, SubCategoryPatch,
    Task, TaskHistory, TaskPriority, TaskStatus,
};
use crate::error::{DatabaseError, Error, Result};

// === Helper Functions ===

/// Parse project status from database string
fn parse_project_status(status_str: &str) -> ProjectStatus {
    match status_str {
        "ON_HOLD" => ProjectStatus::OnHold,
        "COMPLETED" => ProjectStatus::Completed,
        "CANCELLED" => ProjectStatus::Cancelled,
        _ => ProjectStatus::Active,
    }
}

/// Format project status for database storage
fn format_project_status(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Active => "ACTIVE",
        ProjectStatus::OnHold => "ON_HOLD",
        ProjectStatus::Completed => "COMPLETED",
        ProjectStatus::Cancelled => "CANCELLED",
    }
}

/// Parse group status from database string
fn parse_group_status(status_str: &str) -> GroupStatus {
    match status_str {
        "COMPLETED" => GroupStatus::Completed,
        _ => GroupStatus::Active,
    }
}

/// Format group status for database storage
fn format_group_status(status: GroupStatus) -> &'static str {
    match status {
        GroupStatus::Active => "ACTIVE",
        GroupStatus::Completed => "COMPLETED",
    }
}

/// Parse task status from database string
fn parse_task_status(status_str: &str) -> TaskStatus {
    match status_str {
        "IN_PROGRESS" => TaskStatus::InProgress,
        "DONE" => TaskStatus::Done,
        _ => TaskStatus::Todo,
    }
}

/// Format task status for database storage
fn format_task_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "TODO",
        TaskStatus::InProgress => "IN_PROGRESS",
        TaskStatus::Done => "DONE",
    }
}

/// Parse task priority from database string
fn parse_task_priority(priority_str: &str) -> TaskPriority {
    match priority_str {
        "LOW" => TaskPriority::Low,
        "HIGH" => TaskPriority::High,
        "CRITICAL" => TaskPriority::Critical,
        _ => TaskPriority::Medium,
    }
}

/// Format task priority for database storage
fn format_task_priority(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "LOW",
        TaskPriority::Medium => "MEDIUM",
        TaskPriority::High => "HIGH",
        TaskPriority::Critical => "CRITICAL",
    }
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse an optional RFC3339 column
fn parse_opt_datetime(dt_str: Option<String>) -> Option<DateTime<Utc>> {
    dt_str
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

const PROJECT_COLUMNS: &str =
    "id, name, description, status, color, archived_at, archive_batch, created_at, updated_at";

/// Build a Project from a row selected with [`PROJECT_COLUMNS`]
fn row_to_project(row: &rusqlite::Row) -> rusqlite::Result<Project> {
    let status_str: String = row.get(3)?;
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: parse_project_status(&status_str),
        color: row.get(4)?,
        archived_at: parse_opt_datetime(row.get(5)?),
        archive_batch: row.get(6)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(7)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(8)?),
    })
}

const CATEGORY_COLUMNS: &str = "id, project_id, name, status, archived_at, archive_batch, \
     order_index, created_at, updated_at";

/// Build a Category from a row selected with [`CATEGORY_COLUMNS`]
fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    let status_str: String = row.get(3)?;
    Ok(Category {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        status: parse_group_status(&status_str),
        archived_at: parse_opt_datetime(row.get(4)?),
        archive_batch: row.get(5)?,
        order: row.get(6)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(7)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(8)?),
    })
}

const SUB_CATEGORY_COLUMNS: &str = "id, category_id, project_id, name, status, archived_at, \
     archive_batch, order_index, created_at, updated_at";

/// Build a SubCategory from a row selected with [`SUB_CATEGORY_COLUMNS`]
fn row_to_sub_category(row: &rusqlite::Row) -> rusqlite::Result<SubCategory> {
    let status_str: String = row.get(4)?;
    Ok(SubCategory {
        id: row.get(0)?,
        category_id: row.get(1)?,
        project_id: row.get(2)?,
        name: row.get(3)?,
        status: parse_group_status(&status_str),
        archived_at: parse_opt_datetime(row.get(5)?),
        archive_batch: row.get(6)?,
        order: row.get(7)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(8)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(9)?),
    })
}

const TASK_COLUMNS: &str = "id, sub_category_id, category_id, project_id, title, description, \
     status, priority, assignee, due_date, progress, checklist, archived_at, archive_batch, \
     created_at, updated_at";

/// Build a Task from a row selected with [`TASK_COLUMNS`]
fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get(6)?;
    let priority_str: String = row.get(7)?;
    let checklist_json: String = row.get(11)?;
    let checklist: Vec<ChecklistItem> = serde_json::from_str(&checklist_json).unwrap_or_default();
    Ok(Task {
        id: row.get(0)?,
        sub_category_id: row.get(1)?,
        category_id: row.get(2)?,
        project_id: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        status: parse_task_status(&status_str),
        priority: parse_task_priority(&priority_str),
        assignee: row.get(8)?,
        due_date: row.get(9)?,
        progress: row.get(10)?,
        checklist,
        archived_at: parse_opt_datetime(row.get(12)?),
        archive_batch: row.get(13)?,
        created_at: parse_datetime_fallback(&row.get::<_, String>(14)?),
        updated_at: parse_datetime_fallback(&row.get::<_, String>(15)?),
    })
}

const HISTORY_COLUMNS: &str = "id, task_id, field, old_value, new_value, changed_at";

/// Build a TaskHistory from a row selected with [`HISTORY_COLUMNS`]
fn row_to_history(row: &rusqlite::Row) -> rusqlite::Result<TaskHistory> {
    Ok(TaskHistory {
        id: row.get(0)?,
        task_id: row.get(1)?,
        field: row.get(2)?,
        old_value: row.get(3)?,
        new_value: row.get(4)?,
        changed_at: parse_datetime_fallback(&row.get::<_, String>(5)?),
    })
}

/// SQLite database for the board hierarchy.
pub struct BoardDb {
    conn: Connection,
}

impl BoardDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/taskboard/taskboard.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()
            .map_err(|e| {
                Error::Database(DatabaseError::OpenFailed {
                    path: "~/.config/taskboard".into(),
                    source: rusqlite::Error::InvalidPath(e.to_string().into()),
                })
            })?
            .join("taskboard.db");
        let conn = Connection::open(&path).map_err(|source| {
            Error::Database(DatabaseError::OpenFailed { path, source })
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and ephemeral boards).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        // Base tables (v1 schema) first
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS projects (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    name        TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    status      TEXT NOT NULL DEFAULT 'ACTIVE',
                    color       TEXT NOT NULL DEFAULT '#3b82f6',
                    created_at  TEXT NOT NULL,
                    updated_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS categories (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    project_id  INTEGER NOT NULL,
                    name        TEXT NOT NULL,
                    order_index INTEGER NOT NULL DEFAULT 0,
                    created_at  TEXT NOT NULL,
                    updated_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS sub_categories (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    category_id INTEGER NOT NULL,
                    project_id  INTEGER NOT NULL,
                    name        TEXT NOT NULL,
                    order_index INTEGER NOT NULL DEFAULT 0,
                    created_at  TEXT NOT NULL,
                    updated_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    id              INTEGER PRIMARY KEY AUTOINCREMENT,
                    sub_category_id INTEGER NOT NULL,
                    category_id     INTEGER NOT NULL,
                    project_id      INTEGER NOT NULL,
                    title           TEXT NOT NULL,
                    description     TEXT NOT NULL DEFAULT '',
                    status          TEXT NOT NULL DEFAULT 'TODO',
                    priority        TEXT NOT NULL DEFAULT 'MEDIUM',
                    assignee        TEXT NOT NULL DEFAULT '',
                    due_date        TEXT NOT NULL DEFAULT '',
                    progress        INTEGER NOT NULL DEFAULT 0,
                    checklist       TEXT NOT NULL DEFAULT '[]',
                    created_at      TEXT NOT NULL,
                    updated_at      TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS task_history (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    task_id    INTEGER NOT NULL,
                    field      TEXT NOT NULL,
                    old_value  TEXT NOT NULL,
                    new_value  TEXT NOT NULL,
                    changed_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_categories_project ON categories(project_id);
                CREATE INDEX IF NOT EXISTS idx_sub_categories_category ON sub_categories(category_id);
                CREATE INDEX IF NOT EXISTS idx_sub_categories_project ON sub_categories(project_id);
                CREATE INDEX IF NOT EXISTS idx_tasks_sub_category ON tasks(sub_category_id);
                CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category_id);
                CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);
                CREATE INDEX IF NOT EXISTS idx_task_history_task ON task_history(task_id);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Incremental migrations (v1 -> v2)
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Archival-state indexes (idempotent, runs after migrations add the columns)
        self.conn
            .execute_batch(
                "CREATE INDEX IF NOT EXISTS idx_projects_archived ON projects(archived_at);
                 CREATE INDEX IF NOT EXISTS idx_categories_archived ON categories(archived_at);
                 CREATE INDEX IF NOT EXISTS idx_sub_categories_archived ON sub_categories(archived_at);
                 CREATE INDEX IF NOT EXISTS idx_tasks_archived ON tasks(archived_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    /// Run `f` inside one BEGIN IMMEDIATE transaction.
    ///
    /// Commits on Ok; rolls back on Err so a failure mid-cascade leaves no
    /// partial state visible.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE TRANSACTION;")
            .map_err(DatabaseError::from)?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT;")
                    .map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    // === Project CRUD ===

    /// Insert a project row. With `preserve_id` the snapshot id is kept
    /// verbatim; otherwise the store assigns a fresh one.
    pub fn insert_project(&self, project: &Project, preserve_id: bool) -> Result<i64> {
        let id: Option<i64> = preserve_id.then_some(project.id);
        self.conn.execute(
            "INSERT INTO projects (id, name, description, status, color, archived_at,
                archive_batch, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                project.name,
                project.description,
                format_project_status(project.status),
                project.color,
                project.archived_at.map(|dt| dt.to_rfc3339()),
                project.archive_batch,
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(if preserve_id {
            project.id
        } else {
            self.conn.last_insert_rowid()
        })
    }

    /// Create a new project.
    pub fn create_project(&self, new: &NewProject) -> Result<Project> {
        let now = Utc::now();
        let mut project = Project {
            id: 0,
            name: new.name.clone(),
            description: new.description.clone(),
            status: new.status,
            color: new.color.clone(),
            archived_at: None,
            archive_batch: None,
            created_at: now,
            updated_at: now,
        };
        project.id = self.insert_project(&project, false)?;
        Ok(project)
    }

    /// Get a project by ID.
    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"))?;
        match stmt.query_row(params![id], row_to_project) {
            Ok(project) => Ok(Some(project)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all projects, oldest first.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_project)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Update a project, refreshing `updated_at`.
    pub fn update_project(&self, id: i64, patch: &ProjectPatch) -> Result<Project> {
        let current = self.get_project(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Project,
            id,
        })?;
        let now = Utc::now();
        self.conn.execute(
            "UPDATE projects
             SET name = ?1, description = ?2, status = ?3, color = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                patch.name.as_ref().unwrap_or(&current.name),
                patch.description.as_ref().unwrap_or(&current.description),
                format_project_status(patch.status.unwrap_or(current.status)),
                patch.color.as_ref().unwrap_or(&current.color),
                now.to_rfc3339(),
                id,
            ],
        )?;
        Ok(Project {
            name: patch.name.clone().unwrap_or_else(|| current.name.clone()),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            status: patch.status.unwrap_or(current.status),
            color: patch.color.clone().unwrap_or_else(|| current.color.clone()),
            updated_at: now,
            ..current
        })
    }

    /// Delete a project row (no cascade; see the deletion service).
    pub fn delete_project_row(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(())
    }

    // === Category CRUD ===

    pub fn insert_category(&self, category: &Category, preserve_id: bool) -> Result<i64> {
        let id: Option<i64> = preserve_id.then_some(category.id);
        self.conn.execute(
            "INSERT INTO categories (id, project_id, name, status, archived_at, archive_batch,
                order_index, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                category.project_id,
                category.name,
                format_group_status(category.status),
                category.archived_at.map(|dt| dt.to_rfc3339()),
                category.archive_batch,
                category.order,
                category.created_at.to_rfc3339(),
                category.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(if preserve_id {
            category.id
        } else {
            self.conn.last_insert_rowid()
        })
    }

    /// Create a new category under a project.
    pub fn create_category(&self, new: &NewCategory) -> Result<Category> {
        let now = Utc::now();
        let mut category = Category {
            id: 0,
            project_id: new.project_id,
            name: new.name.clone(),
            status: GroupStatus::Active,
            archived_at: None,
            archive_batch: None,
            order: new.order,
            created_at: now,
            updated_at: now,
        };
        category.id = self.insert_category(&category, false)?;
        Ok(category)
    }

    /// Get a category by ID.
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
        ))?;
        match stmt.query_row(params![id], row_to_category) {
            Ok(category) => Ok(Some(category)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List every category (full-table dump, archived rows included).
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_category)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// List a project's categories in sibling order.
    pub fn categories_for_project(&self, project_id: i64) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE project_id = ?1 ORDER BY order_index ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![project_id], row_to_category)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Update a category's user-settable fields, refreshing `updated_at`.
    pub fn update_category(&self, id: i64, patch: &CategoryPatch) -> Result<Category> {
        let current = self.get_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::Category,
            id,
        })?;
        let now = Utc::now();
        self.conn.execute(
            "UPDATE categories SET name = ?1, order_index = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                patch.name.as_ref().unwrap_or(&current.name),
                patch.order.unwrap_or(current.order),
                now.to_rfc3339(),
                id,
            ],
        )?;
        Ok(Category {
            name: patch.name.clone().unwrap_or_else(|| current.name.clone()),
            order: patch.order.unwrap_or(current.order),
            updated_at: now,
            ..current
        })
    }

    pub fn delete_category_row(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn delete_categories_for_project(&self, project_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM categories WHERE project_id = ?1",
            params![project_id],
        )?;
        Ok(n)
    }

    // === SubCategory CRUD ===

    pub fn insert_sub_category(&self, sub: &SubCategory, preserve_id: bool) -> Result<i64> {
        let id: Option<i64> = preserve_id.then_some(sub.id);
        self.conn.execute(
            "INSERT INTO sub_categories (id, category_id, project_id, name, status, archived_at,
                archive_batch, order_index, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                sub.category_id,
                sub.project_id,
                sub.name,
                format_group_status(sub.status),
                sub.archived_at.map(|dt| dt.to_rfc3339()),
                sub.archive_batch,
                sub.order,
                sub.created_at.to_rfc3339(),
                sub.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(if preserve_id {
            sub.id
        } else {
            self.conn.last_insert_rowid()
        })
    }

    /// Create a new subcategory under a category.
    pub fn create_sub_category(&self, new: &NewSubCategory) -> Result<SubCategory> {
        let now = Utc::now();
        let mut sub = SubCategory {
            id: 0,
            category_id: new.category_id,
            project_id: new.project_id,
            name: new.name.clone(),
            status: GroupStatus::Active,
            archived_at: None,
            archive_batch: None,
            order: new.order,
            created_at: now,
            updated_at: now,
        };
        sub.id = self.insert_sub_category(&sub, false)?;
        Ok(sub)
    }

    /// Get a subcategory by ID.
    pub fn get_sub_category(&self, id: i64) -> Result<Option<SubCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUB_CATEGORY_COLUMNS} FROM sub_categories WHERE id = ?1"
        ))?;
        match stmt.query_row(params![id], row_to_sub_category) {
            Ok(sub) => Ok(Some(sub)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List every subcategory (full-table dump, archived rows included).
    pub fn list_sub_categories(&self) -> Result<Vec<SubCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUB_CATEGORY_COLUMNS} FROM sub_categories ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_sub_category)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// List a category's subcategories in sibling order.
    pub fn sub_categories_for_category(&self, category_id: i64) -> Result<Vec<SubCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUB_CATEGORY_COLUMNS} FROM sub_categories
             WHERE category_id = ?1 ORDER BY order_index ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![category_id], row_to_sub_category)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn sub_categories_for_project(&self, project_id: i64) -> Result<Vec<SubCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUB_CATEGORY_COLUMNS} FROM sub_categories
             WHERE project_id = ?1 ORDER BY order_index ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![project_id], row_to_sub_category)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Update a subcategory's user-settable fields, refreshing `updated_at`.
    pub fn update_sub_category(&self, id: i64, patch: &SubCategoryPatch) -> Result<SubCategory> {
        let current = self.get_sub_category(id)?.ok_or(Error::NotFound {
            kind: EntityKind::SubCategory,
            id,
        })?;
        let now = Utc::now();
        self.conn.execute(
            "UPDATE sub_categories SET name = ?1, order_index = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                patch.name.as_ref().unwrap_or(&current.name),
                patch.order.unwrap_or(current.order),
                now.to_rfc3339(),
                id,
            ],
        )?;
        Ok(SubCategory {
            name: patch.name.clone().unwrap_or_else(|| current.name.clone()),
            order: patch.order.unwrap_or(current.order),
            updated_at: now,
            ..current
        })
    }

    pub fn delete_sub_category_row(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM sub_categories WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn delete_sub_categories_for_category(&self, category_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM sub_categories WHERE category_id = ?1",
            params![category_id],
        )?;
        Ok(n)
    }

    pub fn delete_sub_categories_for_project(&self, project_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM sub_categories WHERE project_id = ?1",
            params![project_id],
        )?;
        Ok(n)
    }

    // === Task CRUD ===

    pub fn insert_task(&self, task: &Task, preserve_id: bool) -> Result<i64> {
        let id: Option<i64> = preserve_id.then_some(task.id);
        let checklist_json =
            serde_json::to_string(&task.checklist).unwrap_or_else(|_| "[]".to_string());
        self.conn.execute(
            "INSERT INTO tasks (id, sub_category_id, category_id, project_id, title, description,
                status, priority, assignee, due_date, progress, checklist, archived_at,
                archive_batch, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                id,
                task.sub_category_id,
                task.category_id,
                task.project_id,
                task.title,
                task.description,
                format_task_status(task.status),
                format_task_priority(task.priority),
                task.assignee,
                task.due_date,
                task.progress,
                checklist_json,
                task.archived_at.map(|dt| dt.to_rfc3339()),
                task.archive_batch,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(if preserve_id {
            task.id
        } else {
            self.conn.last_insert_rowid()
        })
    }

    /// Create a new task. Never triggers propagation, even when the task is
    /// created DONE.
    pub fn create_task(&self, new: &NewTask) -> Result<Task> {
        let now = Utc::now();
        let mut task = Task {
            id: 0,
            sub_category_id: new.sub_category_id,
            category_id: new.category_id,
            project_id: new.project_id,
            title: new.title.clone(),
            description: new.description.clone(),
            status: new.status,
            priority: new.priority,
            assignee: new.assignee.clone(),
            due_date: new.due_date.clone(),
            progress: new.progress,
            checklist: new.checklist.clone(),
            archived_at: None,
            archive_batch: None,
            created_at: now,
            updated_at: now,
        };
        task.id = self.insert_task(&task, false)?;
        Ok(task)
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
        match stmt.query_row(params![id], row_to_task) {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List every task (full-table dump, archived rows included).
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"))?;
        let rows = stmt.query_map([], row_to_task)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn tasks_for_sub_category(&self, sub_category_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE sub_category_id = ?1 ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![sub_category_id], row_to_task)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn tasks_for_category(&self, category_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE category_id = ?1 ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![category_id], row_to_task)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn tasks_for_project(&self, project_id: i64) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE project_id = ?1 ORDER BY created_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![project_id], row_to_task)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Write a full task row back (used by the propagation engine after a
    /// patch has been applied in memory).
    pub fn update_task_row(&self, task: &Task) -> Result<()> {
        let checklist_json =
            serde_json::to_string(&task.checklist).unwrap_or_else(|_| "[]".to_string());
        self.conn.execute(
            "UPDATE tasks
             SET sub_category_id = ?1, category_id = ?2, project_id = ?3, title = ?4,
                 description = ?5, status = ?6, priority = ?7, assignee = ?8, due_date = ?9,
                 progress = ?10, checklist = ?11, archived_at = ?12, archive_batch = ?13,
                 updated_at = ?14
             WHERE id = ?15",
            params![
                task.sub_category_id,
                task.category_id,
                task.project_id,
                task.title,
                task.description,
                format_task_status(task.status),
                format_task_priority(task.priority),
                task.assignee,
                task.due_date,
                task.progress,
                checklist_json,
                task.archived_at.map(|dt| dt.to_rfc3339()),
                task.archive_batch,
                task.updated_at.to_rfc3339(),
                task.id,
            ],
        )?;
        Ok(())
    }

    pub fn delete_task_row(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn delete_tasks_for_sub_category(&self, sub_category_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM tasks WHERE sub_category_id = ?1",
            params![sub_category_id],
        )?;
        Ok(n)
    }

    pub fn delete_tasks_for_category(&self, category_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM tasks WHERE category_id = ?1",
            params![category_id],
        )?;
        Ok(n)
    }

    pub fn delete_tasks_for_project(&self, project_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM tasks WHERE project_id = ?1",
            params![project_id],
        )?;
        Ok(n)
    }

    // === Status transitions ===
    //
    // The only writers of group status. Guarded in SQL so an illegal
    // transition is a no-op, and the return value says whether anything
    // changed.

    pub fn complete_category(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE categories SET status = 'COMPLETED', updated_at = ?2
             WHERE id = ?1 AND status = 'ACTIVE'",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    pub fn reopen_category(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE categories SET status = 'ACTIVE', updated_at = ?2
             WHERE id = ?1 AND status = 'COMPLETED'",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    pub fn complete_sub_category(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE sub_categories SET status = 'COMPLETED', updated_at = ?2
             WHERE id = ?1 AND status = 'ACTIVE'",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    pub fn reopen_sub_category(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE sub_categories SET status = 'ACTIVE', updated_at = ?2
             WHERE id = ?1 AND status = 'COMPLETED'",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    // === Archival stamps ===
    //
    // Stamping skips rows that are already archived, so an entity archived
    // independently keeps its own timestamp and batch token.

    pub fn stamp_project_archived(
        &self,
        id: i64,
        at: DateTime<Utc>,
        batch: &str,
    ) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE projects SET archived_at = ?2, archive_batch = ?3, updated_at = ?2
             WHERE id = ?1 AND archived_at IS NULL",
            params![id, at.to_rfc3339(), batch],
        )?;
        Ok(n > 0)
    }

    pub fn stamp_category_archived(
        &self,
        id: i64,
        at: DateTime<Utc>,
        batch: &str,
    ) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE categories SET archived_at = ?2, archive_batch = ?3, updated_at = ?2
             WHERE id = ?1 AND archived_at IS NULL",
            params![id, at.to_rfc3339(), batch],
        )?;
        Ok(n > 0)
    }

    pub fn stamp_sub_category_archived(
        &self,
        id: i64,
        at: DateTime<Utc>,
        batch: &str,
    ) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE sub_categories SET archived_at = ?2, archive_batch = ?3, updated_at = ?2
             WHERE id = ?1 AND archived_at IS NULL",
            params![id, at.to_rfc3339(), batch],
        )?;
        Ok(n > 0)
    }

    pub fn stamp_task_archived(&self, id: i64, at: DateTime<Utc>, batch: &str) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE tasks SET archived_at = ?2, archive_batch = ?3, updated_at = ?2
             WHERE id = ?1 AND archived_at IS NULL",
            params![id, at.to_rfc3339(), batch],
        )?;
        Ok(n > 0)
    }

    pub fn stamp_sub_categories_archived_for_category(
        &self,
        category_id: i64,
        at: DateTime<Utc>,
        batch: &str,
    ) -> Result<usize> {
        let n = self.conn.execute(
            "UPDATE sub_categories SET archived_at = ?2, archive_batch = ?3, updated_at = ?2
             WHERE category_id = ?1 AND archived_at IS NULL",
            params![category_id, at.to_rfc3339(), batch],
        )?;
        Ok(n)
    }

    pub fn stamp_tasks_archived_for_category(
        &self,
        category_id: i64,
        at: DateTime<Utc>,
        batch: &str,
    ) -> Result<usize> {
        let n = self.conn.execute(
            "UPDATE tasks SET archived_at = ?2, archive_batch = ?3, updated_at = ?2
             WHERE category_id = ?1 AND archived_at IS NULL",
            params![category_id, at.to_rfc3339(), batch],
        )?;
        Ok(n)
    }

    pub fn stamp_tasks_archived_for_sub_category(
        &self,
        sub_category_id: i64,
        at: DateTime<Utc>,
        batch: &str,
    ) -> Result<usize> {
        let n = self.conn.execute(
            "UPDATE tasks SET archived_at = ?2, archive_batch = ?3, updated_at = ?2
             WHERE sub_category_id = ?1 AND archived_at IS NULL",
            params![sub_category_id, at.to_rfc3339(), batch],
        )?;
        Ok(n)
    }

    // === Archival clears ===

    pub fn clear_project_archived(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE projects SET archived_at = NULL, archive_batch = NULL, updated_at = ?2
             WHERE id = ?1",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    /// Clear a category's archival and reset its status to ACTIVE
    /// (restore is an explicit reopen).
    pub fn clear_category_archived(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE categories
             SET archived_at = NULL, archive_batch = NULL, status = 'ACTIVE', updated_at = ?2
             WHERE id = ?1",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    pub fn clear_sub_category_archived(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE sub_categories
             SET archived_at = NULL, archive_batch = NULL, status = 'ACTIVE', updated_at = ?2
             WHERE id = ?1",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    pub fn clear_task_archived(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE tasks SET archived_at = NULL, archive_batch = NULL, updated_at = ?2
             WHERE id = ?1",
            params![id, now.to_rfc3339()],
        )?;
        Ok(n > 0)
    }

    // === Archived listings ===

    pub fn archived_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE archived_at IS NOT NULL"
        ))?;
        let rows = stmt.query_map([], row_to_project)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn archived_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE archived_at IS NOT NULL"
        ))?;
        let rows = stmt.query_map([], row_to_category)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn archived_sub_categories(&self) -> Result<Vec<SubCategory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUB_CATEGORY_COLUMNS} FROM sub_categories WHERE archived_at IS NOT NULL"
        ))?;
        let rows = stmt.query_map([], row_to_sub_category)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn archived_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE archived_at IS NOT NULL"
        ))?;
        let rows = stmt.query_map([], row_to_task)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    // === Task history ===

    /// Append an audit record for one changed field.
    pub fn add_history(
        &self,
        task_id: i64,
        field: &str,
        old_value: &str,
        new_value: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO task_history (task_id, field, old_value, new_value, changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![task_id, field, old_value, new_value, changed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_task_history(&self, record: &TaskHistory, preserve_id: bool) -> Result<i64> {
        let id: Option<i64> = preserve_id.then_some(record.id);
        self.conn.execute(
            "INSERT INTO task_history (id, task_id, field, old_value, new_value, changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id,
                record.task_id,
                record.field,
                record.old_value,
                record.new_value,
                record.changed_at.to_rfc3339(),
            ],
        )?;
        Ok(if preserve_id {
            record.id
        } else {
            self.conn.last_insert_rowid()
        })
    }

    /// A task's history, newest first.
    pub fn history_for_task(&self, task_id: i64) -> Result<Vec<TaskHistory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HISTORY_COLUMNS} FROM task_history
             WHERE task_id = ?1 ORDER BY changed_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![task_id], row_to_history)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn list_task_history(&self) -> Result<Vec<TaskHistory>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HISTORY_COLUMNS} FROM task_history ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], row_to_history)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    pub fn delete_history_for_task(&self, task_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM task_history WHERE task_id = ?1",
            params![task_id],
        )?;
        Ok(n)
    }

    // === Bulk ===

    /// Remove every row from all five tables (overwrite import).
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM task_history;
             DELETE FROM tasks;
             DELETE FROM sub_categories;
             DELETE FROM categories;
             DELETE FROM projects;",
        )?;
        Ok(())
    }

    /// Row count of one of the five tables (used by summaries and tests).
    pub fn count(&self, kind: EntityKind) -> Result<i64> {
        let table = match kind {
            EntityKind::Project => "projects",
            EntityKind::Category => "categories",
            EntityKind::SubCategory => "sub_categories",
            EntityKind::Task => "tasks",
        };
        let n = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{NewCategory, NewProject, NewSubCategory, NewTask};

    fn new_project() -> NewProject {
        NewProject {
            name: "Driver".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            color: "#3b82f6".to_string(),
        }
    }

    fn new_task(sub: &SubCategory, title: &str) -> NewTask {
        NewTask {
            sub_category_id: sub.id,
            category_id: sub.category_id,
            project_id: sub.project_id,
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            assignee: String::new(),
            due_date: String::new(),
            progress: 0,
            checklist: Vec::new(),
        }
    }

    fn seed_chain(db: &BoardDb) -> (Project, Category, SubCategory, Task) {
        let project = db.create_project(&new_project()).unwrap();
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
        let task = db.create_task(&new_task(&sub, "Implement connect")).unwrap();
        (project, category, sub, task)
    }

    #[test]
    fn create_and_get_roundtrip() {
        let db = BoardDb::open_memory().unwrap();
        let (project, category, sub, task) = seed_chain(&db);

        assert!(project.id > 0);
        let loaded = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Implement connect");
        assert_eq!(loaded.sub_category_id, sub.id);
        assert_eq!(loaded.category_id, category.id);
        assert_eq!(loaded.project_id, project.id);
        assert!(loaded.archived_at.is_none());
    }

    #[test]
    fn get_missing_returns_none() {
        let db = BoardDb::open_memory().unwrap();
        assert!(db.get_project(42).unwrap().is_none());
        assert!(db.get_task(42).unwrap().is_none());
    }

    #[test]
    fn children_queries_follow_sibling_order() {
        let db = BoardDb::open_memory().unwrap();
        let project = db.create_project(&new_project()).unwrap();
        for (name, order) in [("Later", 5), ("First", 0), ("Middle", 2)] {
            db.create_category(&NewCategory {
                project_id: project.id,
                name: name.to_string(),
                order,
            })
            .unwrap();
        }
        let names: Vec<String> = db
            .categories_for_project(project.id)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["First", "Middle", "Later"]);
    }

    #[test]
    fn update_category_refreshes_updated_at_only_given_fields() {
        let db = BoardDb::open_memory().unwrap();
        let (_, category, ..) = seed_chain(&db);
        let updated = db
            .update_category(
                category.id,
                &CategoryPatch {
                    name: Some("Renamed".to_string()),
                    order: None,
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.order, category.order);
        assert!(updated.updated_at >= category.updated_at);
    }

    #[test]
    fn update_missing_is_not_found() {
        let db = BoardDb::open_memory().unwrap();
        let err = db
            .update_project(99, &ProjectPatch::default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: EntityKind::Project,
                id: 99
            }
        ));
    }

    #[test]
    fn group_status_transitions_are_guarded() {
        let db = BoardDb::open_memory().unwrap();
        let (_, category, ..) = seed_chain(&db);
        let now = Utc::now();

        assert!(db.complete_category(category.id, now).unwrap());
        // Already completed: no-op
        assert!(!db.complete_category(category.id, now).unwrap());
        assert_eq!(
            db.get_category(category.id).unwrap().unwrap().status,
            GroupStatus::Completed
        );

        assert!(db.reopen_category(category.id, now).unwrap());
        assert!(!db.reopen_category(category.id, now).unwrap());
        assert_eq!(
            db.get_category(category.id).unwrap().unwrap().status,
            GroupStatus::Active
        );
    }

    #[test]
    fn archive_stamp_skips_already_archived_rows() {
        let db = BoardDb::open_memory().unwrap();
        let (_, _, sub, _) = seed_chain(&db);
        let first = Utc::now();

        assert!(db.stamp_sub_category_archived(sub.id, first, "batch-1").unwrap());
        assert!(!db.stamp_sub_category_archived(sub.id, Utc::now(), "batch-2").unwrap());

        let loaded = db.get_sub_category(sub.id).unwrap().unwrap();
        assert_eq!(loaded.archive_batch.as_deref(), Some("batch-1"));
    }

    #[test]
    fn clear_category_archived_resets_status() {
        let db = BoardDb::open_memory().unwrap();
        let (_, category, ..) = seed_chain(&db);
        let now = Utc::now();
        db.complete_category(category.id, now).unwrap();
        db.stamp_category_archived(category.id, now, "batch").unwrap();

        db.clear_category_archived(category.id, Utc::now()).unwrap();
        let loaded = db.get_category(category.id).unwrap().unwrap();
        assert!(loaded.archived_at.is_none());
        assert!(loaded.archive_batch.is_none());
        assert_eq!(loaded.status, GroupStatus::Active);
    }

    #[test]
    fn history_is_listed_newest_first() {
        let db = BoardDb::open_memory().unwrap();
        let (.., task) = seed_chain(&db);
        let t0 = Utc::now();
        db.add_history(task.id, "status", "\"TODO\"", "\"IN_PROGRESS\"", t0)
            .unwrap();
        db.add_history(
            task.id,
            "status",
            "\"IN_PROGRESS\"",
            "\"DONE\"",
            t0 + chrono::Duration::seconds(1),
        )
        .unwrap();

        let history = db.history_for_task(task.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].new_value, "\"DONE\"");
        assert_eq!(history[1].new_value, "\"IN_PROGRESS\"");
    }

    #[test]
    fn checklist_roundtrips_through_json_column() {
        let db = BoardDb::open_memory().unwrap();
        let (_, _, sub, _) = seed_chain(&db);
        let mut new = new_task(&sub, "With checklist");
        new.checklist = vec![
            ChecklistItem {
                id: "1".to_string(),
                text: "Define handle type".to_string(),
                done: true,
            },
            ChecklistItem {
                id: "2".to_string(),
                text: "Declare create/destroy".to_string(),
                done: false,
            },
        ];
        let task = db.create_task(&new).unwrap();
        let loaded = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(loaded.checklist, new.checklist);
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let db = BoardDb::open_memory().unwrap();
        let (project, ..) = seed_chain(&db);

        let result: Result<()> = db.transaction(|db| {
            db.update_project(
                project.id,
                &ProjectPatch {
                    name: Some("Changed inside".to_string()),
                    ..Default::default()
                },
            )?;
            Err(Error::NotFound {
                kind: EntityKind::Project,
                id: 12345,
            })
        });
        assert!(result.is_err());

        let loaded = db.get_project(project.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Driver");
    }

    #[test]
    fn insert_preserving_id_keeps_snapshot_id() {
        let db = BoardDb::open_memory().unwrap();
        let now = Utc::now();
        let project = Project {
            id: 77,
            name: "Imported".to_string(),
            description: String::new(),
            status: ProjectStatus::Active,
            color: String::new(),
            archived_at: None,
            archive_batch: None,
            created_at: now,
            updated_at: now,
        };
        let id = db.insert_project(&project, true).unwrap();
        assert_eq!(id, 77);
        assert!(db.get_project(77).unwrap().is_some());

        // Fresh ids continue past the preserved one
        let created = db.create_project(&new_project()).unwrap();
        assert!(created.id > 77);
    }
}
