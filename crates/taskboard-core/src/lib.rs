//! # Taskboard Core Library
//!
//! Core business logic for the Taskboard project/task tracker: a four-level
//! hierarchy (Project → Category → SubCategory → Task) persisted in SQLite,
//! driven through a small set of services. The CLI binary is a thin layer
//! over this library.
//!
//! ## Key components
//!
//! - [`BoardDb`]: entity store with indexed lookups and atomic transactions
//! - [`propagation`]: task updates with history recording and automatic
//!   completion/reopening of ancestor groups
//! - [`archive`]: cascade soft-archival with "archived together" restore
//! - [`deletion`]: permanent cascade removal
//! - [`backup`]: versioned JSON snapshot export/import
//! - [`NotificationQueue`]: undo-capable notification port consumed by the
//!   presentation layer

pub mod archive;
pub mod backup;
pub mod board;
pub mod deletion;
pub mod error;
pub mod history;
pub mod notify;
pub mod progress;
pub mod propagation;
pub mod seed;
pub mod storage;

pub use board::{
    Category, ChecklistItem, EntityKind, GroupStatus, Project, ProjectStatus, SubCategory, Task,
    TaskHistory, TaskPatch, TaskPriority, TaskStatus,
};
pub use error::{ConfigError, DatabaseError, Error, Result};
pub use notify::{Notification, NotificationQueue, UndoAction};
pub use storage::{BoardDb, Config};
