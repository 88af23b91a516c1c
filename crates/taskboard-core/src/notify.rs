//! Notification port between the propagation engine and the presentation
//! layer.
//!
//! The engine appends entries; a consumer drains them and decides how long
//! they stay visible. Undo is carried as data ([`UndoAction`]) rather than a
//! callback, so the queue stays serializable and the consumer chooses when
//! (and whether) to apply it via `propagation::undo`.

use serde::{Deserialize, Serialize};

/// A reversible follow-up attached to a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UndoAction {
    /// Reopen an auto-completed subcategory, and the category that completed
    /// together with it, if any.
    ReopenSubCategory {
        sub_category_id: i64,
        category_id: Option<i64>,
    },
    /// Reopen an auto-completed category only.
    ReopenCategory { category_id: i64 },
}

/// One entry in the notification queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub undo: Option<UndoAction>,
}

/// FIFO queue of notifications awaiting display.
///
/// Appends are infallible: notifications are fire-and-forget and never roll
/// back the state change that produced them.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    next_id: u64,
    entries: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and return its id.
    pub fn push(&mut self, message: impl Into<String>, undo: Option<UndoAction>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(Notification {
            id,
            message: message.into(),
            undo,
        });
        id
    }

    /// Remove and return all pending notifications, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }

    /// Dismiss a single notification by id.
    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_increasing_ids() {
        let mut queue = NotificationQueue::new();
        let a = queue.push("first", None);
        let b = queue.push(
            "second",
            Some(UndoAction::ReopenCategory { category_id: 3 }),
        );
        assert!(b > a);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn drain_empties_the_queue_in_order() {
        let mut queue = NotificationQueue::new();
        queue.push("first", None);
        queue.push("second", None);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert!(queue.is_empty());
    }

    #[test]
    fn dismiss_removes_only_the_target() {
        let mut queue = NotificationQueue::new();
        let a = queue.push("first", None);
        queue.push("second", None);

        queue.dismiss(a);
        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].message, "second");
    }
}
