//! Load diagnostics.
//!
//! Non-fatal issues found while loading (repairs made by the recovery
//! loader, entity types dropped on save, legacy upgrades) are collected as
//! `Notification` items instead of being silently dropped or causing hard
//! errors. After a load the caller can inspect
//! [`CadDocument::notifications`](crate::CadDocument::notifications).

use std::fmt;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// The recovery loader changed or dropped something to keep going.
    Repair,
    /// Something could not be repaired and was lost.
    Failure,
    /// Non-fatal oddity, nothing was changed.
    Warning,
    /// Legacy content was converted to a newer representation.
    Upgrade,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repair => write!(f, "Repair"),
            Self::Failure => write!(f, "Failure"),
            Self::Warning => write!(f, "Warning"),
            Self::Upgrade => write!(f, "Upgrade"),
        }
    }
}

/// A single notification produced during loading or saving.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The category.
    pub notification_type: NotificationType,
    /// A human-readable description of the issue.
    pub message: String,
}

impl Notification {
    /// Create a new notification.
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.notification_type, self.message)
    }
}

/// Collects notifications during a load or save.
#[derive(Debug, Clone, Default)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification.
    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        let message = message.into();
        match notification_type {
            NotificationType::Failure => tracing::warn!(%message, "load failure"),
            NotificationType::Repair => tracing::info!(%message, "repair"),
            _ => tracing::debug!(kind = %notification_type, %message),
        }
        self.items.push(Notification::new(notification_type, message));
    }

    /// Check if there are any notifications.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of notifications.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all notifications.
    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    /// Get all notifications of a specific type.
    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    /// Messages of all notifications of a specific type.
    pub fn messages(&self, nt: NotificationType) -> Vec<String> {
        self.items
            .iter()
            .filter(|n| n.notification_type == nt)
            .map(|n| n.message.clone())
            .collect()
    }

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Append all notifications of `other`.
    pub fn extend(&mut self, other: NotificationCollection) {
        self.items.extend(other.items);
    }

    /// Consume the collection into a `Vec`.
    pub fn into_vec(self) -> Vec<Notification> {
        self.items
    }
}

impl IntoIterator for NotificationCollection {
    type Item = Notification;
    type IntoIter = std::vec::IntoIter<Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
