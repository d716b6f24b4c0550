//! Decoder diagnostics.
//!
//! Non-fatal issues met while decoding (bad checksums, records that fail
//! to parse, orphaned handles) are collected as [`Notification`] items
//! instead of aborting the read. The collection is owned by the reader and
//! lent to every stage, so there is no global logger to configure.
//!
//! When the collection is not silent every notification is also forwarded
//! to [`tracing`], which lets an application route decoder diagnostics
//! through its own subscriber.

use std::fmt;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// A record/section kind is recognised but has no decoder.
    NotImplemented,
    /// Feature exists but is not supported in this context.
    NotSupported,
    /// Non-fatal warning (e.g. checksum mismatch, duplicate handle).
    Warning,
    /// Error that was recovered from (e.g. a record that failed to decode).
    Error,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImplemented => write!(f, "NotImplemented"),
            Self::NotSupported => write!(f, "NotSupported"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A single notification produced during decoding.
#[derive(Debug, Clone)]
pub struct Notification {
    /// The severity / category.
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

/// Collects notifications during a decode run.
#[derive(Debug, Clone)]
pub struct NotificationCollection {
    items: Vec<Notification>,
    silent: bool,
}

impl Default for NotificationCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCollection {
    /// Create an empty, silent collection.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            silent: true,
        }
    }

    /// Create an empty collection that forwards to `tracing` unless `silent`.
    pub fn with_silent(silent: bool) -> Self {
        Self {
            items: Vec::new(),
            silent,
        }
    }

    /// Whether notifications stay in the collection only.
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Record a notification.
    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        let notification = Notification::new(notification_type, message);
        if !self.silent {
            match notification_type {
                NotificationType::Error => tracing::error!("{}", notification.message),
                NotificationType::Warning => tracing::warn!("{}", notification.message),
                NotificationType::NotImplemented | NotificationType::NotSupported => {
                    tracing::debug!("{}", notification)
                }
            }
        }
        self.items.push(notification);
    }

    /// Shorthand for a [`NotificationType::Warning`].
    pub fn warn(&mut self, message: impl Into<String>) {
        self.notify(NotificationType::Warning, message);
    }

    /// Shorthand for a [`NotificationType::Error`].
    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationType::Error, message);
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

    /// Check whether any notification of the given type exists.
    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    /// Move every notification of `other` into this collection.
    pub fn append(&mut self, other: NotificationCollection) {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_creation() {
        let n = Notification::new(NotificationType::Warning, "handle missing");
        assert_eq!(n.notification_type, NotificationType::Warning);
        assert_eq!(n.message, "handle missing");
    }

    #[test]
    fn test_collection_basics() {
        let mut c = NotificationCollection::new();
        assert!(c.is_empty());
        assert!(c.is_silent());

        c.warn("w1");
        c.error("e1");
        c.notify(NotificationType::Warning, "w2");

        assert_eq!(c.len(), 3);
        assert_eq!(c.of_type(NotificationType::Warning).len(), 2);
        assert!(c.has_type(NotificationType::Error));
        assert!(!c.has_type(NotificationType::NotImplemented));
    }

    #[test]
    fn test_non_silent_still_records() {
        let mut c = NotificationCollection::with_silent(false);
        c.warn("checksum mismatch");
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_append() {
        let mut a = NotificationCollection::new();
        a.warn("a");
        let mut b = NotificationCollection::new();
        b.error("b");
        a.append(b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_display() {
        let n = Notification::new(NotificationType::NotImplemented, "MLINE record");
        assert_eq!(format!("{}", n), "[NotImplemented] MLINE record");
    }
}
