// SPDX-License-Identifier: MPL-2.0
//! Notification lifecycle management.
//!
//! The `Manager` handles queuing, display timing, and dismissal of notifications.
//! It limits the number of visible toasts and manages auto-dismiss timers.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{error, warn};

use super::notification::{Notification, NotificationId, Severity};

/// Maximum number of notifications visible at once.
pub const MAX_VISIBLE: usize = 3;

/// Manages the notification queue and visible notifications.
#[derive(Debug, Default)]
pub struct Manager {
    /// Currently visible notifications (newest first).
    visible: VecDeque<Notification>,
    /// Queued notifications waiting to be displayed.
    queue: VecDeque<Notification>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a new notification to be displayed.
    ///
    /// If fewer than `MAX_VISIBLE` notifications are showing, it's displayed
    /// immediately. Otherwise, it's added to the queue and shown when space
    /// becomes available. Warnings and errors are also logged.
    pub fn push(&mut self, notification: Notification) {
        match notification.severity() {
            Severity::Warning => warn!(
                key = notification.message_key(),
                detail = notification.detail(),
                "notification"
            ),
            Severity::Error => error!(
                key = notification.message_key(),
                detail = notification.detail(),
                "notification"
            ),
            Severity::Success | Severity::Info => {}
        }

        if self.visible.len() < MAX_VISIBLE {
            self.visible.push_front(notification);
        } else {
            self.queue.push_back(notification);
        }
    }

    /// Dismisses a notification by its ID.
    ///
    /// Returns `true` if the notification was found and removed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if let Some(pos) = self.visible.iter().position(|n| n.id() == id) {
            self.visible.remove(pos);
            self.promote_from_queue();
            return true;
        }

        if let Some(pos) = self.queue.iter().position(|n| n.id() == id) {
            self.queue.remove(pos);
            return true;
        }

        false
    }

    /// Dismisses every visible notification that has expired.
    ///
    /// Should be called periodically (e.g., every 100-500ms).
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        let to_dismiss: Vec<NotificationId> = self
            .visible
            .iter()
            .filter(|n| n.should_auto_dismiss_at(now))
            .map(Notification::id)
            .collect();

        for id in to_dismiss {
            self.dismiss(id);
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.visible.iter()
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether there are any notifications (visible or queued).
    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.visible.is_empty() || !self.queue.is_empty()
    }

    /// Returns whether a notification with `key` is visible or queued.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.visible
            .iter()
            .chain(self.queue.iter())
            .any(|n| n.message_key() == key)
    }

    /// Removes every notification, visible ones first (newest first), then
    /// the queue in arrival order.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut drained: Vec<Notification> = self.visible.drain(..).collect();
        drained.extend(self.queue.drain(..));
        drained
    }

    pub fn clear(&mut self) {
        self.visible.clear();
        self.queue.clear();
    }

    /// Removes warnings and errors. Called once a form submission succeeds so
    /// stale validation and auth failures don't linger.
    pub fn clear_failures(&mut self) {
        let visible_before = self.visible.len();
        let is_failure = |n: &Notification| {
            matches!(n.severity(), Severity::Warning | Severity::Error)
        };
        self.visible.retain(|n| !is_failure(n));
        self.queue.retain(|n| !is_failure(n));

        if self.visible.len() < visible_before {
            self.promote_from_queue();
        }
    }

    fn promote_from_queue(&mut self) {
        while self.visible.len() < MAX_VISIBLE {
            if let Some(notification) = self.queue.pop_front() {
                self.visible.push_back(notification);
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_manager_is_empty() {
        let manager = Manager::new();
        assert_eq!(manager.visible_count(), 0);
        assert_eq!(manager.queued_count(), 0);
        assert!(!manager.has_notifications());
    }

    #[test]
    fn push_queues_when_visible_is_full() {
        let mut manager = Manager::new();

        for i in 0..MAX_VISIBLE {
            manager.push(Notification::success(format!("test-{i}")));
        }
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);

        manager.push(Notification::success("queued"));
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 1);
        assert!(manager.contains_key("queued"));
    }

    #[test]
    fn dismiss_promotes_from_queue() {
        let mut manager = Manager::new();

        let mut first_id = None;
        for i in 0..MAX_VISIBLE {
            let n = Notification::success(format!("visible-{i}"));
            if i == 0 {
                first_id = Some(n.id());
            }
            manager.push(n);
        }
        manager.push(Notification::success("queued"));
        assert_eq!(manager.queued_count(), 1);

        assert!(manager.dismiss(first_id.unwrap()));

        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);
    }

    #[test]
    fn dismiss_nonexistent_returns_false() {
        let mut manager = Manager::new();
        let fake_id = Notification::success("temp").id();

        assert!(!manager.dismiss(fake_id));
    }

    #[test]
    fn tick_expires_transient_notifications_only() {
        let mut manager = Manager::new();
        let success = Notification::success("signedIn");
        let start = success.created_at();
        manager.push(success);
        manager.push(Notification::warning("passwordMismatch"));
        manager.push(Notification::error("networkError"));

        manager.tick_at(start + Duration::from_secs(4));
        assert!(!manager.contains_key("signedIn"));
        assert!(manager.contains_key("passwordMismatch"));

        manager.tick_at(start + Duration::from_secs(60));
        assert!(!manager.contains_key("passwordMismatch"));
        assert_eq!(manager.visible_count(), 1);
        assert!(manager.contains_key("networkError"));
    }

    #[test]
    fn clear_failures_keeps_success_and_info() {
        let mut manager = Manager::new();
        manager.push(Notification::warning("passwordTooShort"));
        manager.push(Notification::error("invalidCredentials"));
        manager.push(Notification::info("languageChanged"));
        manager.push(Notification::success("signedIn"));

        assert_eq!(manager.visible_count(), 3);
        assert_eq!(manager.queued_count(), 1);

        manager.clear_failures();

        assert_eq!(manager.visible_count(), 2);
        assert_eq!(manager.queued_count(), 0);
        for notification in manager.visible() {
            assert!(matches!(
                notification.severity(),
                Severity::Success | Severity::Info
            ));
        }
    }

    #[test]
    fn drain_returns_visible_and_queued() {
        let mut manager = Manager::new();
        for i in 0..5 {
            manager.push(Notification::info(format!("note-{i}")));
        }
        assert_eq!(manager.queued_count(), 2);

        let keys: Vec<String> = manager
            .drain()
            .iter()
            .map(|n| n.message_key().to_string())
            .collect();
        assert_eq!(keys, ["note-2", "note-1", "note-0", "note-3", "note-4"]);
        assert!(!manager.has_notifications());
    }

    #[test]
    fn clear_removes_all() {
        let mut manager = Manager::new();
        for i in 0..5 {
            manager.push(Notification::success(format!("test-{i}")));
        }

        manager.clear();
        assert!(!manager.has_notifications());
    }
}
