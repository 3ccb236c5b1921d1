use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{info, warn};

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// At most this many notifications are queued; older ones drop first.
const MAX_QUEUED: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
}

/// Toast-style notification queue. The oldest live notification is shown.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, level: NotificationLevel, message: String, now: Instant) {
        if self.queue.len() == MAX_QUEUED {
            self.queue.pop_front();
        }
        self.queue.push_back(Notification {
            level,
            message,
            created_at: now,
        });
    }

    pub fn push_success(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        info!(%message, "Notification");
        self.push(NotificationLevel::Success, message, now);
    }

    pub fn push_error(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        warn!(%message, "Error notification");
        self.push(NotificationLevel::Error, message, now);
    }

    /// Drop expired notifications and return the one to display.
    pub fn current(&mut self, now: Instant) -> Option<&Notification> {
        while self
            .queue
            .front()
            .is_some_and(|n| now.saturating_duration_since(n.created_at) >= NOTIFICATION_TTL)
        {
            self.queue.pop_front();
        }
        self.queue.front()
    }

    /// The notification to display, without pruning.
    pub fn visible(&self, now: Instant) -> Option<&Notification> {
        self.queue
            .iter()
            .find(|n| now.saturating_duration_since(n.created_at) < NOTIFICATION_TTL)
    }

    pub fn dismiss(&mut self) {
        self.queue.pop_front();
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_expire_in_order() {
        let now = Instant::now();
        let mut notes = Notifications::new();
        notes.push_success("Сохранено", now);
        notes.push_error("Ошибка", now + Duration::from_secs(2));

        assert_eq!(notes.current(now).map(|n| n.level), Some(NotificationLevel::Success));
        let later = now + NOTIFICATION_TTL;
        let shown = notes.current(later).unwrap();
        assert_eq!(shown.level, NotificationLevel::Error);
        assert_eq!(shown.message, "Ошибка");
        assert!(notes.current(later + Duration::from_secs(2)).is_none());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let now = Instant::now();
        let mut notes = Notifications::new();
        for i in 0..20 {
            notes.push_success(format!("n{}", i), now);
        }
        assert_eq!(notes.len(), MAX_QUEUED);
        assert_eq!(notes.current(now).unwrap().message, "n12");
    }

    #[test]
    fn test_visible_skips_expired_without_pruning() {
        let now = Instant::now();
        let mut notes = Notifications::new();
        notes.push_error("старое", now);
        notes.push_success("новое", now + Duration::from_secs(3));

        let later = now + NOTIFICATION_TTL;
        assert_eq!(notes.visible(later).unwrap().message, "новое");
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_dismiss() {
        let now = Instant::now();
        let mut notes = Notifications::new();
        notes.push_success("a", now);
        notes.push_success("b", now);
        notes.dismiss();
        assert_eq!(notes.current(now).unwrap().message, "b");
    }
}
