//! Notification system for the TUI.

use crate::nav::Screen;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Retry,
    Dismiss,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub action: Option<NotificationAction>,
    /// Screen whose list produced this notification, if any.
    pub screen: Option<Screen>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            action: None,
            screen: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_screen(mut self, screen: Screen) -> Self {
        self.screen = Some(screen);
        self
    }

    pub fn label(&self) -> &'static str {
        match self.level {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        }
    }

    /// Key hint shown next to the message.
    pub fn hint(&self) -> Option<&'static str> {
        match self.action {
            Some(NotificationAction::Retry) => Some("r retry"),
            Some(NotificationAction::Dismiss) => Some("Esc dismiss"),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_hint() {
        let note = Notification::new(NotificationLevel::Error, "boom")
            .with_action(NotificationAction::Retry);
        assert_eq!(note.label(), "ERROR");
        assert_eq!(note.hint(), Some("r retry"));
        assert_eq!(Notification::new(NotificationLevel::Info, "ok").hint(), None);
    }
}
