use std::sync::{Arc, Mutex};

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-facing message (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn success(&self, message: &str) {
        self.notify(Notice::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::error(message));
    }
}

/// Terminal front-end: successes on stdout, errors on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✔ {}", notice.message),
            NoticeLevel::Error => eprintln!("✖ {}", notice.message),
        }
    }
}

/// Keeps every notice in order; used by tests and by callers that render
/// notices themselves.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").last().cloned()
    }

    pub fn clear(&self) {
        self.notices.lock().expect("notifier mutex poisoned").clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        info!(level = ?notice.level, notice = %notice.message, "notice");
        self.notices.lock().expect("notifier mutex poisoned").push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("Saved");
        notifier.error("Nope");
        assert_eq!(notifier.messages(), vec!["Saved", "Nope"]);
        assert_eq!(notifier.last().map(|n| n.level), Some(NoticeLevel::Error));
        notifier.clear();
        assert!(notifier.notices().is_empty());
    }
}
