use std::collections::VecDeque;
use tracing::{error, info, warn};

const MAX_NOTICES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient, user-facing message (the toast of a list page)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Pending notices, oldest first. Every notice is also logged.
#[derive(Debug, Default)]
pub struct NoticeQueue {
    notices: VecDeque<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Error => error!(target: "table_view", "{}", message),
            NoticeLevel::Warning => warn!(target: "table_view", "{}", message),
            NoticeLevel::Info | NoticeLevel::Success => info!(target: "table_view", "{}", message),
        }
        if self.notices.len() >= MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice { level, message });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    /// Take every pending notice
    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_order_and_cap() {
        let mut queue = NoticeQueue::new();
        queue.success("Saved");
        queue.error("Failed to load");
        assert_eq!(queue.latest().unwrap().level, NoticeLevel::Error);

        let drained = queue.drain();
        assert_eq!(drained[0].message, "Saved");
        assert!(queue.is_empty());

        for i in 0..(MAX_NOTICES + 3) {
            queue.info(format!("n{}", i));
        }
        assert_eq!(queue.len(), MAX_NOTICES);
        assert_eq!(queue.drain()[0].message, "n3");
    }
}
