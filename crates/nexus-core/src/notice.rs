//! Transient user-visible messages.
//!
//! Notices are the toast/snackbar channel. They are fire-and-forget: nothing
//! stores them, and a notice sent while nobody is subscribed is dropped.

use tokio::sync::broadcast;

const NOTICE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short-lived message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Cloneable sending half of the notice channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTICE_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    pub fn send(&self, notice: Notice) {
        tracing::debug!("Notice ({:?}): {}", notice.level, notice.text);
        // No receivers is fine; notices are never queued for later.
        let _ = self.sender.send(notice);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.send(Notice::info(text));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.send(Notice::error(text));
    }
}

/// Drain every notice currently buffered on `receiver`.
pub fn drain(receiver: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(notice) => notices.push(notice),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Dropped {} notices", skipped);
            }
            Err(_) => break,
        }
    }
    notices
}
