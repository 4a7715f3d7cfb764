//! Transient user notifications
//!
//! Mutation failures are surfaced as notices on a broadcast channel; the
//! hosting application decides how to display them. Notices are lossy:
//! with no subscriber they are dropped, never queued.

use oxbow_types::Notice;
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CAPACITY: usize = 32;

/// Broadcast hub for transient notices
#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notice>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        NotificationHub { tx }
    }

    /// Publish a notice to all current subscribers
    pub fn publish(&self, notice: Notice) {
        debug!(level = ?notice.level, message = %notice.message, "notice");
        let _ = self.tx.send(notice);
    }

    /// Subscribe to notices published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
