//! Non-blocking shopper notices.
//!
//! Cart failures never surface as errors from the mutation API; the
//! service drops a notice on this channel instead and the UI decides how
//! to show it. A dropped receiver degrades to logging only.

use jiff::Timestamp;
use tokio::sync::mpsc;
use tracing::debug;

/// What went wrong, from the shopper's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The saved cart snapshot could not be restored.
    CartRestoreFailed,

    /// The server-held cart could not be fetched.
    CartSyncFailed,

    /// An advisory push to the server-held cart failed.
    CartPushFailed,
}

/// A single notice: kind, display message, and when it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Failure category, for UI affordances such as a retry button.
    pub kind: NoticeKind,

    /// Human-readable message, e.g. "failed to load your saved cart".
    pub message: String,

    /// When the notice was raised.
    pub at: Timestamp,
}

/// Sending half of the notice channel.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSender {
    /// Raises a notice. Never blocks; if nobody is listening the notice
    /// is logged and dropped.
    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let notice = Notice {
            kind,
            message: message.into(),
            at: Timestamp::now(),
        };

        if let Err(unsent) = self.tx.send(notice) {
            debug!(notice = ?unsent.0, "notice dropped: no receiver");
        }
    }
}

/// Creates the notice channel: a sender for the cart service and a
/// receiver for the UI layer.
pub fn channel() -> (NoticeSender, mpsc::UnboundedReceiver<Notice>) {
    let (tx, rx) = mpsc::unbounded_channel();

    (NoticeSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notices_arrive_in_order() {
        let (sender, mut receiver) = channel();

        sender.notify(NoticeKind::CartRestoreFailed, "failed to load your saved cart");
        sender.notify(NoticeKind::CartSyncFailed, "cart sync failed");

        let first = receiver.recv().await;
        let second = receiver.recv().await;

        assert_eq!(
            first.map(|notice| notice.kind),
            Some(NoticeKind::CartRestoreFailed)
        );
        assert_eq!(
            second.map(|notice| notice.kind),
            Some(NoticeKind::CartSyncFailed)
        );
    }

    #[test]
    fn dropped_receiver_is_not_an_error() {
        let (sender, receiver) = channel();
        drop(receiver);

        sender.notify(NoticeKind::CartPushFailed, "cart sync failed");
    }
}
