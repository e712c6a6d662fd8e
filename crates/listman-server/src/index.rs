//! Search index refresh notifications.
//!
//! The list manager tells the external search index which lists changed
//! through the [`IndexNotifier`] trait. Notification is fire-and-forget:
//! `notify` must return immediately and never fails the caller.

use listman_core::ListId;
use tokio::sync::mpsc;

/// A change the search index has to pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEvent {
    /// Associations or metadata of the list changed.
    ListChanged(ListId),
    /// The list was deleted.
    ListRemoved(ListId),
}

/// Sink for index refresh requests.
pub trait IndexNotifier: Send + Sync {
    fn notify(&self, event: IndexEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndexNotifier;

impl IndexNotifier for NoopIndexNotifier {
    fn notify(&self, _event: IndexEvent) {}
}

/// Forwards events onto an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelIndexNotifier {
    tx: mpsc::UnboundedSender<IndexEvent>,
}

impl ChannelIndexNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<IndexEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelIndexNotifier { tx }, rx)
    }
}

impl IndexNotifier for ChannelIndexNotifier {
    fn notify(&self, event: IndexEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(?event, "index receiver dropped; event discarded");
        }
    }
}

/// Drains index events in the background, logging each refresh request.
pub fn spawn_index_logger(mut rx: mpsc::UnboundedReceiver<IndexEvent>) {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                IndexEvent::ListChanged(list_id) => {
                    tracing::info!(%list_id, "index refresh requested")
                }
                IndexEvent::ListRemoved(list_id) => {
                    tracing::info!(%list_id, "index removal requested")
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelIndexNotifier::new();
        let a = ListId::new();
        let b = ListId::new();
        notifier.notify(IndexEvent::ListChanged(a));
        notifier.notify(IndexEvent::ListRemoved(b));

        assert_eq!(rx.try_recv().unwrap(), IndexEvent::ListChanged(a));
        assert_eq!(rx.try_recv().unwrap(), IndexEvent::ListRemoved(b));
    }

    #[test]
    fn notify_after_receiver_dropped_does_not_panic() {
        let (notifier, rx) = ChannelIndexNotifier::new();
        drop(rx);
        notifier.notify(IndexEvent::ListChanged(ListId::new()));
    }
}
