//! Per-peer outbound queue.
//!
//! The endpoint owns the [`Mailbox`] (the only strong sender plus the
//! receiver) and drains it into its socket. The room stores a [`PeerLink`],
//! which holds a weak sender: it can push frames while the endpoint is alive
//! but never keeps the connection's queue open by itself.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Create a linked link/mailbox pair with room for `capacity` frames.
pub fn channel(capacity: usize) -> (PeerLink, Mailbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let shutdown = CancellationToken::new();
    let link = PeerLink {
        tx: tx.downgrade(),
        shutdown: shutdown.clone(),
    };
    let mailbox = Mailbox {
        _tx: tx,
        rx,
        shutdown,
    };
    (link, mailbox)
}

/// Outbound side of one peer, held by the manager.
#[derive(Debug, Clone)]
pub struct PeerLink {
    tx: mpsc::WeakSender<String>,
    shutdown: CancellationToken,
}

impl PeerLink {
    /// Queue one encoded frame without waiting.
    ///
    /// Returns `false` if the endpoint is gone or its queue is full; the
    /// frame is dropped in that case.
    pub fn deliver(&self, frame: &str) -> bool {
        let Some(tx) = self.tx.upgrade() else {
            return false;
        };
        match tx.try_send(frame.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("outbound queue full, dropping frame");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Ask the endpoint to close its transport.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.tx.upgrade().is_none()
    }
}

/// Inbound side of one peer's queue, owned by its endpoint.
#[derive(Debug)]
pub struct Mailbox {
    // Keeps the channel open for the endpoint's lifetime.
    _tx: mpsc::Sender<String>,
    rx: mpsc::Receiver<String>,
    shutdown: CancellationToken,
}

impl Mailbox {
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Resolves once the manager has asked for this connection to close.
    pub async fn closed(&self) {
        self.shutdown.cancelled().await
    }

    /// Close signal detached from the mailbox, for selecting alongside `recv`.
    pub fn shutdown(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_order() {
        let (link, mut mailbox) = channel(4);
        assert!(link.deliver("one"));
        assert!(link.deliver("two"));
        assert_eq!(mailbox.recv().await.as_deref(), Some("one"));
        assert_eq!(mailbox.recv().await.as_deref(), Some("two"));
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (link, mut mailbox) = channel(1);
        assert!(link.deliver("first"));
        assert!(!link.deliver("second"));
        assert_eq!(mailbox.try_recv().as_deref(), Some("first"));
        assert_eq!(mailbox.try_recv(), None);
    }

    #[test]
    fn dropped_mailbox_fails_delivery() {
        let (link, mailbox) = channel(4);
        drop(mailbox);
        assert!(!link.deliver("hello"));
        assert!(link.is_closed());
    }

    #[tokio::test]
    async fn close_wakes_endpoint() {
        let (link, mailbox) = channel(4);
        assert!(!link.is_closed());
        link.close();
        mailbox.closed().await;
        assert!(link.is_closed());
    }
}
