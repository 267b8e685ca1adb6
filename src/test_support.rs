//! In-memory transport doubles for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::domain::{ConnectionHandle, MessageSource, OutboundMessage, Payload};
use crate::error::TransportError;

#[derive(Debug, Default)]
struct Recorded {
    sent: Mutex<Vec<OutboundMessage>>,
    closed: AtomicBool,
    fail_sends: AtomicBool,
}

/// [`ConnectionHandle`] that records what is written to it.
#[derive(Debug)]
pub struct RecordingHandle {
    inner: Arc<Recorded>,
}

/// Test-side view of a [`RecordingHandle`] after it moved into a session.
#[derive(Debug, Clone)]
pub struct Outbox {
    inner: Arc<Recorded>,
}

impl RecordingHandle {
    pub fn new() -> (Self, Outbox) {
        let inner = Arc::new(Recorded::default());
        (
            Self {
                inner: Arc::clone(&inner),
            },
            Outbox { inner },
        )
    }
}

impl ConnectionHandle for RecordingHandle {
    fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        if self.inner.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Send("broken pipe".to_string()));
        }
        if let Ok(mut sent) = self.inner.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }

    fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }
}

impl Outbox {
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.inner
            .sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn fail_sends(&self) {
        self.inner.fail_sends.store(true, Ordering::SeqCst);
    }
}

/// [`MessageSource`] fed from a channel; dropping the sender ends it.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Result<Payload, TransportError>>,
}

impl ChannelSource {
    pub fn new() -> (mpsc::UnboundedSender<Result<Payload, TransportError>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

impl MessageSource for ChannelSource {
    async fn next_message(&mut self) -> Result<Payload, TransportError> {
        self.rx.recv().await.unwrap_or(Err(TransportError::Closed))
    }
}

pub fn payload(pairs: &[(&str, &str)]) -> Payload {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
