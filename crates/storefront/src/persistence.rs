//! Cart persistence: one durable key holding the serialized cart.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use techno_cart::CartLineItem;

/// Storage slot for the cart.
pub const CART_KEY: &str = "carrinho";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// Durable client-side key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug)]
enum WriteRequest {
    Put(String),
    Flush(oneshot::Sender<()>),
}

/// Serializes the cart into [`CART_KEY`] and reads it back on startup.
///
/// Writes go through a single background writer task, so `save` never waits
/// on storage and writes land in the order they were issued. Dropping the
/// adapter lets the writer drain what is queued and exit.
pub struct CartPersistence {
    store: Arc<dyn KeyValueStore>,
    writer: mpsc::UnboundedSender<WriteRequest>,
}

impl CartPersistence {
    /// Start the writer task. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (writer, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store.clone(), rx));
        Self { store, writer }
    }

    /// Load the persisted cart.
    ///
    /// A missing key, an unreadable store, or malformed contents all yield an
    /// empty cart; none of them is an error for the caller.
    pub async fn restore(&self) -> Vec<CartLineItem> {
        let raw = match self.store.get(CART_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted cart; starting empty");
                return Vec::new();
            }
        };

        match decode_cart(&raw) {
            Some(items) => {
                tracing::debug!(items = items.len(), "restored persisted cart");
                items
            }
            None => {
                tracing::warn!("persisted cart is malformed; starting empty");
                Vec::new()
            }
        }
    }

    /// Queue a write of the full cart (fire-and-forget).
    pub fn save(&self, items: &[CartLineItem]) {
        let json = match serde_json::to_string(items) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize cart");
                return;
            }
        };

        if self.writer.send(WriteRequest::Put(json)).is_err() {
            tracing::error!("cart writer is gone; cart change not persisted");
        }
    }

    /// Wait until every write queued so far has been applied.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.writer.send(WriteRequest::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

impl core::fmt::Debug for CartPersistence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartPersistence")
            .field("key", &CART_KEY)
            .finish_non_exhaustive()
    }
}

fn decode_cart(raw: &str) -> Option<Vec<CartLineItem>> {
    serde_json::from_str(raw).ok()
}

async fn run_writer(store: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<WriteRequest>) {
    while let Some(request) = rx.recv().await {
        match request {
            WriteRequest::Put(json) => {
                if let Err(err) = store.set(CART_KEY, &json).await {
                    tracing::warn!(error = %err, "failed to persist cart");
                }
            }
            WriteRequest::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("cart writer stopped");
}
