//! Short-lived user-facing messages.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Message shown before anything has been announced.
pub const DEFAULT_MESSAGE: &str = "Item adicionado";

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub active: bool,
}

#[derive(Debug)]
struct Shared {
    current: Notification,
    /// Bumped on every `notify`; an expiry only applies to its own generation.
    generation: u64,
}

/// At most one active message; a newer one preempts the older and restarts
/// the visibility window.
///
/// Each `notify` aborts the pending expiry task before scheduling a new one,
/// and the expiry task re-checks the generation under the lock, so a stale
/// timer can never switch off a newer message.
#[derive(Debug)]
pub struct NotificationChannel {
    shared: Arc<Mutex<Shared>>,
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl NotificationChannel {
    pub fn new(window: Duration) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                current: Notification {
                    message: DEFAULT_MESSAGE.to_string(),
                    active: false,
                },
                generation: 0,
            })),
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Show `message` for one window. Must be called inside a tokio runtime.
    pub fn notify(&mut self, message: impl Into<String>) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.current = Notification {
                message: message.into(),
                active: true,
            };
            shared.generation
        };

        let shared = Arc::clone(&self.shared);
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut shared = lock(&shared);
            if shared.generation == generation {
                shared.current.active = false;
            }
        }));
    }

    pub fn current(&self) -> Notification {
        lock(&self.shared).current.clone()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.shared).current.active
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
