//! Transient status notifications for the contact form
//!
//! A [`NotificationChannel`] holds at most one [`Notification`]. Success and
//! error notifications clear themselves after a timeout; pending ones stay
//! until something replaces them. Components get a cloneable
//! [`NotificationHandle`] rather than reaching for shared global state.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default lifetime of success and error notifications
pub const DEFAULT_EXPIRY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Success,
    Error,
}

impl NotificationStatus {
    /// Terminal states expire on their own
    pub fn expires(self) -> bool {
        matches!(self, NotificationStatus::Success | NotificationStatus::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub status: NotificationStatus,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        status: NotificationStatus,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            status,
        }
    }

    pub fn pending(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationStatus::Pending)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationStatus::Success)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, NotificationStatus::Error)
    }
}

/// Bookkeeping for the expiry timer
#[derive(Default)]
struct TimerSlot {
    /// Bumped on every state change; a timer only fires for its own generation
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Shared {
    slot: Mutex<TimerSlot>,
    state: watch::Sender<Option<Notification>>,
    expiry: Duration,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the state and cancel any armed timer; returns the new generation
    fn replace(&self, slot: &mut TimerSlot, value: Option<Notification>) -> u64 {
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        self.state.send_replace(value);
        slot.generation
    }

    fn expire(&self, generation: u64) {
        let mut slot = self.lock();
        if slot.generation != generation {
            return;
        }
        slot.timer = None;
        slot.generation += 1;
        self.state.send_replace(None);
        tracing::debug!("Notification expired");
    }
}

/// Owner of the notification state for one session
pub struct NotificationChannel {
    handle: NotificationHandle,
}

impl NotificationChannel {
    pub fn new(expiry: Duration) -> Self {
        let (state, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            slot: Mutex::new(TimerSlot::default()),
            state,
            expiry,
        });
        Self {
            handle: NotificationHandle { shared },
        }
    }

    /// A handle to pass to components that report progress
    pub fn handle(&self) -> NotificationHandle {
        self.handle.clone()
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY)
    }
}

impl std::ops::Deref for NotificationChannel {
    type Target = NotificationHandle;

    fn deref(&self) -> &NotificationHandle {
        &self.handle
    }
}

/// Cloneable access to a [`NotificationChannel`]
#[derive(Clone)]
pub struct NotificationHandle {
    shared: Arc<Shared>,
}

impl NotificationHandle {
    /// Replace the current notification
    ///
    /// Success and error notifications arm an expiry timer, which must be
    /// called from within a tokio runtime.
    pub fn show(&self, notification: Notification) {
        let mut slot = self.shared.lock();
        let expires = notification.status.expires();
        let generation = self.shared.replace(&mut slot, Some(notification));

        if expires {
            slot.timer = self.arm_expiry(generation);
        }
    }

    /// Clear the current notification
    pub fn hide(&self) {
        let mut slot = self.shared.lock();
        self.shared.replace(&mut slot, None);
    }

    /// The notification currently visible, if any
    pub fn current(&self) -> Option<Notification> {
        self.shared.state.borrow().clone()
    }

    /// Observe state changes; only the latest value is ever visible
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.shared.state.subscribe()
    }

    fn arm_expiry(&self, generation: u64) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::warn!("No async runtime; notification will not expire");
                return None;
            }
        };

        let deadline = Instant::now() + self.shared.expiry;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);

        Some(runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire(generation);
            }
        }))
    }
}
