//! The contact form flow: report progress while a submission is stored

use std::sync::Arc;

use super::{ContactSubmission, DocumentBackend, SubmissionStore};
use crate::error::SubmissionError;
use crate::notification::{Notification, NotificationHandle};

pub fn pending_notification() -> Notification {
    Notification::pending("Sending Comment", "Uploading your comment, please wait...")
}

pub fn success_notification() -> Notification {
    Notification::success("Comment Sent", "Uploading comment was successful!")
}

pub fn error_notification() -> Notification {
    Notification::error(
        "Sending Failed",
        "Error uploading your comment, please try again",
    )
}

/// Sends submissions to a store, mirroring each phase on a notification channel
pub struct ContactForm<B> {
    store: Arc<SubmissionStore<B>>,
    notifications: NotificationHandle,
}

impl<B: DocumentBackend + 'static> ContactForm<B> {
    pub fn new(store: Arc<SubmissionStore<B>>, notifications: NotificationHandle) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Validate and store one submission
    ///
    /// Shows a pending notification first, then success or error once the
    /// store has answered.
    pub async fn send(
        &self,
        submission: ContactSubmission,
    ) -> Result<ContactSubmission, SubmissionError> {
        self.notifications.show(pending_notification());

        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || store.submit(&submission))
            .await
            .unwrap_or_else(|e| Err(SubmissionError::Write(format!("submission task failed: {}", e))));

        match &result {
            Ok(stored) => {
                tracing::debug!("Contact message sent: {:?}", stored.id);
                self.notifications.show(success_notification());
            }
            Err(e) => {
                tracing::warn!("Contact message not sent: {}", e);
                self.notifications.show(error_notification());
            }
        }

        result
    }
}
