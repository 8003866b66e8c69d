//! Send a contact message from the command line

use anyhow::Result;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

use crate::contact::{ContactForm, ContactSubmission};
use crate::notification::{Notification, NotificationChannel, NotificationStatus};
use crate::Blog;

/// Run the contact form flow, printing every notification it shows
pub async fn run(blog: &Blog, submission: ContactSubmission) -> Result<ContactSubmission> {
    let channel = NotificationChannel::new(blog.config.notification_timeout());
    let mut updates = WatchStream::new(channel.subscribe());

    let printer = tokio::spawn(async move {
        while let Some(state) = updates.next().await {
            if let Some(notification) = state {
                print_notification(&notification);
            }
        }
    });

    let form = ContactForm::new(Arc::new(blog.submissions()?), channel.handle());
    let result = form.send(submission).await;

    // Let the printer observe the final state before the channel closes
    tokio::task::yield_now().await;
    drop(form);
    drop(channel);
    if let Err(e) = printer.await {
        tracing::debug!("Notification printer stopped: {}", e);
    }

    Ok(result?)
}

fn print_notification(notification: &Notification) {
    let marker = match notification.status {
        NotificationStatus::Pending => "...",
        NotificationStatus::Success => "ok",
        NotificationStatus::Error => "error",
    };
    println!(
        "[{}] {}: {}",
        marker, notification.title, notification.message
    );
}
