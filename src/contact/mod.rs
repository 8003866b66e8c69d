//! Contact form submissions - validation, persistence and the form flow

pub mod form;
pub mod sqlite;
pub mod store;
mod validate;

use serde::{Deserialize, Serialize};

pub use form::ContactForm;
pub use sqlite::SqliteBackend;
pub use store::{DocumentBackend, DocumentConnection, ScopedConnection, SubmissionStore};
pub use validate::validate;

/// A message sent through the contact form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,

    /// Identifier assigned by the store; absent until the insert succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ContactSubmission {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            message: message.into(),
            id: None,
        }
    }

    /// The stored document, without the identifier
    pub(crate) fn to_document(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "name": self.name,
            "message": self.message,
        })
    }
}
