//! Document store seam and the submission store built on it
//!
//! A backend hands out connections; a connection is only ever used inside a
//! [`ScopedConnection`], which releases it exactly once whichever way the
//! scope is left.

use serde_json::Value;

use super::{validate, ContactSubmission};
use crate::error::{StoreError, SubmissionError};

/// Collection holding contact messages
pub const MESSAGES_COLLECTION: &str = "messages";

/// An open connection to a document store
pub trait DocumentConnection {
    /// Insert one document and return the identifier assigned by the store
    fn insert_one(&mut self, collection: &str, document: &Value) -> Result<String, StoreError>;

    /// Fetch one document by identifier
    fn find_one(&mut self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// All documents of a collection in insertion order, with their identifiers
    fn find_all(&mut self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Release the connection
    fn close(self);
}

/// Something that can open connections to a document store
pub trait DocumentBackend: Send + Sync {
    type Connection: DocumentConnection;

    /// Open a connection; fails with [`StoreError::Unreachable`] when the store
    /// cannot be reached
    fn connect(&self) -> Result<Self::Connection, StoreError>;
}

/// A connection that is closed when the guard goes out of scope
pub struct ScopedConnection<C: DocumentConnection> {
    conn: Option<C>,
}

impl<C: DocumentConnection> ScopedConnection<C> {
    pub fn acquire<B>(backend: &B) -> Result<Self, StoreError>
    where
        B: DocumentBackend<Connection = C>,
    {
        let conn = backend.connect()?;
        Ok(Self { conn: Some(conn) })
    }

    /// Close the connection now instead of at the end of the scope
    pub fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
        }
    }
}

impl<C: DocumentConnection> std::ops::Deref for ScopedConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        // Only `release` and `drop` take the connection, and both consume the guard
        self.conn.as_ref().expect("scoped connection already released")
    }
}

impl<C: DocumentConnection> std::ops::DerefMut for ScopedConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.conn.as_mut().expect("scoped connection already released")
    }
}

impl<C: DocumentConnection> Drop for ScopedConnection<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close();
        }
    }
}

/// Persists contact submissions through a [`DocumentBackend`]
pub struct SubmissionStore<B> {
    backend: B,
}

impl<B: DocumentBackend> SubmissionStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validate a submission, then store it
    pub fn submit(&self, submission: &ContactSubmission) -> Result<ContactSubmission, SubmissionError> {
        validate(submission)?;
        self.insert(submission)
    }

    /// Store a validated submission and return it with its assigned identifier
    pub fn insert(&self, submission: &ContactSubmission) -> Result<ContactSubmission, SubmissionError> {
        let mut conn = ScopedConnection::acquire(&self.backend).map_err(|e| {
            tracing::error!("Could not connect to the document store: {}", e);
            SubmissionError::from(e)
        })?;

        let id = match conn.insert_one(MESSAGES_COLLECTION, &submission.to_document()) {
            Ok(id) => id,
            Err(e) => {
                conn.release();
                tracing::error!("Storing message failed: {}", e);
                return Err(e.into());
            }
        };
        conn.release();

        tracing::info!(id = %id, "Stored contact message");

        let mut stored = submission.clone();
        stored.id = Some(id);
        Ok(stored)
    }

    /// Read a stored submission back by identifier
    pub fn get(&self, id: &str) -> Result<Option<ContactSubmission>, StoreError> {
        let mut conn = ScopedConnection::acquire(&self.backend)?;
        let document = conn.find_one(MESSAGES_COLLECTION, id)?;
        document
            .map(|doc| from_document(id.to_string(), doc))
            .transpose()
    }

    /// Every stored submission, oldest first
    pub fn list(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        let mut conn = ScopedConnection::acquire(&self.backend)?;
        let documents = conn.find_all(MESSAGES_COLLECTION)?;
        documents
            .into_iter()
            .map(|(id, doc)| from_document(id, doc))
            .collect()
    }
}

fn from_document(id: String, document: Value) -> Result<ContactSubmission, StoreError> {
    let mut submission: ContactSubmission = serde_json::from_value(document)
        .map_err(|e| StoreError::Read(format!("corrupt document {}: {}", id, e)))?;
    submission.id = Some(id);
    Ok(submission)
}
