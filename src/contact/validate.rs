//! Contact submission validation

use super::ContactSubmission;
use crate::error::{InvalidField, ValidationError};

/// Check the shape of a submission before it is stored
///
/// Reports every failing field, not just the first one.
pub fn validate(submission: &ContactSubmission) -> Result<(), ValidationError> {
    let mut fields = Vec::new();

    if submission.email.is_empty() || !submission.email.contains('@') {
        fields.push(InvalidField::Email);
    }
    if submission.name.trim().is_empty() {
        fields.push(InvalidField::Name);
    }
    if submission.message.trim().is_empty() {
        fields.push(InvalidField::Message);
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { fields })
    }
}
