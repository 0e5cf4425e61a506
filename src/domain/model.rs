use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact form submission that has passed the rule set.
///
/// Only [`crate::core::rules::validate_submission`] builds one, so holding a
/// value of this type means every field already meets its constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContactMessage {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl NewContactMessage {
    pub(crate) fn from_validated(
        name: String,
        email: String,
        subject: String,
        message: String,
    ) -> Self {
        Self {
            name,
            email,
            subject,
            message,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Stamp the record with the identity the store assigned to it.
    pub fn into_stored(self, id: u64, created_at: DateTime<Utc>) -> ContactMessage {
        ContactMessage {
            id,
            name: self.name,
            email: self.email,
            subject: self.subject,
            message: self.message,
            created_at,
        }
    }
}

/// Stored contact message. Append-only: nothing mutates it after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
