use crate::core::rules::validate_submission;
use crate::domain::model::ContactMessage;
use crate::domain::ports::MessageStore;
use crate::utils::error::{StoreError, ValidationErrors};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to store contact message: {0}")]
    Store(#[from] StoreError),
}

/// Runs a submission through the rule set and, only when it passes, the store.
#[derive(Clone)]
pub struct IntakeService {
    store: Arc<dyn MessageStore>,
}

impl IntakeService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, body: &Value) -> Result<ContactMessage, IntakeError> {
        let new_message = match validate_submission(body) {
            Ok(new_message) => new_message,
            Err(errors) => {
                tracing::debug!(fields = ?errors.fields(), "contact submission rejected");
                return Err(errors.into());
            }
        };

        let stored = self.store.create_contact_message(new_message).await?;
        tracing::info!(id = stored.id, "📬 contact message stored");
        Ok(stored)
    }
}
