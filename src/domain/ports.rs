use crate::domain::model::{ContactMessage, NewContactMessage};
use crate::utils::error::StoreResult;
use async_trait::async_trait;

/// Persistence seam for contact messages.
///
/// Implementations must hand out a distinct `id` to every successful
/// `create_contact_message`, even when calls race, and must not expose a
/// record whose create call returned an error.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_contact_message(&self, new: NewContactMessage) -> StoreResult<ContactMessage>;

    /// All stored messages in creation order. Administrative use only.
    async fn list_contact_messages(&self) -> StoreResult<Vec<ContactMessage>>;
}
