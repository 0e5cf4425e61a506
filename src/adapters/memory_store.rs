use crate::domain::model::{ContactMessage, NewContactMessage};
use crate::domain::ports::MessageStore;
use crate::utils::error::StoreResult;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
#[derive(Debug)]
pub struct MemoryStore {
    next_id: AtomicU64,
    messages: RwLock<Vec<ContactMessage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            messages: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_contact_message(&self, new: NewContactMessage) -> StoreResult<ContactMessage> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let stored = new.into_stored(id, Utc::now());

        let mut messages = self.messages.write().await;
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_contact_messages(&self) -> StoreResult<Vec<ContactMessage>> {
        let mut messages = self.messages.read().await.clone();
        // fetch_add and push are not one step, so racing writers can land out of id order
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }
}
