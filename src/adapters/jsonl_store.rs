use crate::domain::model::{ContactMessage, NewContactMessage};
use crate::domain::ports::MessageStore;
use crate::utils::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Durable append-only store: one JSON object per line.
///
/// Id assignment and the append happen under the same lock. An id is spent
/// as soon as a write is attempted, so a failed append never hands its id
/// out twice. If a failed append cannot be rolled back the store refuses
/// further writes until it is reopened.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    next_id: Mutex<u64>,
    poisoned: AtomicBool,
}

impl JsonlStore {
    /// Open (or lazily create) the data file and resume numbering after the
    /// highest id already stored.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        truncate_torn_tail(&path).await?;
        let existing = read_messages(&path).await?;
        let last_id = existing.iter().map(|m| m.id).max().unwrap_or(0);

        tracing::info!(
            "📂 Opened message store {} ({} existing messages)",
            path.display(),
            existing.len()
        );

        Ok(Self {
            path,
            next_id: Mutex::new(last_id + 1),
            poisoned: AtomicBool::new(false),
        })
    }

    async fn append_record<F: AppendFile>(
        &self,
        file: &mut F,
        new: NewContactMessage,
    ) -> StoreResult<ContactMessage> {
        let mut next_id = self.next_id.lock().await;
        if self.poisoned.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable {
                reason: format!("{} has an unrecoverable partial write", self.path.display()),
            });
        }

        let id = *next_id;
        *next_id += 1;
        let stored = new.into_stored(id, Utc::now());

        let mut line = serde_json::to_vec(&stored)?;
        line.push(b'\n');

        match append_or_roll_back(file, &line).await {
            Ok(()) => Ok(stored),
            Err(failure) => {
                if !failure.rolled_back {
                    self.poisoned.store(true, Ordering::Release);
                    tracing::error!(
                        "❌ Could not roll back partial append to {}; refusing further writes",
                        self.path.display()
                    );
                }
                Err(failure.error.into())
            }
        }
    }
}

#[async_trait]
impl MessageStore for JsonlStore {
    async fn create_contact_message(&self, new: NewContactMessage) -> StoreResult<ContactMessage> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        self.append_record(&mut file, new).await
    }

    async fn list_contact_messages(&self) -> StoreResult<Vec<ContactMessage>> {
        // Hold the lock so a concurrent append is never observed half-written.
        let _guard = self.next_id.lock().await;
        read_messages(&self.path).await
    }
}

/// The file operations an append needs; lets tests inject write faults.
#[async_trait]
trait AppendFile: Send {
    async fn committed_len(&mut self) -> std::io::Result<u64>;
    async fn append_line(&mut self, line: &[u8]) -> std::io::Result<()>;
    async fn truncate(&mut self, len: u64) -> std::io::Result<()>;
}

#[async_trait]
impl AppendFile for fs::File {
    async fn committed_len(&mut self) -> std::io::Result<u64> {
        Ok(self.metadata().await?.len())
    }

    async fn append_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.write_all(line).await?;
        self.flush().await?;
        self.sync_data().await
    }

    async fn truncate(&mut self, len: u64) -> std::io::Result<()> {
        self.set_len(len).await
    }
}

#[derive(Debug)]
struct AppendFailure {
    error: std::io::Error,
    rolled_back: bool,
}

async fn append_or_roll_back<F: AppendFile>(file: &mut F, line: &[u8]) -> Result<(), AppendFailure> {
    let committed_len = file.committed_len().await.map_err(|error| AppendFailure {
        error,
        rolled_back: true,
    })?;

    let Err(error) = file.append_line(line).await else {
        return Ok(());
    };

    // roll back whatever part of the line made it to disk
    let rolled_back = match file.truncate(committed_len).await {
        Ok(()) => true,
        Err(rollback) => {
            tracing::error!("❌ Rollback to {} bytes failed: {}", committed_len, rollback);
            false
        }
    };
    Err(AppendFailure { error, rolled_back })
}

/// Drop bytes after the last newline, left behind by an interrupted append.
async fn truncate_torn_tail(path: &Path) -> StoreResult<()> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if bytes.is_empty() || bytes.ends_with(b"\n") {
        return Ok(());
    }

    let keep = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |pos| pos + 1);
    tracing::warn!(
        "⚠️ Truncating {} unterminated bytes at the end of {}",
        bytes.len() - keep,
        path.display()
    );
    let file = OpenOptions::new().write(true).open(path).await?;
    file.set_len(keep as u64).await?;
    Ok(())
}

async fn read_messages(path: &Path) -> StoreResult<Vec<ContactMessage>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let terminated = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    let mut messages = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ContactMessage>(line) {
            Ok(message) => messages.push(message),
            // torn final write from a failed append
            Err(e) if index + 1 == lines.len() && !terminated => {
                tracing::warn!("⚠️ Ignoring unterminated last line in {}: {}", path.display(), e);
            }
            Err(e) => {
                return Err(StoreError::Corrupt {
                    line: index + 1,
                    message: e.to_string(),
                })
            }
        }
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::validate_submission;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample(subject: &str) -> NewContactMessage {
        validate_submission(&json!({
            "name": "Grace",
            "email": "grace@example.com",
            "subject": subject,
            "message": "I enjoyed the projects section."
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_messages_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("messages.jsonl");

        let store = JsonlStore::open(&path).await.unwrap();
        let first = store.create_contact_message(sample("First subject")).await.unwrap();
        let second = store.create_contact_message(sample("Second subject")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        drop(store);

        let reopened = JsonlStore::open(&path).await.unwrap();
        let third = reopened.create_contact_message(sample("Third subject")).await.unwrap();
        assert_eq!(third.id, 3);

        let listed = reopened.list_contact_messages().await.unwrap();
        assert_eq!(listed, vec![first, second, third]);
    }

    #[tokio::test]
    async fn test_wire_format_uses_camel_case() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.jsonl");
        let store = JsonlStore::open(&path).await.unwrap();
        store.create_contact_message(sample("Hello there")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(raw.trim()).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[tokio::test]
    async fn test_torn_last_line_is_dropped_on_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.jsonl");
        let store = JsonlStore::open(&path).await.unwrap();
        store.create_contact_message(sample("Hello there")).await.unwrap();

        let mut raw = std::fs::read_to_string(&path).unwrap();
        raw.push_str("{\"id\":2,\"name\":\"Gr");
        std::fs::write(&path, raw).unwrap();

        let reopened = JsonlStore::open(&path).await.unwrap();
        assert_eq!(reopened.list_contact_messages().await.unwrap().len(), 1);

        let next = reopened.create_contact_message(sample("After repair")).await.unwrap();
        assert_eq!(next.id, 2);
        assert_eq!(reopened.list_contact_messages().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_middle_line_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.jsonl");
        std::fs::write(&path, "not json\n{}\n").unwrap();

        match JsonlStore::open(&path).await {
            Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected corrupt error, got {other:?}"),
        }
    }

    /// In-memory file whose sync step and truncate can be made to fail.
    #[derive(Default)]
    struct FaultyFile {
        bytes: Vec<u8>,
        fail_sync: bool,
        fail_truncate: bool,
    }

    #[async_trait]
    impl AppendFile for FaultyFile {
        async fn committed_len(&mut self) -> std::io::Result<u64> {
            Ok(self.bytes.len() as u64)
        }

        async fn append_line(&mut self, line: &[u8]) -> std::io::Result<()> {
            self.bytes.extend_from_slice(line);
            if self.fail_sync {
                return Err(std::io::Error::other("sync failed"));
            }
            Ok(())
        }

        async fn truncate(&mut self, len: u64) -> std::io::Result<()> {
            if self.fail_truncate {
                return Err(std::io::Error::other("truncate failed"));
            }
            self.bytes.truncate(len as usize);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_append_is_rolled_back_and_burns_its_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonlStore::open(temp_dir.path().join("messages.jsonl")).await.unwrap();
        let mut file = FaultyFile {
            fail_sync: true,
            ..Default::default()
        };

        let err = store.append_record(&mut file, sample("Lost subject")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(file.bytes.is_empty());

        file.fail_sync = false;
        let stored = store.append_record(&mut file, sample("Kept subject")).await.unwrap();
        assert_eq!(stored.id, 2);

        let line: ContactMessage = serde_json::from_slice(file.bytes.trim_ascii_end()).unwrap();
        assert_eq!(line, stored);
    }

    #[tokio::test]
    async fn test_failed_rollback_poisons_the_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.jsonl");
        let store = JsonlStore::open(&path).await.unwrap();
        let mut file = FaultyFile {
            fail_sync: true,
            fail_truncate: true,
            ..Default::default()
        };

        store.append_record(&mut file, sample("Half written")).await.unwrap_err();
        let leftover = file.bytes.clone();
        assert!(!leftover.is_empty());

        file.fail_sync = false;
        file.fail_truncate = false;
        let err = store.append_record(&mut file, sample("After the fault")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert_eq!(file.bytes, leftover);

        let err = store.create_contact_message(sample("Real file")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(store.list_contact_messages().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_get_distinct_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonlStore::open(temp_dir.path().join("m.jsonl")).await.unwrap());

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create_contact_message(sample("Concurrent hello")).await.unwrap().id
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(store.list_contact_messages().await.unwrap().len(), 50);
    }
}
