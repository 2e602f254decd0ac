//! In-memory [`WishBackend`] for tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use wish_storage::wish::{NewWish, StoredWish};

use super::{BackendError, BackendResult, ObjectUpload, UploadedObject, WishBackend};

/// A call received by the in-memory backend, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `upload_object` was called
    Upload {
        /// Target bucket
        bucket: String,
        /// Object key
        key: String,
    },
    /// `insert_record` was called
    Insert {
        /// Target table
        table: String,
    },
}

#[derive(Default)]
struct MemoryState {
    calls: Vec<BackendCall>,
    objects: HashMap<String, ObjectUpload>,
    rows: Vec<(String, StoredWish)>,
    upload_failure: Option<String>,
    insert_failure: Option<String>,
}

/// Backend that keeps everything in memory and records every call
pub struct InMemoryWishBackend {
    public_base_url: String,
    upload_gate: Option<Arc<Notify>>,
    state: Mutex<MemoryState>,
}

impl Default for InMemoryWishBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWishBackend {
    /// Creates an empty backend serving objects from `https://media.test`
    #[must_use]
    pub fn new() -> Self {
        Self {
            public_base_url: "https://media.test".to_string(),
            upload_gate: None,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Makes every upload wait for a notification on `gate` before completing
    #[must_use]
    pub fn with_upload_gate(mut self, gate: Arc<Notify>) -> Self {
        self.upload_gate = Some(gate);
        self
    }

    /// Makes every following upload fail with `message`
    pub fn fail_uploads(&self, message: &str) {
        self.lock().upload_failure = Some(message.to_string());
    }

    /// Makes every following insert fail with `message`
    pub fn fail_inserts(&self, message: &str) {
        self.lock().insert_failure = Some(message.to_string());
    }

    /// All calls received so far
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// The stored object under `key`, if any
    #[must_use]
    pub fn object(&self, key: &str) -> Option<ObjectUpload> {
        self.lock().objects.get(key).cloned()
    }

    /// Number of stored objects
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    /// Inserted rows with the table each went to
    #[must_use]
    pub fn rows(&self) -> Vec<(String, StoredWish)> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl WishBackend for InMemoryWishBackend {
    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        object: ObjectUpload,
    ) -> BackendResult<UploadedObject> {
        self.lock().calls.push(BackendCall::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });

        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }

        let mut state = self.lock();
        if let Some(message) = &state.upload_failure {
            return Err(BackendError::Rejected(message.clone()));
        }
        if state.objects.contains_key(key) {
            return Err(BackendError::Rejected(format!("object {key} already exists")));
        }
        state.objects.insert(key.to_string(), object);

        Ok(UploadedObject {
            url: format!("{}/{bucket}/{key}", self.public_base_url),
        })
    }

    async fn insert_record(&self, table: &str, wish: NewWish) -> BackendResult<StoredWish> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Insert {
            table: table.to_string(),
        });

        if let Some(message) = &state.insert_failure {
            return Err(BackendError::Unavailable(message.clone()));
        }

        let stored = StoredWish {
            id: uuid::Uuid::new_v4().to_string(),
            author_name: wish.author_name,
            recipient_name: wish.recipient_name,
            message: wish.message,
            image_url: wish.image_url,
            created_at: Utc::now(),
        };
        state.rows.push((table.to_string(), stored.clone()));

        Ok(stored)
    }

    async fn get_record(&self, table: &str, id: &str) -> BackendResult<Option<StoredWish>> {
        Ok(self
            .lock()
            .rows
            .iter()
            .find(|(row_table, wish)| row_table == table && wish.id == id)
            .map(|(_, wish)| wish.clone()))
    }
}
