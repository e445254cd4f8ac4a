//! Uploaded datasets held in memory between dashboard interactions.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use loanctl_core::LoanDataset;

/// An uploaded CSV and where it came from.
#[derive(Debug)]
pub struct StoredDataset {
    pub id: Uuid,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub data: LoanDataset,
}

/// Bounded store of uploaded datasets; the oldest upload is evicted first.
pub struct DatasetStore {
    capacity: usize,
    entries: RwLock<VecDeque<Arc<StoredDataset>>>,
}

impl DatasetStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(VecDeque::new()),
        }
    }

    pub async fn insert(&self, name: impl Into<String>, data: LoanDataset) -> Arc<StoredDataset> {
        let stored = Arc::new(StoredDataset {
            id: Uuid::new_v4(),
            name: name.into(),
            uploaded_at: Utc::now(),
            data,
        });

        let mut entries = self.entries.write().await;
        while entries.len() >= self.capacity {
            if let Some(evicted) = entries.pop_front() {
                tracing::debug!(id = %evicted.id, "evicting dataset");
            }
        }
        entries.push_back(stored.clone());
        tracing::info!(
            id = %stored.id,
            name = %stored.name,
            rows = stored.data.len(),
            "dataset stored"
        );
        stored
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<StoredDataset>> {
        self.entries
            .read()
            .await
            .iter()
            .find(|d| d.id == *id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
