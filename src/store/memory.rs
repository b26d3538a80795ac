/// In-memory `DocumentStore`.
///
/// Reference implementation of the query contract and the backend used
/// by the test suite. Ids are random UUIDs; timestamps are assigned at
/// insert/update time, standing in for server-assigned timestamps.
use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use async_trait::async_trait;

use crate::error::{Result, VaultError};
use crate::models::{NewSecretRecord, RecordPatch, SecretRecord, VaultCredential};
use crate::store::{DocumentStore, PageAnchor, PageQuery};

#[derive(Default)]
struct Inner {
    credentials: HashMap<String, VaultCredential>,
    records: HashMap<String, SecretRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records including soft-deleted ones (the core never purges).
    pub async fn raw_len(&self) -> usize {
        self.inner.read().await.records.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn credential(&self, owner_id: &str) -> Result<Option<VaultCredential>> {
        Ok(self.inner.read().await.credentials.get(owner_id).cloned())
    }

    async fn put_credential(&self, owner_id: &str, credential: &VaultCredential) -> Result<()> {
        self.inner
            .write()
            .await
            .credentials
            .insert(owner_id.to_string(), credential.clone());
        Ok(())
    }

    async fn insert_record(&self, record: NewSecretRecord) -> Result<SecretRecord> {
        let now = Utc::now();
        let stored = SecretRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: record.owner_id,
            title_cipher: record.title_cipher,
            username_cipher: record.username_cipher,
            secret_cipher: record.secret_cipher,
            iv: record.iv,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        };
        self.inner
            .write()
            .await
            .records
            .insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn update_record(&self, id: &str, patch: RecordPatch) -> Result<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        record.title_cipher = patch.title_cipher;
        record.username_cipher = patch.username_cipher;
        record.secret_cipher = patch.secret_cipher;
        record.iv = patch.iv;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_deleted(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .get_mut(id)
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        record.is_deleted = true;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn query_page(&self, owner_id: &str, query: &PageQuery) -> Result<Vec<SecretRecord>> {
        let inner = self.inner.read().await;

        let mut rows: Vec<SecretRecord> = inner
            .records
            .values()
            .filter(|r| r.owner_id == owner_id && !r.is_deleted)
            .cloned()
            .collect();
        // created_at descending, id tiebreak.
        rows.sort_by(|a, b| b.key().cmp(&a.key()));

        let page = match &query.anchor {
            None => rows.into_iter().take(query.limit).collect(),
            Some(PageAnchor::After(key)) => rows
                .into_iter()
                .filter(|r| r.key() < *key)
                .take(query.limit)
                .collect(),
            Some(PageAnchor::Before(key)) => {
                let before: Vec<SecretRecord> =
                    rows.into_iter().filter(|r| r.key() > *key).collect();
                let skip = before.len().saturating_sub(query.limit);
                before.into_iter().skip(skip).collect()
            }
        };

        Ok(page)
    }
}
