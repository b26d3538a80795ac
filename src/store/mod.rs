/// Storage seam for the vault.
///
/// The backing document store is an external collaborator; the core
/// depends only on a keyed credential lookup and a filtered, ordered,
/// cursor-paginated record query. All data handed to the store is
/// already encrypted — the store never sees plaintext.
pub mod memory;
pub mod secrets;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewSecretRecord, RecordKey, RecordPatch, SecretRecord, VaultCredential};

/// Cursor anchor for one page query, relative to the
/// `created_at`-descending order.
#[derive(Debug, Clone)]
pub enum PageAnchor {
    /// Rows strictly after `key` in the ordering (forward paging).
    After(RecordKey),
    /// The window of rows ending strictly before `key` (backward paging;
    /// the store keeps the last `limit` rows of that prefix, still in
    /// descending order).
    Before(RecordKey),
}

/// One bounded window of the owner's live records.
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub limit: usize,
    pub anchor: Option<PageAnchor>,
}

/// Trait for the pluggable backing store.
///
/// Implementations must order record queries by `created_at` descending
/// with the record id as tiebreak, filter to the owner and to
/// `is_deleted = false`, and assign ids and timestamps server-side.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the vault credential for an identity, if setup has happened.
    async fn credential(&self, owner_id: &str) -> Result<Option<VaultCredential>>;

    /// Persist the credential created at setup.
    async fn put_credential(&self, owner_id: &str, credential: &VaultCredential) -> Result<()>;

    /// Insert a record; returns it with store-assigned id and timestamps.
    async fn insert_record(&self, record: NewSecretRecord) -> Result<SecretRecord>;

    /// Replace a record's ciphertexts and IV; bumps `updated_at`.
    async fn update_record(&self, id: &str, patch: RecordPatch) -> Result<()>;

    /// Soft-delete: flip `is_deleted` and bump `updated_at`. The record
    /// is never physically removed by this core.
    async fn mark_deleted(&self, id: &str) -> Result<()>;

    /// Fetch one window of the owner's live records, descending.
    async fn query_page(&self, owner_id: &str, query: &PageQuery) -> Result<Vec<SecretRecord>>;
}
