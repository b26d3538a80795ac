/// Paginated, decrypting record store.
///
/// Fetches encrypted records in fixed-size windows, decrypts each page
/// through the field cipher, and exposes create/update/soft-delete. A
/// record that fails to decrypt is logged and omitted from the page
/// rather than failing the fetch. After any mutation the cursor is reset
/// and the initial page is re-fetched — simpler than reconciling a
/// shifted window.
use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{info, warn};

use crate::audit::{self, AuditAction, AuditSink};
use crate::config::VaultConfig;
use crate::crypto::field;
use crate::crypto::sensitive::SessionKey;
use crate::error::{Result, VaultError};
use crate::models::{
    DecryptedSecret, NewSecretRecord, PaginationCursor, RecordPatch, SecretInput, SecretRecord,
};
use crate::session::VaultSession;
use crate::store::{DocumentStore, PageAnchor, PageQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Initial,
    Next,
    Prev,
}

/// One decrypted page plus "more data exists" flags for each direction.
#[derive(Debug, Clone)]
pub struct SecretPage {
    pub secrets: Vec<DecryptedSecret>,
    pub has_next: bool,
    pub has_prev: bool,
}

pub struct SecretStore {
    store: Arc<dyn DocumentStore>,
    audit: Arc<dyn AuditSink>,
    owner_id: String,
    page_size: usize,
    cursor: PaginationCursor,
    has_next: bool,
    has_prev: bool,
}

impl SecretStore {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        audit: Arc<dyn AuditSink>,
        owner_id: String,
        config: &VaultConfig,
    ) -> Self {
        Self {
            store,
            audit,
            owner_id,
            page_size: config.page_size,
            cursor: PaginationCursor::default(),
            has_next: false,
            has_prev: false,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next
    }

    pub fn has_prev_page(&self) -> bool {
        self.has_prev
    }

    /// Fetch and decrypt one page.
    ///
    /// Always requests `page_size + 1` rows; the overflow row only
    /// signals that more data exists in the paging direction and is
    /// trimmed before decryption. `Next`/`Prev` without a cursor anchor
    /// degrade to an initial fetch.
    pub async fn fetch_page(
        &mut self,
        direction: PageDirection,
        session: &VaultSession,
    ) -> Result<SecretPage> {
        let anchor = match direction {
            PageDirection::Initial => None,
            PageDirection::Next => self.cursor.last.clone().map(PageAnchor::After),
            PageDirection::Prev => self.cursor.first.clone().map(PageAnchor::Before),
        };

        let query = PageQuery {
            limit: self.page_size + 1,
            anchor,
        };
        let mut rows = self.store.query_page(&self.owner_id, &query).await?;

        let has_more = rows.len() > self.page_size;
        if has_more {
            match direction {
                // Backward paging overflows at the far end of the
                // window, which is the front in descending order.
                PageDirection::Prev => {
                    rows.remove(0);
                }
                _ => rows.truncate(self.page_size),
            }
        }

        match direction {
            PageDirection::Next => {
                self.has_next = has_more;
                self.has_prev = true;
            }
            PageDirection::Prev => {
                self.has_prev = has_more;
                self.has_next = true;
            }
            PageDirection::Initial => {
                self.has_next = has_more;
                self.has_prev = false;
            }
        }

        self.cursor.first = rows.first().map(SecretRecord::key);
        self.cursor.last = rows.last().map(SecretRecord::key);

        let secrets = decrypt_page(&rows, session.key());
        info!(
            owner = %self.owner_id,
            fetched = rows.len(),
            decrypted = secrets.len(),
            "page fetched"
        );

        Ok(SecretPage {
            secrets,
            has_next: self.has_next,
            has_prev: self.has_prev,
        })
    }

    /// Encrypt and store a new secret, then return the refreshed first
    /// page.
    pub async fn create(
        &mut self,
        session: &VaultSession,
        input: &SecretInput,
    ) -> Result<SecretPage> {
        let (ciphers, iv) = encrypt_input(input, session.key())?;
        let record = NewSecretRecord {
            owner_id: self.owner_id.clone(),
            title_cipher: ciphers.title,
            username_cipher: ciphers.username,
            secret_cipher: ciphers.secret,
            iv,
        };

        self.store.insert_record(record).await?;
        audit::emit(
            self.audit.as_ref(),
            &self.owner_id,
            AuditAction::SecretCreated,
            BTreeMap::new(),
        )
        .await;

        self.reset_and_refetch(session).await
    }

    /// Re-encrypt a secret under a fresh IV, then return the refreshed
    /// first page.
    pub async fn update(
        &mut self,
        session: &VaultSession,
        id: &str,
        input: &SecretInput,
    ) -> Result<SecretPage> {
        let (ciphers, iv) = encrypt_input(input, session.key())?;
        let patch = RecordPatch {
            title_cipher: ciphers.title,
            username_cipher: ciphers.username,
            secret_cipher: ciphers.secret,
            iv,
        };

        self.store.update_record(id, patch).await?;
        audit::emit(
            self.audit.as_ref(),
            &self.owner_id,
            AuditAction::SecretUpdated,
            BTreeMap::new(),
        )
        .await;

        self.reset_and_refetch(session).await
    }

    /// Soft-delete a secret, then return the refreshed first page.
    pub async fn delete(&mut self, session: &VaultSession, id: &str) -> Result<SecretPage> {
        self.store.mark_deleted(id).await?;
        audit::emit(
            self.audit.as_ref(),
            &self.owner_id,
            AuditAction::SecretDeleted,
            BTreeMap::new(),
        )
        .await;

        self.reset_and_refetch(session).await
    }

    async fn reset_and_refetch(&mut self, session: &VaultSession) -> Result<SecretPage> {
        self.cursor.reset();
        self.fetch_page(PageDirection::Initial, session).await
    }
}

struct FieldCiphers {
    title: String,
    username: String,
    secret: String,
}

/// Mint one IV for the write and encrypt all three fields under it.
fn encrypt_input(input: &SecretInput, key: &SessionKey) -> Result<(FieldCiphers, String)> {
    let iv = field::generate_iv();

    let ciphers = FieldCiphers {
        title: BASE64.encode(field::encrypt_field(&input.title, &iv, key)?),
        username: BASE64.encode(field::encrypt_field(&input.username, &iv, key)?),
        secret: BASE64.encode(field::encrypt_field(&input.password, &iv, key)?),
    };

    Ok((ciphers, BASE64.encode(iv)))
}

fn decrypt_page(rows: &[SecretRecord], key: &SessionKey) -> Vec<DecryptedSecret> {
    let mut secrets = Vec::with_capacity(rows.len());
    for record in rows {
        match decrypt_record(record, key) {
            Ok(secret) => secrets.push(secret),
            Err(e) => {
                warn!(record_id = %record.id, error = %e, "failed to decrypt record, skipping");
            }
        }
    }
    secrets
}

fn decrypt_record(record: &SecretRecord, key: &SessionKey) -> Result<DecryptedSecret> {
    let iv = BASE64
        .decode(&record.iv)
        .map_err(|e| VaultError::Encoding(format!("iv: {e}")))?;

    let decrypt = |label: &str, cipher: &str| -> Result<String> {
        let bytes = BASE64
            .decode(cipher)
            .map_err(|e| VaultError::Encoding(format!("{label}: {e}")))?;
        field::decrypt_field(&bytes, &iv, key)
    };

    Ok(DecryptedSecret {
        id: record.id.clone(),
        title: decrypt("title", &record.title_cipher)?,
        username: decrypt("username", &record.username_cipher)?,
        password: decrypt("secret", &record.secret_cipher)?,
        created_at: record.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::store::memory::MemoryStore;

    fn session() -> VaultSession {
        VaultSession::new("alice@example.com".into(), SessionKey::new([0x2A; 32]))
    }

    fn store_under_test(page_size: usize) -> (SecretStore, Arc<MemoryStore>, Arc<MemoryAuditSink>) {
        let backing = Arc::new(MemoryStore::new());
        let sink = Arc::new(MemoryAuditSink::new());
        let store = SecretStore::new(
            backing.clone(),
            sink.clone(),
            "alice@example.com".into(),
            &VaultConfig {
                page_size,
                max_attempts: 3,
            },
        );
        (store, backing, sink)
    }

    fn input(tag: &str) -> SecretInput {
        SecretInput {
            title: format!("title {tag}"),
            username: format!("user {tag}"),
            password: format!("pass {tag}"),
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_roundtrip() {
        let (mut store, _, _) = store_under_test(10);
        let session = session();

        let page = store
            .create(
                &session,
                &SecretInput {
                    title: "Bank".into(),
                    username: "alice".into(),
                    password: "p@ss".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(page.secrets.len(), 1);
        let secret = &page.secrets[0];
        assert_eq!(secret.title, "Bank");
        assert_eq!(secret.username, "alice");
        assert_eq!(secret.password, "p@ss");
        assert!(!page.has_next);
        assert!(!page.has_prev);
    }

    #[tokio::test]
    async fn test_pagination_no_overlap_no_gap() {
        let (mut store, _, _) = store_under_test(4);
        let session = session();

        for i in 0..10 {
            store.create(&session, &input(&i.to_string())).await.unwrap();
        }

        let page1 = store
            .fetch_page(PageDirection::Initial, &session)
            .await
            .unwrap();
        assert_eq!(page1.secrets.len(), 4);
        assert!(page1.has_next);
        assert!(!page1.has_prev);

        let page2 = store
            .fetch_page(PageDirection::Next, &session)
            .await
            .unwrap();
        assert_eq!(page2.secrets.len(), 4);
        assert!(page2.has_next);
        assert!(page2.has_prev);

        let page3 = store
            .fetch_page(PageDirection::Next, &session)
            .await
            .unwrap();
        assert_eq!(page3.secrets.len(), 2);
        assert!(!page3.has_next);

        let mut ids: Vec<String> = page1
            .secrets
            .iter()
            .chain(&page2.secrets)
            .chain(&page3.secrets)
            .map(|s| s.id.clone())
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(total, 10);
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn test_prev_returns_exactly_previous_page() {
        let (mut store, _, _) = store_under_test(3);
        let session = session();

        for i in 0..9 {
            store.create(&session, &input(&i.to_string())).await.unwrap();
        }

        let page1 = store
            .fetch_page(PageDirection::Initial, &session)
            .await
            .unwrap();
        store
            .fetch_page(PageDirection::Next, &session)
            .await
            .unwrap();
        let back = store
            .fetch_page(PageDirection::Prev, &session)
            .await
            .unwrap();

        let ids = |page: &SecretPage| page.secrets.iter().map(|s| s.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&page1), ids(&back));
        assert!(back.has_next);
    }

    #[tokio::test]
    async fn test_empty_page_clears_cursor() {
        let (mut store, _, _) = store_under_test(2);
        let session = session();

        store.create(&session, &input("a")).await.unwrap();
        store.create(&session, &input("b")).await.unwrap();

        store
            .fetch_page(PageDirection::Initial, &session)
            .await
            .unwrap();
        let past_end = store
            .fetch_page(PageDirection::Next, &session)
            .await
            .unwrap();
        assert!(past_end.secrets.is_empty());

        // Both cursor keys were cleared, so the next forward fetch has
        // no anchor and degrades to the initial page.
        let page = store
            .fetch_page(PageDirection::Next, &session)
            .await
            .unwrap();
        assert_eq!(page.secrets.len(), 2);
    }

    #[tokio::test]
    async fn test_deleted_secret_never_returned() {
        let (mut store, backing, _) = store_under_test(10);
        let session = session();

        store.create(&session, &input("keep")).await.unwrap();
        let page = store.create(&session, &input("drop")).await.unwrap();
        let doomed = page
            .secrets
            .iter()
            .find(|s| s.title == "title drop")
            .unwrap()
            .id
            .clone();

        let page = store.delete(&session, &doomed).await.unwrap();
        assert_eq!(page.secrets.len(), 1);
        assert_eq!(page.secrets[0].title, "title keep");
        // Soft delete keeps the row in storage.
        assert_eq!(backing.raw_len().await, 2);
    }

    #[tokio::test]
    async fn test_update_rotates_iv_and_reencrypts() {
        let (mut store, backing, _) = store_under_test(10);
        let session = session();

        let page = store.create(&session, &input("v1")).await.unwrap();
        let id = page.secrets[0].id.clone();
        let old_iv = backing
            .query_page(
                "alice@example.com",
                &PageQuery {
                    limit: 1,
                    anchor: None,
                },
            )
            .await
            .unwrap()[0]
            .iv
            .clone();

        let page = store.update(&session, &id, &input("v2")).await.unwrap();
        assert_eq!(page.secrets[0].title, "title v2");
        assert_eq!(page.secrets[0].password, "pass v2");

        let new_iv = backing
            .query_page(
                "alice@example.com",
                &PageQuery {
                    limit: 1,
                    anchor: None,
                },
            )
            .await
            .unwrap()[0]
            .iv
            .clone();
        assert_ne!(old_iv, new_iv);
    }

    #[tokio::test]
    async fn test_undecryptable_record_skipped_not_fatal() {
        let (mut store, backing, _) = store_under_test(10);
        let session = session();

        store.create(&session, &input("good")).await.unwrap();
        // A record written under some other key.
        backing
            .insert_record(NewSecretRecord {
                owner_id: "alice@example.com".into(),
                title_cipher: BASE64.encode([0u8; 32]),
                username_cipher: BASE64.encode([0u8; 32]),
                secret_cipher: BASE64.encode([0u8; 32]),
                iv: BASE64.encode([0u8; 12]),
            })
            .await
            .unwrap();

        let page = store
            .fetch_page(PageDirection::Initial, &session)
            .await
            .unwrap();
        assert_eq!(page.secrets.len(), 1);
        assert_eq!(page.secrets[0].title, "title good");
    }

    #[tokio::test]
    async fn test_mutations_emit_audit_events() {
        let (mut store, _, sink) = store_under_test(10);
        let session = session();

        let page = store.create(&session, &input("a")).await.unwrap();
        let id = page.secrets[0].id.clone();
        store.update(&session, &id, &input("b")).await.unwrap();
        store.delete(&session, &id).await.unwrap();

        assert_eq!(
            sink.actions(),
            vec![
                AuditAction::SecretCreated,
                AuditAction::SecretUpdated,
                AuditAction::SecretDeleted,
            ]
        );
    }
}
