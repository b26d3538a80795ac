/// Data model for the vault core.
///
/// Persisted shapes (`VaultCredential`, `SecretRecord`) serialize to the
/// wire-level field names the backing store uses. Ciphertexts, salts and
/// IVs travel as base64 strings; decoding happens at the crypto boundary.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// The stable per-user identity supplied by the external identity
/// provider. Only `id` matters to the core: it keys the credential
/// lookup and the record-ownership filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: String,
}

/// Per-user vault credential: the KDF salt and the passphrase
/// verification blob. Created once at setup, immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultCredential {
    /// Base64, 16 bytes decoded.
    pub kdf_salt: String,
    /// Base64, 12-byte IV prefix + AEAD ciphertext+tag.
    #[serde(rename = "encrypted_test")]
    pub verification_ciphertext: String,
}

impl VaultCredential {
    pub fn decode_salt(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.kdf_salt)
            .map_err(|e| VaultError::Encoding(format!("kdf_salt: {e}")))
    }

    pub fn decode_verification_ciphertext(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.verification_ciphertext)
            .map_err(|e| VaultError::Encoding(format!("encrypted_test: {e}")))
    }
}

/// A stored secret record, every sensitive field encrypted. One IV is
/// shared by the three ciphertexts of a single write and replaced on
/// every update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    #[serde(rename = "title")]
    pub title_cipher: String,
    #[serde(rename = "username")]
    pub username_cipher: String,
    #[serde(rename = "secret")]
    pub secret_cipher: String,
    /// Base64, 12 bytes decoded.
    pub iv: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl SecretRecord {
    /// Ordering key for cursor pagination.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            created_at: self.created_at,
            id: self.id.clone(),
        }
    }
}

/// Fields for a record insert. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewSecretRecord {
    pub owner_id: String,
    pub title_cipher: String,
    pub username_cipher: String,
    pub secret_cipher: String,
    pub iv: String,
}

/// Replacement ciphertexts for a record update. The store bumps
/// `updated_at`; `created_at` and ownership never change.
#[derive(Debug, Clone)]
pub struct RecordPatch {
    pub title_cipher: String,
    pub username_cipher: String,
    pub secret_cipher: String,
    pub iv: String,
}

/// Plaintext input for creating or editing a secret.
#[derive(Debug, Clone)]
pub struct SecretInput {
    pub title: String,
    pub username: String,
    pub password: String,
}

/// Transient decrypted view of a record. Never persisted or logged;
/// rebuilt on every page fetch and dropped on lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedSecret {
    pub id: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Position of one record in the `created_at`-descending order, with the
/// record id as tiebreak so the total order is stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordKey {
    pub created_at: DateTime<Utc>,
    pub id: String,
}

/// First/last keys of the most recently fetched page. Reset after any
/// mutation, since the result set may have shifted.
#[derive(Debug, Clone, Default)]
pub struct PaginationCursor {
    pub first: Option<RecordKey>,
    pub last: Option<RecordKey>,
}

impl PaginationCursor {
    pub fn reset(&mut self) {
        self.first = None;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_wire_names() {
        let cred = VaultCredential {
            kdf_salt: "c2FsdA==".into(),
            verification_ciphertext: "dGVzdA==".into(),
        };
        let json = serde_json::to_value(&cred).unwrap();
        assert!(json.get("kdf_salt").is_some());
        assert!(json.get("encrypted_test").is_some());
    }

    #[test]
    fn test_record_wire_names() {
        let record = SecretRecord {
            id: "r1".into(),
            owner_id: "alice@example.com".into(),
            title_cipher: "dA==".into(),
            username_cipher: "dQ==".into(),
            secret_cipher: "cw==".into(),
            iv: "aXY=".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_deleted: false,
        };
        let json = serde_json::to_value(&record).unwrap();
        for field in ["userId", "title", "username", "secret", "iv", "is_deleted"] {
            assert!(json.get(field).is_some(), "missing wire field {field}");
        }
    }

    #[test]
    fn test_bad_base64_salt_rejected() {
        let cred = VaultCredential {
            kdf_salt: "not base64!!".into(),
            verification_ciphertext: String::new(),
        };
        assert!(cred.decode_salt().is_err());
    }

    #[test]
    fn test_record_key_ordering() {
        let earlier = RecordKey {
            created_at: Utc::now(),
            id: "a".into(),
        };
        let later = RecordKey {
            created_at: earlier.created_at + chrono::Duration::seconds(1),
            id: "a".into(),
        };
        assert!(later > earlier);

        // Same timestamp falls back to the id tiebreak.
        let tied = RecordKey {
            created_at: earlier.created_at,
            id: "b".into(),
        };
        assert!(tied > earlier);
    }
}
