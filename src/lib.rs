//! passvault — client-side encrypted secrets vault.
//!
//! The backing store never sees plaintext. A passphrase-derived key
//! (PBKDF2-HMAC-SHA256) encrypts every sensitive field with AES-256-GCM;
//! a stored verification ciphertext gives a zero-knowledge "right
//! passphrase?" check; a lockout policy bounds failed unlock attempts;
//! and records are fetched and decrypted in bounded cursor-paginated
//! windows. Storage and audit logging are external collaborators behind
//! trait seams.

pub mod audit;
pub mod config;
pub mod crypto;
pub mod error;
pub mod lockout;
pub mod models;
pub mod session;
pub mod store;
pub mod vault;

pub use audit::{AuditAction, AuditEvent, AuditSink};
pub use config::VaultConfig;
pub use error::{Result, VaultError};
pub use lockout::{validate_passphrase, LockoutGate, PassphraseChecks, UnlockState};
pub use models::{DecryptedSecret, SecretInput, UserIdentity, VaultCredential};
pub use session::VaultSession;
pub use store::secrets::{PageDirection, SecretPage, SecretStore};
pub use store::DocumentStore;
pub use vault::{SetupState, UnlockOutcome, Vault};
