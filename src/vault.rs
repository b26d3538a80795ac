/// Vault lifecycle orchestration: setup, unlock, logout.
///
/// Control flow on session start: ask whether a credential exists for
/// the identity. If not, collect a new passphrase, derive a key and
/// persist a verification ciphertext. If it does, derive a key from the
/// candidate passphrase and check it; success yields the session key,
/// failure feeds the lockout gate.
use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::info;

use crate::audit::{self, AuditAction, AuditSink};
use crate::config::VaultConfig;
use crate::crypto::{kdf, verifier};
use crate::error::{Result, VaultError};
use crate::lockout::{validate_passphrase, FailureOutcome, LockoutGate};
use crate::models::{UserIdentity, VaultCredential};
use crate::session::VaultSession;
use crate::store::secrets::SecretStore;
use crate::store::DocumentStore;

/// Whether first-time setup has happened for this identity.
#[derive(Debug, Clone)]
pub enum SetupState {
    /// No credential stored; a passphrase must be created.
    Pending,
    /// Credential exists; the vault can be unlocked.
    Ready(VaultCredential),
}

/// Result of one unlock attempt.
#[derive(Debug)]
pub enum UnlockOutcome {
    Unlocked(VaultSession),
    /// Wrong passphrase; `remaining` attempts left.
    Retry { remaining: u32 },
    /// Threshold reached. The caller must invalidate the identity
    /// session; re-authentication starts from scratch.
    LockedOut,
}

pub struct Vault {
    store: Arc<dyn DocumentStore>,
    audit: Arc<dyn AuditSink>,
    identity: UserIdentity,
    config: VaultConfig,
}

impl Vault {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        audit: Arc<dyn AuditSink>,
        identity: UserIdentity,
        config: VaultConfig,
    ) -> Self {
        Self {
            store,
            audit,
            identity,
            config,
        }
    }

    /// A lockout gate sized to this vault's attempt policy.
    pub fn lockout_gate(&self) -> LockoutGate {
        LockoutGate::new(self.config.max_attempts)
    }

    /// A paginated record store scoped to this identity.
    pub fn secret_store(&self) -> SecretStore {
        SecretStore::new(
            self.store.clone(),
            self.audit.clone(),
            self.identity.id.clone(),
            &self.config,
        )
    }

    /// Check whether a vault credential already exists.
    pub async fn setup_state(&self) -> Result<SetupState> {
        match self.store.credential(&self.identity.id).await? {
            Some(credential) => Ok(SetupState::Ready(credential)),
            None => Ok(SetupState::Pending),
        }
    }

    /// First-time setup: validate the passphrase, generate the salt,
    /// derive the key and persist the verification ciphertext. The
    /// validation failure is rejected before any KDF work and is never
    /// audited; later failures audit `passphrase_setup_failed`.
    pub async fn initialize(&self, passphrase: &str) -> Result<VaultSession> {
        if !validate_passphrase(passphrase).all_ok() {
            return Err(VaultError::InvalidPassphrase);
        }

        let salt = kdf::generate_salt();
        let key = kdf::derive_key(passphrase, &salt);

        let result = async {
            let verification = verifier::create_verification_ciphertext(&key)?;
            let credential = VaultCredential {
                kdf_salt: BASE64.encode(salt),
                verification_ciphertext: BASE64.encode(verification),
            };
            self.store
                .put_credential(&self.identity.id, &credential)
                .await
        }
        .await;

        if let Err(e) = result {
            let metadata = BTreeMap::from([("errorMessage".to_string(), e.to_string())]);
            audit::emit(
                self.audit.as_ref(),
                &self.identity.id,
                AuditAction::PassphraseSetupFailed,
                metadata,
            )
            .await;
            return Err(e);
        }

        audit::emit(
            self.audit.as_ref(),
            &self.identity.id,
            AuditAction::PassphraseSetup,
            BTreeMap::new(),
        )
        .await;
        info!(owner = %self.identity.id, "vault initialized");

        Ok(VaultSession::new(self.identity.id.clone(), key))
    }

    /// Attempt to unlock with a candidate passphrase.
    ///
    /// A wrong passphrase is an expected outcome, not an error: it
    /// advances the lockout gate and returns `Retry` or `LockedOut`.
    pub async fn unlock(&self, passphrase: &str, gate: &mut LockoutGate) -> Result<UnlockOutcome> {
        // Lockout is terminal for the session: nothing unlocks through a
        // gate that has reached the threshold, correct passphrase or not.
        if gate.is_locked_out() {
            return Ok(UnlockOutcome::LockedOut);
        }
        if passphrase.trim().is_empty() {
            return Err(VaultError::InvalidPassphrase);
        }

        let credential = self
            .store
            .credential(&self.identity.id)
            .await?
            .ok_or(VaultError::NotInitialized)?;
        let salt = credential.decode_salt()?;
        let stored = credential.decode_verification_ciphertext()?;

        gate.begin_attempt();
        let key = kdf::derive_key(passphrase, &salt);

        if verifier::verify(&key, &stored) {
            gate.record_success();
            audit::emit(
                self.audit.as_ref(),
                &self.identity.id,
                AuditAction::VaultUnlock,
                BTreeMap::new(),
            )
            .await;
            info!(owner = %self.identity.id, "vault unlocked");
            return Ok(UnlockOutcome::Unlocked(VaultSession::new(
                self.identity.id.clone(),
                key,
            )));
        }

        audit::emit(
            self.audit.as_ref(),
            &self.identity.id,
            AuditAction::VaultUnlockFailed,
            BTreeMap::new(),
        )
        .await;

        match gate.record_failure() {
            FailureOutcome::Retry { remaining } => Ok(UnlockOutcome::Retry { remaining }),
            FailureOutcome::LockedOut => {
                audit::emit(
                    self.audit.as_ref(),
                    &self.identity.id,
                    AuditAction::MaxAttemptReached,
                    BTreeMap::new(),
                )
                .await;
                Ok(UnlockOutcome::LockedOut)
            }
        }
    }

    /// End the session: the key is consumed and zeroized, and the
    /// logout is audited.
    pub async fn logout(&self, session: VaultSession) {
        session.lock();
        audit::emit(
            self.audit.as_ref(),
            &self.identity.id,
            AuditAction::Logout,
            BTreeMap::new(),
        )
        .await;
        info!(owner = %self.identity.id, "session ended");
    }
}
