/// PBKDF2-HMAC-SHA256 key derivation for the vault master key.
///
/// Parameters are fixed policy constants, not user-configurable: every
/// derivation for a given vault must be reproducible. The constants are
/// versioned so a future parameter upgrade can be tagged per credential
/// without invalidating existing vaults.
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::crypto::sensitive::SessionKey;

pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// Versioned KDF policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub version: u8,
    pub iterations: u32,
}

/// The only deployed parameter set.
pub const KDF_V1: KdfParams = KdfParams {
    version: 1,
    iterations: 100_000,
};

/// Generate a random 16-byte salt. Called once per vault at setup and
/// never again: regenerating the salt would change the derived key and
/// orphan every previously encrypted record.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive the 256-bit session key under the current policy.
pub fn derive_key(passphrase: &str, salt: &[u8]) -> SessionKey {
    derive_key_with(passphrase, salt, &KDF_V1)
}

/// Derive a key under explicit parameters (future credential versions).
pub fn derive_key_with(passphrase: &str, salt: &[u8], params: &KdfParams) -> SessionKey {
    let mut output = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, params.iterations, &mut output);
    SessionKey::new(output)
}
