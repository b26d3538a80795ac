/// AES-256-GCM authenticated encryption for individual record fields.
///
/// One IV is minted per write operation and shared across the title,
/// username and secret fields of that write. Each field is a distinct
/// plaintext encrypted once under that nonce context, which is safe; an
/// IV must never be reused across two different writes under the same
/// key.
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use crate::crypto::sensitive::SessionKey;
use crate::error::{Result, VaultError};

pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Generate a random 12-byte IV for one write operation.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rngs::OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt one text field. Returns ciphertext with the GCM tag appended.
pub fn encrypt_field(plaintext: &str, iv: &[u8], key: &SessionKey) -> Result<Vec<u8>> {
    if iv.len() != IV_LEN {
        return Err(VaultError::Encryption(format!(
            "IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    cipher
        .encrypt(Nonce::from_slice(iv), plaintext.as_bytes())
        .map_err(|e| VaultError::Encryption(e.to_string()))
}

/// Decrypt one field. Fails on a wrong key, a tampered ciphertext, or a
/// ciphertext/IV mismatch (tag verification), and on non-UTF-8 plaintext.
pub fn decrypt_field(ciphertext: &[u8], iv: &[u8], key: &SessionKey) -> Result<String> {
    if iv.len() != IV_LEN {
        return Err(VaultError::Decryption(format!(
            "IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Decryption(e.to_string()))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| VaultError::Decryption("authentication tag mismatch".into()))?;

    String::from_utf8(plaintext).map_err(|e| VaultError::Decryption(e.to_string()))
}
