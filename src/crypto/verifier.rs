/// Zero-knowledge passphrase verification.
///
/// At setup, a fixed marker string is encrypted under the freshly derived
/// key and stored. Later, a candidate key is correct iff that blob
/// authenticates and decrypts back to the marker. The stored ciphertext
/// reveals nothing about the passphrase or vault contents, and no real
/// secret is ever decrypted during the check.
use crate::crypto::field::{self, IV_LEN, TAG_LEN};
use crate::crypto::sensitive::SessionKey;
use crate::error::Result;

const VERIFICATION_MARKER: &str = "passphrase_verified";

/// Encrypt the marker under `key` with a fresh IV; the IV is prepended
/// so the blob is self-contained. Called exactly once, at setup.
pub fn create_verification_ciphertext(key: &SessionKey) -> Result<Vec<u8>> {
    let iv = field::generate_iv();
    let ciphertext = field::encrypt_field(VERIFICATION_MARKER, &iv, key)?;

    let mut combined = Vec::with_capacity(IV_LEN + ciphertext.len());
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);
    Ok(combined)
}

/// True iff `stored` authenticates under `key` and decrypts to the
/// marker. A wrong passphrase is an expected outcome, so decryption
/// failure maps to `false` rather than an error.
pub fn verify(key: &SessionKey, stored: &[u8]) -> bool {
    if stored.len() < IV_LEN + TAG_LEN {
        return false;
    }

    let (iv, ciphertext) = stored.split_at(IV_LEN);
    match field::decrypt_field(ciphertext, iv, key) {
        Ok(plaintext) => plaintext == VERIFICATION_MARKER,
        Err(_) => false,
    }
}
