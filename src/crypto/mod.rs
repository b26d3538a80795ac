/// Cryptographic leaves of the vault.
///
/// - `kdf`: passphrase → key (PBKDF2-HMAC-SHA256, versioned policy constants)
/// - `field`: authenticated field encryption (AES-256-GCM)
/// - `verifier`: zero-knowledge passphrase check against a stored blob
/// - `sensitive`: zeroize-on-drop key wrapper
pub mod field;
pub mod kdf;
pub mod sensitive;
pub mod verifier;
