/// Policy configuration for a vault instance.
///
/// KDF and cipher parameters are deliberately NOT here — they are
/// versioned policy constants in `crypto::kdf` / `crypto::field`, so
/// every derivation for a given vault stays reproducible.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Number of decrypted records per page.
    pub page_size: usize,
    /// Consecutive failed unlock attempts before forced logout.
    pub max_attempts: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_attempts: 3,
        }
    }
}
