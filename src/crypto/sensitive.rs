/// Wrapper for the in-memory session key, zeroized on drop.
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The symmetric key of an unlocked session. Never serialized, never
/// logged, never transmitted; the bytes are wiped when the value drops.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey([u8; 32]);

impl SessionKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for SessionKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// No Debug impl: key material must not leak through format strings.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_bytes() {
        let key = SessionKey::new([0xAA; 32]);
        assert_eq!(key.as_bytes(), &[0xAA; 32]);
    }
}
