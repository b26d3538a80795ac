/// The unlocked-session object.
///
/// Holds the derived key for exactly one unlock. The key is written once
/// by the unlock flow and only read afterward; `lock()` consumes the
/// session and the key bytes are zeroized on drop. There is no ambient
/// global key storage.
use crate::crypto::sensitive::SessionKey;

pub struct VaultSession {
    owner_id: String,
    key: SessionKey,
}

impl VaultSession {
    pub(crate) fn new(owner_id: String, key: SessionKey) -> Self {
        Self { owner_id, key }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub(crate) fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Lock the vault: the session is consumed and the key is wiped.
    pub fn lock(self) {
        drop(self);
    }
}

// Key material must not leak through format strings.
impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("owner_id", &self.owner_id)
            .field("key", &"<redacted>")
            .finish()
    }
}
