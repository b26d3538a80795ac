use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Malformed stored data: {0}")]
    Encoding(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Vault has not been set up for this user")]
    NotInitialized,

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store operation failed: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
