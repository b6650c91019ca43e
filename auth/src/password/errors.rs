use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password verification failed: {0}")]
    VerificationFailed(String),

    #[error("Invalid hashing cost: {0}")]
    InvalidCost(String),

    #[error("Invalid password policy: {0}")]
    InvalidPattern(String),

    #[error("Password too weak: {0}")]
    TooWeak(String),
}
