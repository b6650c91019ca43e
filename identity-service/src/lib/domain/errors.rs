use auth::JwtError;
use auth::PasswordError;
use serde::Serialize;
use thiserror::Error;

/// Error for persistence operations.
///
/// Infrastructure failures; never retried by the domain.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(String),
}

/// Top-level error for authentication and authorization operations.
///
/// Expected failures (bad password, expired token, ...) are ordinary
/// values of this type. Every variant carries a stable reference code,
/// see [`AuthError::reference`].
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Login path
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is inactive")]
    InactiveUser,

    #[error("Too many login attempts")]
    TooManyAttempts,

    // Token and API key path
    #[error("Token not found")]
    TokenNotFound,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Password does not meet policy: {0}")]
    WeakPassword(String),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(PasswordError),

    #[error("Token error: {0}")]
    Token(JwtError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Stable reference code, safe to show to clients and to store in audit
    /// records.
    pub fn reference(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            AuthError::InactiveUser => "AUTH_INACTIVE_USER",
            AuthError::TooManyAttempts => "AUTH_TOO_MANY_ATTEMPTS",
            AuthError::TokenNotFound => "AUTH_TOKEN_NOT_FOUND",
            AuthError::InvalidToken => "AUTH_INVALID_TOKEN",
            AuthError::ExpiredToken => "AUTH_EXPIRED_TOKEN",
            AuthError::WeakPassword(_) => "AUTH_WEAK_PASSWORD",
            AuthError::Password(_) => "AUTH_PASSWORD_FAILURE",
            AuthError::Token(_) => "AUTH_TOKEN_FAILURE",
            AuthError::Repository(_) => "INFRA_REPOSITORY",
        }
    }

    /// True for every failure that maps to an unauthorized outcome.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::InactiveUser
                | AuthError::TooManyAttempts
                | AuthError::TokenNotFound
                | AuthError::InvalidToken
                | AuthError::ExpiredToken
        )
    }

    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail {
            reference: self.reference().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooWeak(reason) => AuthError::WeakPassword(reason),
            other => AuthError::Password(other),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => AuthError::ExpiredToken,
            JwtError::InvalidToken(_) | JwtError::DecodingFailed(_) | JwtError::MissingClaim(_) => {
                AuthError::InvalidToken
            }
            JwtError::EncodingFailed(_) => AuthError::Token(err),
        }
    }
}

/// Serializable view of an error, as written to the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub reference: String,
    pub message: String,
}
