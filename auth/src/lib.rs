//! Authentication primitives library
//!
//! Provides the cryptographic building blocks used by the identity service:
//! - Password hashing (Argon2id) and password strength policy
//! - Deterministic API key digests (SHA-256)
//! - JWT token generation and validation (HS256)
//!
//! Nothing in this crate performs I/O; persistence and request handling
//! belong to the services that use it.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{PasswordHasher, PasswordPolicy};
//!
//! let policy = PasswordPolicy::default();
//! assert!(policy.is_valid("Correct-Horse-9"));
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("Correct-Horse-9").unwrap();
//! assert!(hasher.verify("Correct-Horse-9", &hash).unwrap());
//! ```
//!
//! ## API Keys
//! ```
//! use auth::KeyHasher;
//!
//! let hasher = KeyHasher::new();
//! let stored = hasher.hash("k3y");
//! assert!(hasher.verify("k3y", &stored));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//! use chrono::{Duration, Utc};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!")
//!     .with_issuer("identity")
//!     .with_audience("clients");
//! let now = Utc::now();
//! let claims = Claims::for_subject("user123", now, Duration::minutes(5))
//!     .with_issuer("identity")
//!     .with_audience("clients");
//! let token = handler.encode(&claims).unwrap();
//! let decoded = handler.decode_claims_at(&token, now.timestamp()).unwrap();
//! assert_eq!(decoded.sub.as_deref(), Some("user123"));
//! ```

pub mod jwt;
pub mod key;
pub mod password;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use key::KeyHasher;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
