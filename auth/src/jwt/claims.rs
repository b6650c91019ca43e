use std::collections::HashMap;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

/// Generic JWT claims structure.
///
/// Supports standard RFC 7519 claims plus custom fields via `extra` map.
/// All standard fields are optional for maximum flexibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user/entity identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// JWT ID (unique token identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for a subject valid from `issued_at` for `ttl`.
    ///
    /// # Returns
    /// Claims with sub, iat and exp set
    pub fn for_subject(sub: impl ToString, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: Some(sub.to_string()),
            exp: Some((issued_at + ttl).timestamp()),
            iat: Some(issued_at.timestamp()),
            ..Self::default()
        }
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl ToString) -> Self {
        self.iss = Some(iss.to_string());
        self
    }

    /// Set audience.
    pub fn with_audience(mut self, aud: impl ToString) -> Self {
        self.aud = Some(aud.to_string());
        self
    }

    /// Set token identifier.
    pub fn with_token_id(mut self, jti: impl ToString) -> Self {
        self.jti = Some(jti.to_string());
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Read a custom field back into a typed value.
    ///
    /// Returns `None` when the field is absent or has a different shape.
    pub fn extra_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Check if token is expired. A token is no longer valid at `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| exp <= current_timestamp)
    }
}
