use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::context::RequestContext;
use crate::domain::errors::ErrorDetail;
use crate::domain::user::models::UserId;
use crate::domain::user::models::API_USER_TYPE;

/// Upper bound of the stored user agent, in characters.
pub const MAX_USER_AGENT_LEN: usize = 1024;
/// Upper bound of the stored client address (IPv6 text form).
pub const MAX_IP_ADDRESS_LEN: usize = 45;
/// Upper bound of the serialized error trace, in characters.
pub const MAX_ERROR_TRACE_LEN: usize = 4096;
/// Upper bound of the stored login payload, matching `api_users.login`.
pub const MAX_PAYLOAD_LEN: usize = 255;

/// Kind of authentication outcome being audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEventType {
    LoginSuccess,
    LoginFailure,
    LoginTooManyRequests,
    Logout,
    LogoutAll,
}

impl AuthEventType {
    /// Storage code.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEventType::LoginSuccess => "login_success",
            AuthEventType::LoginFailure => "login_failure",
            AuthEventType::LoginTooManyRequests => "login_too_many_requests",
            AuthEventType::Logout => "logout",
            AuthEventType::LogoutAll => "logout_all",
        }
    }

    /// Human readable action name stored next to the code.
    pub fn display_name(&self) -> &'static str {
        match self {
            AuthEventType::LoginSuccess => "login - Success",
            AuthEventType::LoginFailure => "login - Failure",
            AuthEventType::LoginTooManyRequests => "login - Too many requests",
            AuthEventType::Logout => "logout",
            AuthEventType::LogoutAll => "logout - all devices",
        }
    }

}

impl fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit event unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthEventId(pub Uuid);

impl AuthEventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AuthEventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only record of one authentication outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub id: AuthEventId,
    pub event_type: AuthEventType,
    pub action_name: String,
    pub user_agent: String,
    pub ip_address: String,
    pub owner_user_id: Option<UserId>,
    pub owner_type: Option<String>,
    /// Login submitted with the request, if any.
    pub payload: Option<String>,
    pub has_error: bool,
    pub error_trace: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuthEvent {
    /// Start an event for the given request, clamping the request data to
    /// the stored bounds.
    pub fn new(event_type: AuthEventType, context: &RequestContext, at: DateTime<Utc>) -> Self {
        Self {
            id: AuthEventId::new(),
            event_type,
            action_name: event_type.display_name().to_string(),
            user_agent: truncate_chars(&context.user_agent, MAX_USER_AGENT_LEN),
            ip_address: clamp_ip_address(&context.ip_address),
            owner_user_id: None,
            owner_type: None,
            payload: None,
            has_error: false,
            error_trace: None,
            created_at: at,
        }
    }

    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner_user_id = Some(owner);
        self.owner_type = Some(API_USER_TYPE.to_string());
        self
    }

    pub fn with_payload(mut self, payload: &str) -> Self {
        self.payload = Some(clamp_payload(payload));
        self
    }

    /// Attach the errors of the operation as a JSON trace.
    pub fn with_errors(mut self, errors: &[ErrorDetail]) -> Self {
        if errors.is_empty() {
            return self;
        }
        let trace = serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string());
        self.has_error = true;
        self.error_trace = Some(truncate_chars(&trace, MAX_ERROR_TRACE_LEN));
        self
    }
}

/// Client address as it is stored, and therefore as it must be queried.
pub fn clamp_ip_address(ip_address: &str) -> String {
    truncate_chars(ip_address, MAX_IP_ADDRESS_LEN)
}

/// Login payload as it is stored, and therefore as it must be queried.
pub fn clamp_payload(payload: &str) -> String {
    truncate_chars(payload, MAX_PAYLOAD_LEN)
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((end, _)) => value[..end].to_string(),
        None => value.to_string(),
    }
}
