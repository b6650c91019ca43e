use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;

use crate::domain::errors::AuthError;
use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    ApiKey,
    Bearer,
}

/// Extension type to store the authenticated caller in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub scheme: AuthScheme,
}

/// Middleware that validates the bearer token and adds the caller to
/// request extensions
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate_bearer(&state, req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Middleware accepting an API key, falling back to a bearer token when the
/// key header is absent or the key is refused
pub async fn require_api_key_or_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented_key = req
        .headers()
        .get(state.settings.api_key_header.as_str())
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let user = match presented_key {
        Some(key) => match state
            .api_key_authorizer
            .authorize_api_user(Some(&key))
            .await
        {
            Ok(principal) => AuthenticatedUser {
                user_id: UserId(principal.owner_id),
                scheme: AuthScheme::ApiKey,
            },
            Err(err) if err.is_unauthorized() && has_bearer(req.headers()) => {
                tracing::debug!(reference = err.reference(), "API key refused, trying bearer");
                authenticate_bearer(&state, req.headers())?
            }
            Err(err) => return Err(err.into()),
        },
        None => authenticate_bearer(&state, req.headers())?,
    };

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

fn authenticate_bearer(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ApiError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::TokenNotFound)?;
    let content = state.auth_service.authenticate_bearer(token)?;

    Ok(AuthenticatedUser {
        user_id: content.user_id,
        scheme: AuthScheme::Bearer,
    })
}

fn has_bearer(headers: &HeaderMap) -> bool {
    extract_bearer_token(headers).is_some()
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
