use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::refresh_cookie;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::authentication::ports::LoginTokens;
use crate::domain::context::RequestContext;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    context: RequestContext,
    jar: CookieJar,
    Json(body): Json<LoginHttpRequestBody>,
) -> Result<(CookieJar, ApiSuccess<TokenHttpResponseData>), ApiError> {
    let tokens = state
        .auth_service
        .login(&body.login, &body.password, &context)
        .await?;

    Ok(issue_response(&state, jar, tokens))
}

/// Set the refresh cookie and return the bearer token in the body.
pub(super) fn issue_response(
    state: &AppState,
    jar: CookieJar,
    tokens: LoginTokens,
) -> (CookieJar, ApiSuccess<TokenHttpResponseData>) {
    let jar = jar.add(refresh_cookie(&state.settings, tokens.refresh.token));
    (
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            TokenHttpResponseData {
                token: tokens.bearer.token,
                expires_at: tokens.bearer.expires_at,
            },
        ),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginHttpRequestBody {
    login: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenHttpResponseData {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
