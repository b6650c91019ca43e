use axum::extract::State;
use axum_extra::extract::CookieJar;

use super::login::issue_response;
use super::login::TokenHttpResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::context::RequestContext;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    context: RequestContext,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<TokenHttpResponseData>), ApiError> {
    let presented = jar
        .get(&state.settings.cookie_name)
        .map(|cookie| cookie.value().to_string());

    let tokens = state
        .auth_service
        .refresh_tokens(presented.as_deref(), &context)
        .await?;

    Ok(issue_response(&state, jar, tokens))
}
