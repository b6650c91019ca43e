use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;

use super::refresh_cookie_removal;
use super::ApiError;
use crate::domain::context::RequestContext;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    context: RequestContext,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let presented = jar
        .get(&state.settings.cookie_name)
        .map(|cookie| cookie.value().to_string());

    state
        .auth_service
        .logout(presented.as_deref(), &context)
        .await?;

    Ok((
        jar.remove(refresh_cookie_removal(&state.settings)),
        StatusCode::NO_CONTENT,
    ))
}
