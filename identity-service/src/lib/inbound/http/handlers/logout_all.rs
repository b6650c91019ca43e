use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::CookieJar;

use super::refresh_cookie_removal;
use super::ApiError;
use crate::domain::context::RequestContext;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn logout_all(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    context: RequestContext,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let revoked = state
        .auth_service
        .logout_all(&user.user_id, &context)
        .await?;
    tracing::info!(user_id = %user.user_id, revoked, "Logged out of all devices");

    Ok((
        jar.remove(refresh_cookie_removal(&state.settings)),
        StatusCode::NO_CONTENT,
    ))
}
