use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::SessionToken;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn active_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<Vec<SessionHttpResponseData>>, ApiError> {
    let sessions = state.auth_service.active_sessions(&user.user_id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        sessions.iter().map(SessionHttpResponseData::from).collect(),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHttpResponseData {
    pub id: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl From<&SessionToken> for SessionHttpResponseData {
    fn from(session: &SessionToken) -> Self {
        Self {
            id: session.id.to_string(),
            user_agent: session.user_agent.clone(),
            created_at: session.created_at,
            expired_at: session.expired_at,
        }
    }
}
