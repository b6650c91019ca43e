use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthScheme;
use crate::inbound::http::middleware::AuthenticatedUser;

pub async fn principal(
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiSuccess<PrincipalHttpResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        PrincipalHttpResponseData {
            user_id: user.user_id.to_string(),
            scheme: user.scheme,
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalHttpResponseData {
    pub user_id: String,
    pub scheme: AuthScheme,
}
