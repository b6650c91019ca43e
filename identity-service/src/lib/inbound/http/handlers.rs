use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use serde::Serialize;

use crate::domain::errors::AuthError;
use crate::inbound::http::router::HttpSettings;

pub mod active_sessions;
pub mod login;
pub mod logout;
pub mod logout_all;
pub mod principal;
pub mod refresh;

/// Client-visible message for every credential or token failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError { reference: String },
    UnprocessableEntity { reference: String, message: String },
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, data) = match self {
            ApiError::InternalServerError { reference } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorData {
                    reference: Some(reference),
                    message: "Internal server error".to_string(),
                },
            ),
            ApiError::UnprocessableEntity { reference, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorData {
                    reference: Some(reference),
                    message,
                },
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiErrorData {
                    reference: None,
                    message: UNAUTHORIZED_MESSAGE.to_string(),
                },
            ),
        };

        (status, Json(ApiResponseBody::new(status, data))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthorized() {
            tracing::info!(reference = err.reference(), error = %err, "Request unauthorized");
            return ApiError::Unauthorized;
        }

        match err {
            AuthError::WeakPassword(_) => ApiError::UnprocessableEntity {
                reference: err.reference().to_string(),
                message: err.to_string(),
            },
            _ => {
                tracing::error!(reference = err.reference(), error = %err, "Request failed");
                ApiError::InternalServerError {
                    reference: err.reference().to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub message: String,
}

/// Cookie carrying a refresh token.
pub(crate) fn refresh_cookie(settings: &HttpSettings, token: String) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), token))
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::milliseconds(settings.refresh_token_ttl_ms))
        .build()
}

/// Cookie matching [`refresh_cookie`] for removal from the jar.
pub(crate) fn refresh_cookie_removal(settings: &HttpSettings) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), ""))
        .path("/")
        .build()
}
