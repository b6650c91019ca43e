use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::active_sessions::active_sessions;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::logout_all::logout_all;
use super::handlers::principal::principal;
use super::handlers::refresh::refresh;
use super::middleware::require_api_key_or_bearer;
use super::middleware::require_bearer;
use crate::config::Config;
use crate::domain::api_key::ports::ApiKeyAuthorizerPort;
use crate::domain::authentication::ports::AuthenticationServicePort;

/// Transport options the handlers need besides the services.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub refresh_token_ttl_ms: i64,
    pub api_key_header: String,
    pub trust_forwarded_for: bool,
}

impl HttpSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cookie_name: config.jwt.cookie_name.clone(),
            secure_cookie: config.jwt.secure_cookie,
            refresh_token_ttl_ms: config.jwt.refresh_token_expiration_ms,
            api_key_header: config.api_key.header.clone(),
            trust_forwarded_for: config.server.trust_forwarded_for,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthenticationServicePort>,
    pub api_key_authorizer: Arc<dyn ApiKeyAuthorizerPort>,
    pub settings: Arc<HttpSettings>,
}

pub fn create_router(
    auth_service: Arc<dyn AuthenticationServicePort>,
    api_key_authorizer: Arc<dyn ApiKeyAuthorizerPort>,
    settings: HttpSettings,
) -> Router {
    let state = AppState {
        auth_service,
        api_key_authorizer,
        settings: Arc::new(settings),
    };

    let public_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout));

    let bearer_routes = Router::new()
        .route("/api/auth/logout-all", post(logout_all))
        .route("/api/auth/sessions", get(active_sessions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    let principal_routes = Router::new()
        .route("/api/auth/principal", get(principal))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key_or_bearer,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(bearer_routes)
        .merge(principal_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
