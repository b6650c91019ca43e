use std::net::SocketAddr;

use axum::async_trait;
use axum::extract::ConnectInfo;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::domain::context::RequestContext;
use crate::inbound::http::router::AppState;

const FORWARDED_FOR: &str = "x-forwarded-for";

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = if state.settings.trust_forwarded_for {
            forwarded_for(&parts.headers)
        } else {
            None
        };

        let ip_address = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(peer)| peer.ip().to_string())
            })
            .unwrap_or_else(|| RequestContext::UNKNOWN.to_string());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(RequestContext::UNKNOWN)
            .to_string();

        Ok(RequestContext::new(ip_address, user_agent))
    }
}

/// First address of `X-Forwarded-For`, the original client.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}
