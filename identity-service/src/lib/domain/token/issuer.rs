use std::sync::Arc;

use auth::Claims;
use auth::JwtHandler;
use chrono::Duration;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::domain::clock::Clock;
use crate::domain::errors::AuthError;
use crate::domain::token::models::IssuedToken;
use crate::domain::token::models::TokenContent;
use crate::domain::token::models::TokenKind;
use crate::domain::user::models::UserId;

const KIND_CLAIM: &str = "kind";
const CONTENT_CLAIM: &str = "content";

/// Signs and verifies bearer and refresh tokens (HS256).
///
/// Expiry is judged against the injected clock, not the wall clock.
pub struct TokenIssuer {
    handler: JwtHandler,
    issuer: String,
    audience: String,
    bearer_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let handler = JwtHandler::new(config.secret.as_bytes())
            .with_issuer(config.issuer.clone())
            .with_audience(config.audience.clone());

        Self {
            handler,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            bearer_ttl: config.access_token_ttl(),
            refresh_ttl: config.refresh_token_ttl(),
            clock,
        }
    }

    /// Short-lived token presented on every API call.
    ///
    /// # Errors
    /// * `Token` - Signing failed
    pub fn issue_bearer_token(
        &self,
        user_id: &UserId,
        user_agent: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.sign(TokenKind::Bearer, user_id, user_agent)
    }

    /// Long-lived token exchanged for new bearer tokens. Only the signature
    /// is produced here; persisting the session is up to the caller.
    ///
    /// # Errors
    /// * `Token` - Signing failed
    pub fn sign_refresh_token(
        &self,
        user_id: &UserId,
        user_agent: &str,
    ) -> Result<IssuedToken, AuthError> {
        self.sign(TokenKind::Refresh, user_id, user_agent)
    }

    /// Check signature, issuer, audience, expiry and purpose of a token.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, foreign issuer or audience,
    ///   malformed claims, or a token of the other kind
    /// * `ExpiredToken` - Token is past its expiry
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenContent, AuthError> {
        let claims = self
            .handler
            .decode_claims_at(token, self.clock.now().timestamp())?;

        let kind: TokenKind = claims
            .extra_as(KIND_CLAIM)
            .ok_or(AuthError::InvalidToken)?;
        if kind != expected {
            return Err(AuthError::InvalidToken);
        }

        let content: TokenContent = claims
            .extra_as(CONTENT_CLAIM)
            .ok_or(AuthError::InvalidToken)?;
        if claims.sub.as_deref() != Some(content.user_id.to_string().as_str()) {
            return Err(AuthError::InvalidToken);
        }

        Ok(content)
    }

    fn sign(
        &self,
        kind: TokenKind,
        user_id: &UserId,
        user_agent: &str,
    ) -> Result<IssuedToken, AuthError> {
        let issued_at = self.clock.now();
        let ttl = match kind {
            TokenKind::Bearer => self.bearer_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let token_id = Uuid::new_v4().to_string();
        let content = TokenContent {
            user_id: *user_id,
            user_agent: user_agent.to_string(),
        };

        let claims = Claims::for_subject(user_id, issued_at, ttl)
            .with_issuer(&self.issuer)
            .with_audience(&self.audience)
            .with_token_id(&token_id)
            .with_extra(KIND_CLAIM, kind)
            .with_extra(CONTENT_CLAIM, &content);

        let token = self.handler.encode(&claims)?;

        Ok(IssuedToken {
            token,
            token_id,
            expires_at: issued_at + ttl,
        })
    }
}
