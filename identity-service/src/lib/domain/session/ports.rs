use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::errors::RepositoryError;
use crate::domain::session::models::SessionId;
use crate::domain::session::models::SessionToken;
use crate::domain::user::models::UserId;

/// Persistence port for refresh token sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Insert a session while keeping at most `cap` sessions of its owner
    /// live at `now`.
    ///
    /// Reading the owner's live sessions, expiring the ones chosen by
    /// [`select_evictions`](crate::domain::session::models::select_evictions)
    /// and inserting happen as one unit: concurrent calls for the same owner
    /// must not interleave.
    ///
    /// # Returns
    /// Identifiers of the evicted sessions
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn insert_capped(
        &self,
        session: &SessionToken,
        cap: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionId>, RepositoryError>;

    /// Retrieve a session by the digest of its token.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<SessionToken>, RepositoryError>;

    /// Sessions of a user still live at `now`, newest first.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_active_by_owner(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionToken>, RepositoryError>;

    /// Stamp `expired_at = now` on a session that is live at `now`.
    ///
    /// # Returns
    /// `false` when the session was already expired or does not exist
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn expire(&self, id: &SessionId, now: DateTime<Utc>) -> Result<bool, RepositoryError>;

    /// Stamp `expired_at = now` on every live session of a user.
    ///
    /// # Returns
    /// Number of sessions stamped
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn expire_all_for_owner(
        &self,
        owner: &UserId,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;
}
