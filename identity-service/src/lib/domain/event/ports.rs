use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::errors::RepositoryError;
use crate::domain::event::models::AuthEvent;
use crate::domain::event::models::AuthEventType;

/// Append-only audit trail.
#[async_trait]
pub trait AuthEventRepository: Send + Sync + 'static {
    /// Persist one event.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn append(&self, event: &AuthEvent) -> Result<(), RepositoryError>;

    /// Count events of a type for a payload and client address created
    /// strictly after `since`.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn count_since(
        &self,
        event_type: AuthEventType,
        payload: &str,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;
}
