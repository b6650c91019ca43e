use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::context::RequestContext;
use crate::domain::errors::AuthError;
use crate::domain::event::models::AuthEvent;
use crate::domain::event::models::AuthEventType;
use crate::domain::event::ports::AuthEventRepository;
use crate::domain::user::models::UserId;

/// Writes login and logout outcomes to the audit trail.
pub struct AuthEventRecorder<ER>
where
    ER: AuthEventRepository,
{
    repository: Arc<ER>,
    clock: Arc<dyn Clock>,
}

impl<ER> AuthEventRecorder<ER>
where
    ER: AuthEventRepository,
{
    pub fn new(repository: Arc<ER>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Append one event stamped with the current instant.
    ///
    /// # Arguments
    /// * `error` - Failure that ended the operation, if any
    /// * `owner` - User the event belongs to, when known
    /// * `payload` - Submitted login, for login events
    ///
    /// # Errors
    /// * `Repository` - Event could not be persisted
    pub async fn record(
        &self,
        event_type: AuthEventType,
        error: Option<&AuthError>,
        owner: Option<&UserId>,
        payload: Option<&str>,
        context: &RequestContext,
    ) -> Result<AuthEvent, AuthError> {
        let mut event = AuthEvent::new(event_type, context, self.clock.now());
        if let Some(owner) = owner {
            event = event.with_owner(*owner);
        }
        if let Some(payload) = payload {
            event = event.with_payload(payload);
        }
        if let Some(error) = error {
            event = event.with_errors(&[error.detail()]);
        }

        self.repository.append(&event).await?;

        tracing::info!(
            event_type = %event_type,
            user_id = ?owner.map(|id| id.to_string()),
            reference = ?error.map(AuthError::reference),
            "Recorded authentication event"
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::errors::RepositoryError;

    mock! {
        pub TestEventRepository {}

        #[async_trait]
        impl AuthEventRepository for TestEventRepository {
            async fn append(&self, event: &AuthEvent) -> Result<(), RepositoryError>;
            async fn count_since(
                &self,
                event_type: AuthEventType,
                payload: &str,
                ip_address: &str,
                since: DateTime<Utc>,
            ) -> Result<u64, RepositoryError>;
        }
    }

    fn context() -> RequestContext {
        RequestContext::new("192.168.1.7", "Mozilla/5.0")
    }

    #[tokio::test]
    async fn test_record_failure_carries_error_and_payload() {
        let now = Utc::now();
        let mut repository = MockTestEventRepository::new();
        repository
            .expect_append()
            .withf(move |event| {
                event.event_type == AuthEventType::LoginFailure
                    && event.payload.as_deref() == Some("alice")
                    && event.has_error
                    && event.owner_user_id.is_none()
                    && event.ip_address == "192.168.1.7"
                    && event.created_at == now
            })
            .times(1)
            .returning(|_| Ok(()));
        let recorder =
            AuthEventRecorder::new(Arc::new(repository), Arc::new(ManualClock::new(now)));

        let event = recorder
            .record(
                AuthEventType::LoginFailure,
                Some(&AuthError::InvalidCredentials),
                None,
                Some("alice"),
                &context(),
            )
            .await
            .unwrap();

        assert!(event
            .error_trace
            .unwrap()
            .contains("AUTH_INVALID_CREDENTIALS"));
    }

    #[tokio::test]
    async fn test_record_success_sets_owner() {
        let owner = UserId::new();
        let mut repository = MockTestEventRepository::new();
        repository
            .expect_append()
            .withf(move |event| event.owner_user_id == Some(owner) && !event.has_error)
            .times(1)
            .returning(|_| Ok(()));
        let recorder =
            AuthEventRecorder::new(Arc::new(repository), Arc::new(ManualClock::default()));

        let result = recorder
            .record(
                AuthEventType::LoginSuccess,
                None,
                Some(&owner),
                Some("alice"),
                &context(),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_record_propagates_repository_failure() {
        let mut repository = MockTestEventRepository::new();
        repository
            .expect_append()
            .returning(|_| Err(RepositoryError::Database("disk full".into())));
        let recorder =
            AuthEventRecorder::new(Arc::new(repository), Arc::new(ManualClock::default()));

        let result = recorder
            .record(AuthEventType::Logout, None, None, None, &context())
            .await;

        assert!(matches!(result, Err(AuthError::Repository(_))));
    }
}
