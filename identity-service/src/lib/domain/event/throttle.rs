use std::sync::Arc;

use chrono::Duration;

use crate::domain::clock::Clock;
use crate::domain::errors::AuthError;
use crate::domain::event::models::clamp_ip_address;
use crate::domain::event::models::clamp_payload;
use crate::domain::event::models::AuthEventType;
use crate::domain::event::ports::AuthEventRepository;

/// Blocks a login/address pair after too many recent failures.
///
/// The window slides: only failures younger than `window` count, and a
/// successful login does not clear them.
pub struct ThrottleGuard<ER>
where
    ER: AuthEventRepository,
{
    repository: Arc<ER>,
    threshold: u64,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl<ER> ThrottleGuard<ER>
where
    ER: AuthEventRepository,
{
    pub fn new(
        repository: Arc<ER>,
        threshold: u64,
        window: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            threshold,
            window,
            clock,
        }
    }

    /// # Errors
    /// * `Repository` - Failure count could not be read
    pub async fn has_too_many_attempts(
        &self,
        login: &str,
        client_ip: &str,
    ) -> Result<bool, AuthError> {
        let since = self.clock.now() - self.window;
        let failures = self
            .repository
            .count_since(
                AuthEventType::LoginFailure,
                &clamp_payload(login),
                &clamp_ip_address(client_ip),
                since,
            )
            .await?;

        Ok(failures >= self.threshold)
    }
}
