//! Challenge-response login
//!
//! The challenge is the current UTC instant rendered at nanosecond
//! precision in a fixed-width form, e.g. `2025-06-01T12:00:00.000000001Z`.
//! Fixed width keeps challenges lexicographically ordered, and the builder
//! never hands out the same instant twice, so no two logins sign the same
//! bytes. Rejecting stale challenges is up to the service.

use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::identity::Identity;
use crate::service::AuthRequest;

/// Source of the current UTC instant
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("account id must not be empty")]
    MissingAccountId,
    #[error("failed to format challenge: {0}")]
    Format(#[from] time::error::Format),
}

/// Builds signed [`AuthRequest`]s
#[derive(Debug, Default)]
pub struct AuthChallengeBuilder<C = SystemClock> {
    clock: C,
    last_issued: Mutex<Option<OffsetDateTime>>,
}

impl<C: Clock> AuthChallengeBuilder<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last_issued: Mutex::new(None),
        }
    }

    /// Sign a fresh challenge with `identity` for `account_id`
    pub fn build(&self, identity: &Identity, account_id: &str) -> Result<AuthRequest, AuthError> {
        if account_id.trim().is_empty() {
            return Err(AuthError::MissingAccountId);
        }

        let challenge = format_challenge(self.next_instant())?;
        let signature = identity.sign(challenge.as_bytes());

        Ok(AuthRequest {
            id: account_id.to_string(),
            signature: STANDARD.encode(signature.to_bytes()),
            challenge: STANDARD.encode(challenge.as_bytes()),
            public_key: identity.public_key().to_base64(),
        })
    }

    /// The clock's reading, bumped past the previous challenge if the clock
    /// did not move forward since
    fn next_instant(&self) -> OffsetDateTime {
        let now = self.clock.now_utc().to_offset(UtcOffset::UTC);
        let mut last = self
            .last_issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let instant = match *last {
            Some(prev) if now <= prev => prev + Duration::nanoseconds(1),
            _ => now,
        };
        *last = Some(instant);
        instant
    }
}

fn format_challenge(instant: OffsetDateTime) -> Result<String, time::error::Format> {
    instant.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
    ))
}
