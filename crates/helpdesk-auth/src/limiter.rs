//! Per-address brute-force throttling and the permanent deny-list.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use helpdesk_core::config::AuthConfig;
use helpdesk_core::result::AppResult;
use helpdesk_entity::banned::ip_to_long;

use crate::store::{AttemptStore, DenyListStore};

/// Verdict for one login attempt from an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimiterDecision {
    /// The attempt may proceed.
    Allowed,
    /// The address exhausted its attempts inside the rolling window.
    Banned {
        /// Minutes until the window elapses, at least 1.
        retry_after_minutes: i64,
    },
    /// The address is on the permanent deny-list.
    Denied,
}

/// What to write back to the counter after a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CounterAction {
    /// Start or restart the counter at one.
    Reset,
    /// Bump the existing counter.
    Increment(i32),
    /// Leave the row untouched (banned attempts do not slide the window).
    Keep,
}

/// Brute-force limiter backed by the attempt counter and deny-list tables.
#[derive(Clone)]
pub struct BruteForceLimiter {
    attempts: Arc<dyn AttemptStore>,
    banned: Arc<dyn DenyListStore>,
    config: AuthConfig,
}

impl std::fmt::Debug for BruteForceLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BruteForceLimiter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BruteForceLimiter {
    /// Creates a new limiter.
    pub fn new(
        attempts: Arc<dyn AttemptStore>,
        banned: Arc<dyn DenyListStore>,
        config: AuthConfig,
    ) -> Self {
        Self {
            attempts,
            banned,
            config,
        }
    }

    /// Register one login attempt from the address and decide its fate.
    ///
    /// The permanent deny-list is consulted first and a hit never touches
    /// the counter. With throttling enabled, each allowed attempt bumps the
    /// counter; a banned attempt leaves the row alone so the window does
    /// not slide.
    pub async fn check(&self, ip: IpAddr, now: DateTime<Utc>) -> AppResult<LimiterDecision> {
        if self.is_denied(ip).await? {
            warn!(%ip, "Login attempt from permanently banned address");
            return Ok(LimiterDecision::Denied);
        }

        if self.config.attempt_limit == 0 {
            return Ok(LimiterDecision::Allowed);
        }

        let ip_key = ip.to_string();
        let existing = self.attempts.find(&ip_key).await?;

        let (decision, action) = match existing {
            None => (LimiterDecision::Allowed, CounterAction::Reset),
            Some(row) => decide(
                row.failures,
                row.last_attempt,
                now,
                self.config.attempt_limit as i32,
                self.config.attempt_ban_minutes,
            ),
        };

        match action {
            CounterAction::Reset => self.attempts.upsert(&ip_key, 1, now).await?,
            CounterAction::Increment(failures) => {
                self.attempts.upsert(&ip_key, failures, now).await?;
            }
            CounterAction::Keep => {}
        }

        if let LimiterDecision::Banned {
            retry_after_minutes,
        } = decision
        {
            warn!(%ip, retry_after_minutes, "Address banned by attempt limiter");
        }

        Ok(decision)
    }

    /// Deny-list membership alone, without any counter bookkeeping.
    pub async fn is_denied(&self, ip: IpAddr) -> AppResult<bool> {
        match ip_to_long(ip) {
            Some(ip_long) => self.banned.is_banned(ip_long).await,
            None => Ok(false),
        }
    }

    /// Forget the address's counter after a successful login.
    pub async fn clear(&self, ip: IpAddr) -> AppResult<()> {
        self.attempts.delete(&ip.to_string()).await?;
        Ok(())
    }
}

/// Pure decision arithmetic for an address with an existing counter row.
fn decide(
    failures: i32,
    last_attempt: DateTime<Utc>,
    now: DateTime<Utc>,
    limit: i32,
    window_minutes: i64,
) -> (LimiterDecision, CounterAction) {
    let window_end = last_attempt + Duration::minutes(window_minutes);

    if failures >= limit {
        if now < window_end {
            let remaining = window_end - now;
            let minutes = (remaining.num_seconds() + 59) / 60;
            (
                LimiterDecision::Banned {
                    retry_after_minutes: minutes.max(1),
                },
                CounterAction::Keep,
            )
        } else {
            // Window elapsed since the attempt that hit the limit.
            (LimiterDecision::Allowed, CounterAction::Reset)
        }
    } else if now >= window_end {
        (LimiterDecision::Allowed, CounterAction::Reset)
    } else {
        (
            LimiterDecision::Allowed,
            CounterAction::Increment(failures + 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::minutes(minutes_ago), now)
    }

    #[test]
    fn below_limit_increments() {
        let (last, now) = at(1);
        let (decision, action) = decide(2, last, now, 5, 15);
        assert_eq!(decision, LimiterDecision::Allowed);
        assert_eq!(action, CounterAction::Increment(3));
    }

    #[test]
    fn at_limit_inside_window_is_banned() {
        let (last, now) = at(5);
        let (decision, action) = decide(5, last, now, 5, 15);
        assert_eq!(
            decision,
            LimiterDecision::Banned {
                retry_after_minutes: 10
            }
        );
        assert_eq!(action, CounterAction::Keep);
    }

    #[test]
    fn ban_reports_at_least_one_minute() {
        let now = Utc::now();
        let last = now - Duration::seconds(14 * 60 + 45);
        let (decision, _) = decide(5, last, now, 5, 15);
        assert_eq!(
            decision,
            LimiterDecision::Banned {
                retry_after_minutes: 1
            }
        );
    }

    #[test]
    fn at_limit_after_window_resets() {
        let (last, now) = at(20);
        let (decision, action) = decide(7, last, now, 5, 15);
        assert_eq!(decision, LimiterDecision::Allowed);
        assert_eq!(action, CounterAction::Reset);
    }

    #[test]
    fn stale_counter_below_limit_also_resets() {
        let (last, now) = at(60);
        let (decision, action) = decide(3, last, now, 5, 15);
        assert_eq!(decision, LimiterDecision::Allowed);
        assert_eq!(action, CounterAction::Reset);
    }
}
