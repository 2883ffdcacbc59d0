//! Rate limiter for login attempts
//!
//! - At most 5 failed logins per email address in 15 minutes
//! - At most 20 login requests per IP address in one minute

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use tokio::sync::RwLock;

const EMAIL_MAX_FAILURES: usize = 5;
const IP_MAX_REQUESTS: usize = 20;

fn email_window() -> Duration {
    Duration::minutes(15)
}

fn ip_window() -> Duration {
    Duration::minutes(1)
}

/// Sliding-window login rate limiter kept in memory
#[derive(Default)]
pub struct LoginRateLimiter {
    email_failures: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    ip_requests: RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds until `email` may try again, or `None` when it is not limited
    pub async fn email_retry_after(&self, email: &str) -> Option<i64> {
        let mut failures = self.email_failures.write().await;
        let entry = failures.entry(email.to_lowercase()).or_default();
        retry_after(entry, EMAIL_MAX_FAILURES, email_window(), Utc::now())
    }

    /// Record a failed login for `email`
    pub async fn record_failure(&self, email: &str) {
        let mut failures = self.email_failures.write().await;
        failures.entry(email.to_lowercase()).or_default().push(Utc::now());
    }

    /// Forget failures for `email` after a successful login
    pub async fn clear_failures(&self, email: &str) {
        self.email_failures.write().await.remove(&email.to_lowercase());
    }

    /// Count a login request from `ip` and return seconds to wait if the IP
    /// is over its budget. Rejected requests are not counted.
    pub async fn hit_ip(&self, ip: IpAddr) -> Option<i64> {
        let mut requests = self.ip_requests.write().await;
        let now = Utc::now();
        let entry = requests.entry(ip).or_default();

        if let Some(wait) = retry_after(entry, IP_MAX_REQUESTS, ip_window(), now) {
            return Some(wait);
        }
        entry.push(now);
        None
    }

    /// Drop expired entries
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let email_cutoff = now - email_window();
        let ip_cutoff = now - ip_window();

        self.email_failures.write().await.retain(|_, times| {
            times.retain(|t| *t > email_cutoff);
            !times.is_empty()
        });
        self.ip_requests.write().await.retain(|_, times| {
            times.retain(|t| *t > ip_cutoff);
            !times.is_empty()
        });
    }

    /// Number of tracked emails and IPs
    pub async fn tracked(&self) -> (usize, usize) {
        (
            self.email_failures.read().await.len(),
            self.ip_requests.read().await.len(),
        )
    }
}

/// Prune `times` to the window ending at `now`; when `max` or more remain,
/// return the seconds until the oldest one leaves the window.
fn retry_after(
    times: &mut Vec<DateTime<Utc>>,
    max: usize,
    window: Duration,
    now: DateTime<Utc>,
) -> Option<i64> {
    let cutoff = now - window;
    times.retain(|t| *t > cutoff);

    if times.len() < max {
        return None;
    }
    let oldest = times.iter().min()?;
    Some(((*oldest + window) - now).num_seconds().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_email_limit_after_five_failures() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..4 {
            limiter.record_failure("ada@zuree.com").await;
        }
        assert!(limiter.email_retry_after("ada@zuree.com").await.is_none());

        limiter.record_failure("ada@zuree.com").await;
        let wait = limiter.email_retry_after("ada@zuree.com").await.expect("should be limited");
        assert!(wait > 0 && wait <= 15 * 60);

        limiter.clear_failures("ada@zuree.com").await;
        assert!(limiter.email_retry_after("ada@zuree.com").await.is_none());
    }

    #[tokio::test]
    async fn test_email_is_case_insensitive() {
        let limiter = LoginRateLimiter::new();
        for email in ["Ada@Zuree.com", "ADA@ZUREE.COM", "ada@zuree.com", "aDa@zuree.com", "ada@ZUREE.com"] {
            limiter.record_failure(email).await;
        }
        assert!(limiter.email_retry_after("ada@zuree.com").await.is_some());
    }

    #[tokio::test]
    async fn test_ip_limit() {
        let limiter = LoginRateLimiter::new();
        let ip = IpAddr::from_str("203.0.113.9").unwrap();

        for _ in 0..20 {
            assert!(limiter.hit_ip(ip).await.is_none());
        }
        let wait = limiter.hit_ip(ip).await.expect("21st request should be limited");
        assert!(wait > 0 && wait <= 60);

        let other = IpAddr::from_str("203.0.113.10").unwrap();
        assert!(limiter.hit_ip(other).await.is_none());
    }

    #[test]
    fn test_retry_after_drops_old_entries() {
        let now = Utc::now();
        let mut times = vec![now - Duration::minutes(20); 5];
        assert!(retry_after(&mut times, 5, Duration::minutes(15), now).is_none());
        assert!(times.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_fresh_entries() {
        let limiter = LoginRateLimiter::new();
        limiter.record_failure("ada@zuree.com").await;
        limiter.hit_ip(IpAddr::from_str("127.0.0.1").unwrap()).await;

        limiter.cleanup().await;
        assert_eq!(limiter.tracked().await, (1, 1));
    }
}
