//! # Rate Limiting
//!
//! Sliding-window counters keyed by `action:client`.
//!
//! - Each key holds the timestamps of its admitted calls
//! - Timestamps older than the window are dropped on every check, there is no background eviction
//! - A refused call is not recorded, so a client that keeps hammering is admitted again once its
//!   oldest admitted call leaves the window
//! - Counters live in process memory only; every instance counts on its own
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use axum::http::HeaderMap;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{config::RateLimit, error::AppError};

const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Default)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Vec<Instant>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admitted {
    pub too_frequent: bool,
}

pub fn client_key(forwarded_for: Option<&str>, action: &str) -> String {
    let client = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown");

    format!("{action}:{client}")
}

pub fn client_key_from_headers(headers: &HeaderMap, action: &str) -> String {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok());

    client_key(forwarded_for, action)
}

fn retain_recent(stamps: &mut Vec<Instant>, window: Duration, now: Instant) {
    stamps.retain(|stamp| now.saturating_duration_since(*stamp) <= window);
}

impl RateLimiter {
    /// Records a call unless `key` is at `limit`. Returns the calls already in the window when
    /// the new one was recorded.
    pub async fn record_at(
        &self,
        key: &str,
        limit: usize,
        window: Duration,
        now: Instant,
    ) -> Option<usize> {
        let mut windows = self.windows.lock().await;

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, stamps| {
                retain_recent(stamps, window, now);
                !stamps.is_empty()
            });
        }

        let stamps = windows.entry(key.to_string()).or_default();
        retain_recent(stamps, window, now);

        let prior = stamps.len();
        if prior >= limit {
            return None;
        }

        stamps.push(now);
        Some(prior)
    }

    /// Refuses with 429 past the hard limit, flags the call past the soft limit.
    pub async fn admit(&self, key: &str, rule: &RateLimit) -> Result<Admitted, AppError> {
        let Some(prior) = self
            .record_at(key, rule.limit, rule.window, Instant::now())
            .await
        else {
            warn!("Rate limited {key}");
            return Err(AppError::RateLimited);
        };

        Ok(Admitted {
            too_frequent: prior >= rule.soft_limit(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_limit_plus_one_is_limited() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for i in 0..3 {
            let now = start + Duration::from_secs(i);
            assert!(limiter.record_at("newsletter:1.2.3.4", 3, WINDOW, now).await.is_some());
        }

        let fourth = start + Duration::from_secs(3);
        assert!(limiter.record_at("newsletter:1.2.3.4", 3, WINDOW, fourth).await.is_none());
    }

    #[tokio::test]
    async fn test_window_elapses() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.record_at("seat-status:a", 3, WINDOW, start).await;
        }
        assert!(limiter.record_at("seat-status:a", 3, WINDOW, start).await.is_none());

        let later = start + WINDOW + Duration::from_secs(1);
        assert_eq!(limiter.record_at("seat-status:a", 3, WINDOW, later).await, Some(0));
        assert_eq!(limiter.record_at("seat-status:a", 3, WINDOW, later).await, Some(1));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        assert!(limiter.record_at("a:x", 1, WINDOW, now).await.is_some());
        assert!(limiter.record_at("a:x", 1, WINDOW, now).await.is_none());
        assert!(limiter.record_at("a:y", 1, WINDOW, now).await.is_some());
        assert!(limiter.record_at("b:x", 1, WINDOW, now).await.is_some());
    }

    #[tokio::test]
    async fn test_refused_calls_not_recorded() {
        let limiter = RateLimiter::default();
        let now = Instant::now();

        limiter.record_at("k", 2, WINDOW, now).await;
        limiter.record_at("k", 2, WINDOW, now).await;
        for _ in 0..5 {
            assert!(limiter.record_at("k", 2, WINDOW, now).await.is_none());
        }

        assert_eq!(limiter.record_at("k", 100, WINDOW, now).await, Some(2));
    }

    #[tokio::test]
    async fn test_admit_flags_then_refuses() {
        let limiter = RateLimiter::default();
        let rule = RateLimit::hourly("newsletter", 4);

        let mut flags = Vec::new();
        for _ in 0..4 {
            flags.push(limiter.admit("newsletter:z", &rule).await.unwrap().too_frequent);
        }

        assert_eq!(flags, vec![false, false, true, true]);
        assert!(matches!(
            limiter.admit("newsletter:z", &rule).await,
            Err(AppError::RateLimited)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admits_flag_consistently() {
        let limiter = Arc::new(RateLimiter::default());
        let rule = RateLimit::hourly("newsletter", 10);

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.admit("newsletter:burst", &rule).await })
            })
            .collect();

        let mut admitted = 0;
        let mut flagged = 0;
        for task in tasks {
            if let Ok(result) = task.await.unwrap() {
                admitted += 1;
                flagged += usize::from(result.too_frequent);
            }
        }

        assert_eq!(admitted, 10);
        assert_eq!(flagged, 10 - rule.soft_limit());
    }

    #[test]
    fn test_client_key() {
        assert_eq!(client_key(Some("1.2.3.4, 10.0.0.1"), "newsletter"), "newsletter:1.2.3.4");
        assert_eq!(client_key(None, "vibe-photo"), "vibe-photo:unknown");
        assert_eq!(client_key(Some("  "), "work-buddy"), "work-buddy:unknown");
    }
}
