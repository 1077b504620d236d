use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = catalog::seo::DEFAULT_BASE_URL;
pub const DEFAULT_SENTIMENT_URL: &str = "https://www.reddit.com/search.json";

const HOUR: Duration = Duration::from_secs(60 * 60);

/// Sliding-window limit for one community action.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub action: &'static str,
    pub limit: usize,
    pub window: Duration,
}

impl RateLimit {
    pub const fn hourly(action: &'static str, limit: usize) -> Self {
        Self {
            action,
            limit,
            window: HOUR,
        }
    }

    /// Submissions past half the limit are flagged for moderation before they are refused.
    pub fn soft_limit(&self) -> usize {
        self.limit.div_ceil(2)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub newsletter: RateLimit,
    pub seat_status: RateLimit,
    pub vibe_photo: RateLimit,
    pub work_buddy: RateLimit,
    pub speed_submit: RateLimit,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            newsletter: RateLimit::hourly("newsletter", 10),
            seat_status: RateLimit::hourly("seat-status", 20),
            vibe_photo: RateLimit::hourly("vibe-photo", 10),
            work_buddy: RateLimit::hourly("work-buddy", 30),
            speed_submit: RateLimit::hourly("speed-submit", 30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub catalog_url: Option<String>,
    pub redis_url: Option<String>,
    pub base_url: String,
    pub sentiment_url: String,
    pub admin_token: Option<String>,
    pub rate_limits: RateLimits,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "3000"),
            data_dir: try_load("DATA_DIR", "data"),
            uploads_dir: try_load("UPLOADS_DIR", "uploads"),
            catalog_path: optional("CATALOG_PATH").map(PathBuf::from),
            catalog_url: optional("CATALOG_URL"),
            redis_url: optional("REDIS_URL"),
            base_url: try_load("BASE_URL", DEFAULT_BASE_URL),
            sentiment_url: try_load("SENTIMENT_URL", DEFAULT_SENTIMENT_URL),
            admin_token: read_secret("NOVANODE_ADMIN_TOKEN"),
            rate_limits: RateLimits::default(),
        }
    }

    /// Local JSON storage under `data_dir`, no admin token.
    pub fn local(data_dir: impl Into<PathBuf>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 0,
            data_dir: data_dir.into(),
            uploads_dir: uploads_dir.into(),
            catalog_path: None,
            catalog_url: None,
            redis_url: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            sentiment_url: DEFAULT_SENTIMENT_URL.to_string(),
            admin_token: None,
            rate_limits: RateLimits::default(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .inspect(|_| info!("{key} set"))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// Docker secret first, then the environment.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    match read_to_string(&path) {
        Ok(secret) => Some(secret.trim().to_string()).filter(|s| !s.is_empty()),
        Err(e) => {
            info!("Failed to read {secret_name} from file: {e}, trying environment");
            optional(secret_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_limit() {
        let limits = RateLimits::default();

        assert_eq!(limits.newsletter.soft_limit(), 5);
        assert_eq!(limits.seat_status.soft_limit(), 10);
        assert_eq!(RateLimit::hourly("odd", 3).soft_limit(), 2);
    }

    #[test]
    fn test_try_load_falls_back() {
        let port: u16 = try_load("NOVANODE_TEST_UNSET_PORT", "3000");

        assert_eq!(port, 3000);
    }
}
