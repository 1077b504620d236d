//! # Redis
//!
//! Optional hosted datastore for community submissions.
//!
//! Selected by setting `REDIS_URL`. Without it, or when the first connection fails, submissions
//! fall back to JSON files under `DATA_DIR`.
//!
//! ## Layout
//! - One list per collection: `novanode:speed-submissions`, `novanode:seat-reports`, ...
//! - Index 0 is the newest entry, matching the JSON arrays
//! - Lists are rewritten whole on every submission, capped at the collection size
use std::{path::Path, time::Duration};

use redis::{
    Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::{info, warn};

use crate::store::Store;

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;

    client.get_connection_manager_with_config(config).await
}

pub async fn init_store(redis_url: Option<&str>, data_dir: &Path) -> Store {
    let Some(redis_url) = redis_url else {
        info!("Using JSON store at {}", data_dir.display());
        return Store::json(data_dir);
    };

    match init_redis(redis_url).await {
        Ok(connection) => {
            info!("Using Redis store");
            Store::redis(connection)
        }
        Err(e) => {
            warn!(
                "Redis unavailable ({e}), falling back to JSON store at {}",
                data_dir.display()
            );
            Store::json(data_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_quickly() {
        let dir = tempdir().unwrap();

        for url in ["redis://127.0.0.1:1", "redis://10.255.255.1:6379"] {
            let store = timeout(Duration::from_secs(5), init_store(Some(url), dir.path()))
                .await
                .unwrap_or_else(|_| panic!("{url} did not give up"));

            assert_eq!(store.backend_name(), "json", "{url}");
        }
    }

    #[tokio::test]
    async fn test_no_url_uses_json() {
        let dir = tempdir().unwrap();

        assert_eq!(init_store(None, dir.path()).await.backend_name(), "json");
    }
}
