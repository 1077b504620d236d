//! # Submission Store
//!
//! Newest-first, capped collections of community submissions.
//!
//! ## Backends
//! - JSON: one pretty-printed array per collection inside `DATA_DIR`. Files are replaced
//!   through a temp file and rename, so a crash never leaves half an array behind.
//! - Redis: one list per collection under `novanode:<collection>`, each element a JSON
//!   document. Rewrites go through a `MULTI` pipeline.
//!
//! ## Writes
//! Every write is read, mutate in memory, truncate to the cap, write back. The store holds
//! one async mutex across that cycle, so writers inside this process never lose updates.
//! Separate processes sharing a backend can still race.
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};
use tracing::warn;

use crate::error::StoreError;

const REDIS_PREFIX: &str = "novanode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    SpeedSubmissions,
    SeatReports,
    VibePhotos,
    NewsletterSignups,
    WorkBuddy,
    ModerationQueue,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::SpeedSubmissions,
        Collection::SeatReports,
        Collection::VibePhotos,
        Collection::NewsletterSignups,
        Collection::WorkBuddy,
        Collection::ModerationQueue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::SpeedSubmissions => "speed-submissions",
            Collection::SeatReports => "seat-reports",
            Collection::VibePhotos => "vibe-photos",
            Collection::NewsletterSignups => "newsletter-signups",
            Collection::WorkBuddy => "work-buddy",
            Collection::ModerationQueue => "moderation-queue",
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            Collection::SpeedSubmissions => 1000,
            Collection::SeatReports => 2000,
            Collection::VibePhotos => 2000,
            Collection::NewsletterSignups => 5000,
            Collection::WorkBuddy => 5000,
            Collection::ModerationQueue => 5000,
        }
    }

    fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    fn redis_key(&self) -> String {
        format!("{REDIS_PREFIX}:{}", self.name())
    }
}

enum Backend {
    Json(PathBuf),
    Redis(ConnectionManager),
}

pub struct Store {
    backend: Backend,
    write_lock: Mutex<()>,
}

impl Store {
    pub fn json(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Json(data_dir.into()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn redis(connection: ConnectionManager) -> Self {
        Self {
            backend: Backend::Redis(connection),
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Json(_) => "json",
            Backend::Redis(_) => "redis",
        }
    }

    pub async fn read_all<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        match &self.backend {
            Backend::Json(dir) => read_json(&dir.join(collection.file_name())).await,
            Backend::Redis(connection) => read_redis(connection, collection).await,
        }
    }

    /// Applies `mutate` to the whole collection and persists the result, capped.
    pub async fn update<T, F, R>(&self, collection: Collection, mutate: F) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let _guard = self.write_lock.lock().await;

        let mut items: Vec<T> = self.read_all(collection).await?;
        let result = mutate(&mut items);
        items.truncate(collection.capacity());

        match &self.backend {
            Backend::Json(dir) => {
                write_json(dir, &dir.join(collection.file_name()), &items).await?
            }
            Backend::Redis(connection) => write_redis(connection, collection, &items).await?,
        }

        Ok(result)
    }

    pub async fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        match &self.backend {
            Backend::Json(_) => Ok(self.read_all::<serde_json::Value>(collection).await?.len()),
            Backend::Redis(connection) => {
                let mut connection = connection.clone();
                let len: usize = connection.llen(collection.redis_key()).await?;

                Ok(len)
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => Ok(items),
        Err(e) => {
            warn!("Discarding unreadable {}: {e}", path.display());
            Ok(Vec::new())
        }
    }
}

async fn write_json<T: Serialize>(dir: &Path, path: &Path, items: &[T]) -> Result<(), StoreError> {
    fs::create_dir_all(dir).await?;

    let json = serde_json::to_vec_pretty(items)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, json).await?;
    fs::rename(&tmp, path).await?;

    Ok(())
}

async fn read_redis<T: DeserializeOwned>(
    connection: &ConnectionManager,
    collection: Collection,
) -> Result<Vec<T>, StoreError> {
    let mut connection = connection.clone();
    let raw: Vec<String> = connection.lrange(collection.redis_key(), 0, -1).await?;

    Ok(raw
        .iter()
        .filter_map(|item| {
            serde_json::from_str(item)
                .map_err(|e| warn!("Skipping malformed {} entry: {e}", collection.name()))
                .ok()
        })
        .collect())
}

async fn write_redis<T: Serialize>(
    connection: &ConnectionManager,
    collection: Collection,
    items: &[T],
) -> Result<(), StoreError> {
    let mut connection = connection.clone();
    let key = collection.redis_key();

    let encoded = items
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<String>, _>>()?;

    let mut pipe = redis::pipe();
    pipe.atomic().del(&key).ignore();
    if !encoded.is_empty() {
        pipe.rpush(&key, encoded).ignore();
    }

    pipe.query_async::<()>(&mut connection).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use tempfile::tempdir;

    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Entry {
        n: usize,
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = Store::json(dir.path());

        let items: Vec<Entry> = store.read_all(Collection::SeatReports).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(store.count(Collection::SeatReports).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_prepends_and_caps() {
        let dir = tempdir().unwrap();
        let store = Store::json(dir.path().join("nested"));
        let cap = Collection::SpeedSubmissions.capacity();

        for n in 0..cap + 5 {
            store
                .update(Collection::SpeedSubmissions, |items: &mut Vec<Entry>| {
                    items.insert(0, Entry { n })
                })
                .await
                .unwrap();
        }

        let items: Vec<Entry> = store.read_all(Collection::SpeedSubmissions).await.unwrap();
        assert_eq!(items.len(), cap);
        assert_eq!(items[0], Entry { n: cap + 4 });
        assert!(dir.path().join("nested/speed-submissions.json").exists());
        assert!(!dir.path().join("nested/speed-submissions.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_kept() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(Store::json(dir.path()));

        let tasks: Vec<_> = (0..20)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update(Collection::WorkBuddy, |items: &mut Vec<Entry>| {
                            items.insert(0, Entry { n })
                        })
                        .await
                        .unwrap();
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.count(Collection::WorkBuddy).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("moderation-queue.json"), "{not json").unwrap();
        let store = Store::json(dir.path());

        let items: Vec<Entry> = store.read_all(Collection::ModerationQueue).await.unwrap();

        assert!(items.is_empty());
    }
}
