use std::{sync::Arc, time::Duration};

use catalog::{Catalog, bundled, get_catalog, get_catalog_remote};
use reqwest::Client;
use tracing::{info, warn};

use super::{config::Config, database::init_store, rate_limit::RateLimiter, store::Store};

const USER_AGENT: &str = "NoVaNode/1.0";
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct State {
    pub catalog: Catalog,
    pub config: Config,
    pub store: Store,
    pub limiter: RateLimiter,
    pub http: Client,
}

impl State {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();

        let catalog = load_catalog(&config).await;
        info!("Loaded {} spots", catalog.len());

        let store = init_store(config.redis_url.as_deref(), &config.data_dir).await;

        Arc::new(Self::from_parts(config, catalog, store))
    }

    /// JSON store under `config.data_dir`, no network at startup.
    pub fn local(config: Config, catalog: Catalog) -> Arc<Self> {
        let store = Store::json(&config.data_dir);

        Arc::new(Self::from_parts(config, catalog, store))
    }

    fn from_parts(config: Config, catalog: Catalog, store: Store) -> Self {
        if config.admin_token.is_none() {
            warn!("NOVANODE_ADMIN_TOKEN not set, admin surface is locked");
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client ({e}), using defaults");
                Client::new()
            });

        Self {
            catalog,
            config,
            store,
            limiter: RateLimiter::default(),
            http,
        }
    }
}

/// Remote catalog, then the file override, then the copy compiled into the binary.
async fn load_catalog(config: &Config) -> Catalog {
    if let Some(url) = &config.catalog_url {
        match get_catalog_remote(url).await {
            Ok(catalog) => return catalog,
            Err(e) => warn!("Failed to fetch catalog from {url}: {e:#}"),
        }
    }

    if let Some(path) = &config.catalog_path {
        match get_catalog(path) {
            Ok(catalog) => return catalog,
            Err(e) => warn!("Failed to read catalog override: {e:#}"),
        }
    }

    bundled().expect("Bundled catalog is malformed!")
}
