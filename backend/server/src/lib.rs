//! Documentation of NoVaNode, a directory of remote work spots across Northern Virginia.
//!
//! Cafés, libraries and coworking spaces in Arlington, Alexandria, Tysons and Reston with their
//! Wi-Fi speeds, noise levels and outlets, plus a few community endpoints that let visitors
//! report what a spot is like right now.
//!
//!
//!
//! # General Infrastructure
//! - One axum server renders every page and answers the JSON API
//! - The catalog is read-only and loaded once at startup: remote `CATALOG_URL`, then a
//!   `CATALOG_PATH` override, then the copy compiled into the binary
//! - Community submissions go to Redis when `REDIS_URL` is reachable, otherwise to JSON files
//!   under `DATA_DIR`
//! - Uploaded vibe photos are written to `UPLOADS_DIR` and served back under `/uploads`
//!
//!
//!
//! # Protecting the Community API
//!
//! **Goal**: Keep spam and floods out of the shared data without accounts.
//!
//! - Every write is rate limited per action and client, the client being the first
//!   `X-Forwarded-For` entry
//! - Limits are per hour: newsletter 10, seat status 20, vibe photo 10, work buddy 30,
//!   speed submit 30
//! - Past half the limit a submission is still accepted but flagged `high_frequency`
//! - Free text and uploads are scored low, medium or high; anything above low lands in the
//!   moderation queue for the admin panel
//! - Counters are in memory, so each instance limits on its own
//!
//!
//!
//! # Notes
//!
//! ## Expiry
//! Nothing runs in the background. Seat reports older than two hours and work buddy signals
//! past their `until` are filtered out on read and pruned on the next write.
//!
//! ## JSON vs Redis
//! The JSON backend is enough for a single instance and keeps the data greppable. Redis is
//! there for deployments with more than one instance behind the proxy. Both keep newest
//! first and cap every collection.
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run locally with verbose logs.
//! ```sh
//! RUST_LOG=info NOVANODE_ADMIN_TOKEN=dev cargo run -p novanode
//! ```
//!
//! Normalize the catalog after editing `data/spots.json`.
//! ```sh
//! cargo run -p process
//! ```
//!
//!
//!
//! # Environment
//!
//! | variable | default |
//! |---|---|
//! | `RUST_PORT` | `3000` |
//! | `DATA_DIR` | `data` |
//! | `UPLOADS_DIR` | `uploads` |
//! | `CATALOG_PATH` | bundled catalog |
//! | `CATALOG_URL` | unset |
//! | `REDIS_URL` | unset, JSON store |
//! | `BASE_URL` | `https://novanode.dev` |
//! | `SENTIMENT_URL` | Reddit search |
//! | `NOVANODE_ADMIN_TOKEN` | unset, admin locked. Also read from `/run/secrets` |
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, header::CONTENT_TYPE},
    middleware::from_fn_with_state,
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod admin;
pub mod aggregate;
pub mod config;
pub mod database;
pub mod error;
pub mod html;
pub mod moderation;
pub mod pages;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod store;
pub mod submissions;

use admin::{
    TOKEN_HEADER, dashboard_handler, login_form_handler, login_handler, metrics_handler,
    moderation_handler, moderation_page_handler, require_admin,
};
use pages::{
    best_wifi_arlington_handler, best_wifi_tysons_handler, compare_handler, compare_index_handler,
    fastest_wifi_handler, free_alternatives_handler, free_parking_handler, home_handler,
    laptop_policies_handler, location_handler, neighborhood_handler, quiet_zones_arlington_handler,
    quiet_zones_map_handler, weekends_handler,
};
use routes::{
    MAX_PHOTO_BODY, MAX_UPLOAD_BODY, healthz_handler, newsletter_handler, seat_report_handler,
    seat_status_handler, sentiment_handler, speed_download_handler, speed_submit_handler,
    speed_summary_handler, speed_upload_handler, vibe_photo_handler, vibe_photo_upload_handler,
    work_buddy_handler, work_buddy_signal_handler,
};
use state::State;

pub fn build_router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(TOKEN_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route(
            "/api/speed/submit",
            get(speed_summary_handler).post(speed_submit_handler),
        )
        .route("/api/speed/download", get(speed_download_handler))
        .route(
            "/api/speed/upload",
            post(speed_upload_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY)),
        )
        .route(
            "/api/seat-status",
            get(seat_status_handler).post(seat_report_handler),
        )
        .route(
            "/api/work-buddy",
            get(work_buddy_handler).post(work_buddy_signal_handler),
        )
        .route(
            "/api/vibe-photo",
            get(vibe_photo_handler)
                .post(vibe_photo_upload_handler)
                .layer(DefaultBodyLimit::max(MAX_PHOTO_BODY)),
        )
        .route("/api/newsletter", post(newsletter_handler))
        .route("/api/sentiment", get(sentiment_handler));

    let admin = Router::new()
        .route("/admin", get(dashboard_handler))
        .route("/admin/moderation", get(moderation_page_handler))
        .route("/api/admin/metrics", get(metrics_handler))
        .route("/api/admin/moderation", get(moderation_handler))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let pages = Router::new()
        .route("/", get(home_handler))
        .route("/neighborhood/{neighborhood}", get(neighborhood_handler))
        .route("/location/{neighborhood}/{slug}", get(location_handler))
        .route("/compare", get(compare_index_handler))
        .route("/compare/{pair}", get(compare_handler))
        .route("/fastest-wifi-nova", get(fastest_wifi_handler))
        .route("/quiet-zones-map", get(quiet_zones_map_handler))
        .route("/quiet-zones-arlington", get(quiet_zones_arlington_handler))
        .route("/best-wifi-arlington", get(best_wifi_arlington_handler))
        .route("/best-wifi-tysons", get(best_wifi_tysons_handler))
        .route("/laptop-friendly-weekends", get(weekends_handler))
        .route("/free-parking-remote-work", get(free_parking_handler))
        .route("/virginia-laptop-policies", get(laptop_policies_handler))
        .route("/free-alternatives", get(free_alternatives_handler))
        .route("/admin/login", get(login_form_handler).post(login_handler));

    Router::new()
        .merge(api)
        .merge(admin)
        .merge(pages)
        .route("/healthz", get(healthz_handler))
        .nest_service("/uploads", ServeDir::new(&state.config.uploads_dir))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let address = format!("0.0.0.0:{}", state.config.port);
    let app = build_router(state);
    info!("Binding to {address}");

    let listener = match TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {address}: {e}");
            return;
        }
    };
    info!("Server running on {address}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
    }

    info!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
