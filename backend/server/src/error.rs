use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const ADMIN_HINT: &str =
    "Set NOVANODE_ADMIN_TOKEN and pass it via ?token=... or x-admin-token header";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Invalid(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found")]
    NotFound,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("{message}")]
    Persistence {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    /// Wraps a store failure; only `message` reaches the client.
    pub fn persistence(message: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source| AppError::Persistence { message, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Invalid { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Persistence { message, source } => {
                error!("{message}: {source}");
                json!({ "error": message })
            }
            AppError::Unauthorized => json!({ "error": self.to_string(), "hint": ADMIN_HINT }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
