//! # Admin
//!
//! Token-gated views over the submission store.
//!
//! A request is authorized when the configured `NOVANODE_ADMIN_TOKEN` equals any of:
//! - the `x-admin-token` header
//! - the `token` query parameter
//! - the `novanode_admin_token` cookie, set by `POST /admin/login`
//!
//! Without a configured token every guarded request is refused.
use std::{collections::HashMap, sync::Arc};

use axum::{
    Form, Json,
    extract::{Query, Request, State},
    http::{
        HeaderMap, StatusCode,
        header::{COOKIE, LOCATION, SET_COOKIE},
    },
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{AppError, StoreError},
    html::{escape, page},
    moderation::{ModerationRecord, Risk},
    state::State as AppState,
    store::{Collection, Store},
};

pub const TOKEN_HEADER: &str = "x-admin-token";
pub const TOKEN_COOKIE: &str = "novanode_admin_token";
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 14;
const MODERATION_PAGE_SIZE: usize = 100;

type Shared = Arc<AppState>;

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Every token the request carries, in header, query, cookie order.
pub fn presented_tokens(request: &Request) -> Vec<String> {
    let headers = request.headers();

    let header = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove("token"));

    let cookie = cookie_value(headers, TOKEN_COOKIE).map(str::to_string);

    [header, query, cookie].into_iter().flatten().collect()
}

pub fn is_authorized(expected: Option<&str>, presented: &[String]) -> bool {
    let Some(expected) = expected.filter(|token| !token.is_empty()) else {
        return false;
    };

    presented.iter().any(|token| token == expected)
}

pub async fn require_admin(
    State(state): State<Shared>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = presented_tokens(&request);

    if !is_authorized(state.config.admin_token.as_deref(), &presented) {
        warn!("Refused admin request to {}", request.uri().path());
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[derive(Serialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub speed_submissions: usize,
    pub seat_reports: usize,
    pub vibe_photos: usize,
    pub newsletter_signups: usize,
    pub work_buddy_signals: usize,
    pub moderation_queue: usize,
}

impl Metrics {
    pub async fn collect(store: &Store) -> Result<Self, StoreError> {
        Ok(Self {
            speed_submissions: store.count(Collection::SpeedSubmissions).await?,
            seat_reports: store.count(Collection::SeatReports).await?,
            vibe_photos: store.count(Collection::VibePhotos).await?,
            newsletter_signups: store.count(Collection::NewsletterSignups).await?,
            work_buddy_signals: store.count(Collection::WorkBuddy).await?,
            moderation_queue: store.count(Collection::ModerationQueue).await?,
        })
    }

    fn rows(&self) -> [(&'static str, usize); 6] {
        [
            ("Speed submissions", self.speed_submissions),
            ("Seat reports", self.seat_reports),
            ("Vibe photos", self.vibe_photos),
            ("Newsletter signups", self.newsletter_signups),
            ("Work buddy signals", self.work_buddy_signals),
            ("Moderation queue", self.moderation_queue),
        ]
    }
}

#[derive(Serialize, Debug)]
pub struct ModerationOverview {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub items: Vec<ModerationRecord>,
}

impl ModerationOverview {
    pub fn from_queue(mut queue: Vec<ModerationRecord>) -> Self {
        let count = |risk: Risk| queue.iter().filter(|item| item.risk == risk).count();
        let (total, high, medium) = (queue.len(), count(Risk::High), count(Risk::Medium));

        queue.truncate(MODERATION_PAGE_SIZE);

        Self {
            total,
            high,
            medium,
            items: queue,
        }
    }

    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        Ok(Self::from_queue(
            store.read_all(Collection::ModerationQueue).await?,
        ))
    }
}

pub async fn metrics_handler(State(state): State<Shared>) -> Result<Json<Metrics>, AppError> {
    let metrics = Metrics::collect(&state.store)
        .await
        .map_err(AppError::persistence("Failed to load metrics"))?;

    Ok(Json(metrics))
}

pub async fn moderation_handler(
    State(state): State<Shared>,
) -> Result<Json<ModerationOverview>, AppError> {
    let overview = ModerationOverview::load(&state.store)
        .await
        .map_err(AppError::persistence("Failed to load moderation queue"))?;

    Ok(Json(overview))
}

pub async fn dashboard_handler(State(state): State<Shared>) -> Result<Html<String>, AppError> {
    let metrics = Metrics::collect(&state.store)
        .await
        .map_err(AppError::persistence("Failed to load metrics"))?;

    let cards: String = metrics
        .rows()
        .iter()
        .map(|(label, value)| format!("<li class=\"card\"><small>{label}</small><h3>{value}</h3></li>"))
        .collect();

    let body = format!(
        "<h1>NoVaNode Admin</h1><p>Store: {}</p><ul class=\"cards\">{cards}</ul>\
<h2>Tools</h2><ul><li><a href=\"/admin/moderation\">Moderation Queue</a></li></ul>",
        state.store.backend_name()
    );

    Ok(page("Admin", "NoVaNode admin dashboard.", &body))
}

pub async fn moderation_page_handler(
    State(state): State<Shared>,
) -> Result<Html<String>, AppError> {
    let overview = ModerationOverview::load(&state.store)
        .await
        .map_err(AppError::persistence("Failed to load moderation queue"))?;

    let items: String = overview
        .items
        .iter()
        .map(|item| {
            let reasons: Vec<String> = item.reasons.iter().map(ToString::to_string).collect();
            let payload = serde_json::to_string_pretty(&item.payload).unwrap_or_default();

            format!(
                "<li class=\"card\"><strong>{kind}</strong> <span class=\"badge\">{risk}</span>\
<p><small>{created}</small></p><p>Reasons: {reasons}</p><pre>{payload}</pre></li>",
                kind = escape(&item.kind),
                risk = item.risk,
                created = item.created_at.to_rfc3339(),
                reasons = if reasons.is_empty() {
                    "none".to_string()
                } else {
                    reasons.join(", ")
                },
                payload = escape(&payload),
            )
        })
        .collect();

    let list = if items.is_empty() {
        "<p>No queued items.</p>".to_string()
    } else {
        format!("<ul class=\"cards\">{items}</ul>")
    };

    let body = format!(
        "<h1>Moderation Queue</h1><p>Total: {} · High: {} · Medium: {}</p>{list}",
        overview.total, overview.high, overview.medium
    );

    Ok(page("Moderation queue", "Flagged community submissions.", &body))
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct LoginForm {
    pub token: String,
    pub next: Option<String>,
}

/// Only admin paths are accepted as a post-login destination.
fn next_path(next: Option<&str>) -> &str {
    next.filter(|path| path.starts_with("/admin") && !path.starts_with("/admin/login"))
        .unwrap_or("/admin")
}

fn login_page(next: &str, error: Option<&str>) -> Html<String> {
    let error = error
        .map(|error| format!("<p class=\"badge\">{}</p>", escape(error)))
        .unwrap_or_default();

    let body = format!(
        "<h1>Admin Login</h1><p>Enter your NoVaNode admin token to continue.</p>\
<form method=\"post\" action=\"/admin/login\">\
<input type=\"password\" name=\"token\" placeholder=\"Admin token\" required>\
<input type=\"hidden\" name=\"next\" value=\"{}\">\
<button>Continue</button></form>{error}",
        escape(next)
    );

    page("Admin login", "Sign in to the NoVaNode admin panel.", &body)
}

pub async fn login_form_handler(Query(query): Query<LoginQuery>) -> Html<String> {
    login_page(next_path(query.next.as_deref()), None)
}

pub async fn login_handler(State(state): State<Shared>, Form(form): Form<LoginForm>) -> Response {
    let next = next_path(form.next.as_deref());
    let token = form.token.trim();

    if !is_authorized(state.config.admin_token.as_deref(), &[token.to_string()]) {
        warn!("Failed admin login");
        return (
            StatusCode::UNAUTHORIZED,
            login_page(next, Some("Invalid token. Try again.")),
        )
            .into_response();
    }

    info!("Admin logged in");

    let cookie = format!(
        "{TOKEN_COOKIE}={token}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax"
    );

    (
        StatusCode::SEE_OTHER,
        [(SET_COOKIE, cookie), (LOCATION, next.to_string())],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn request(uri: &str, header: Option<&str>, cookie: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(token) = header {
            builder = builder.header(TOKEN_HEADER, token);
        }
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn record(risk: Risk) -> ModerationRecord {
        ModerationRecord {
            id: "x".to_string(),
            kind: "newsletter_signup".to_string(),
            risk,
            reasons: Vec::new(),
            created_at: Utc::now(),
            payload: json!({}),
        }
    }

    #[test]
    fn test_each_carrier_is_read() {
        let secret = Some("s3cret");

        let by_header = presented_tokens(&request("/admin", Some("s3cret"), None));
        let by_query = presented_tokens(&request("/admin?token=s3cret", None, None));
        let by_cookie = presented_tokens(&request(
            "/admin",
            None,
            Some("theme=dark; novanode_admin_token=s3cret"),
        ));

        assert!(is_authorized(secret, &by_header));
        assert!(is_authorized(secret, &by_query));
        assert!(is_authorized(secret, &by_cookie));
    }

    #[test]
    fn test_wrong_or_missing_token_refused() {
        let wrong = presented_tokens(&request("/admin?token=nope", Some("nope"), None));

        assert!(!is_authorized(Some("s3cret"), &wrong));
        assert!(!is_authorized(Some("s3cret"), &[]));
    }

    #[test]
    fn test_unconfigured_token_refuses_everything() {
        assert!(!is_authorized(None, &["anything".to_string()]));
        assert!(!is_authorized(Some(""), &["".to_string()]));
    }

    #[test]
    fn test_next_path_stays_in_admin() {
        assert_eq!(next_path(Some("/admin/moderation")), "/admin/moderation");
        assert_eq!(next_path(Some("https://evil.example")), "/admin");
        assert_eq!(next_path(Some("/admin/login")), "/admin");
        assert_eq!(next_path(None), "/admin");
    }

    #[test]
    fn test_overview_counts_whole_queue() {
        let mut queue: Vec<ModerationRecord> = (0..120).map(|_| record(Risk::Medium)).collect();
        queue.push(record(Risk::High));

        let overview = ModerationOverview::from_queue(queue);

        assert_eq!(overview.total, 121);
        assert_eq!(overview.high, 1);
        assert_eq!(overview.medium, 120);
        assert_eq!(overview.items.len(), MODERATION_PAGE_SIZE);
    }
}
