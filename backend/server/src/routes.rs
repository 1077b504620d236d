//! # Community API
//!
//! JSON endpoints under `/api`. Every write follows the same order:
//! 1. Rate limit on `action:client`, refusing with 429
//! 2. Validate the body, refusing with 400 and a short message
//! 3. Score risk where the route takes free text or files, queueing anything above low
//! 4. Persist through the store, answering 500 with a per-route message on failure
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Query, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::{
        HeaderMap, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::fs;
use tracing::{info, warn};

use crate::{
    aggregate::{SeatSummary, SpeedSummary, is_active, is_recent, seat_summary, speed_summary},
    error::{AppError, StoreError},
    moderation::{flag_if_risky, score_risk},
    rate_limit::client_key_from_headers,
    state::State as AppState,
    store::Collection,
    submissions::{
        NewsletterPayload, SeatPayload, SeatReport, SeatState, SpeedPayload, SpeedSubmission,
        SpotQuery, VibePhoto, WorkBuddyPayload, WorkBuddySignal, non_empty,
    },
};

const MIB: usize = 1024 * 1024;

pub const MAX_PHOTO_BYTES: usize = 2 * MIB;
/// Request body caps, above the axum default of 2 MB.
pub const MAX_PHOTO_BODY: usize = 4 * MIB;
pub const MAX_UPLOAD_BODY: usize = 25 * MIB;
pub const DOWNLOAD_DEFAULT_MB: f64 = 5.0;
pub const DOWNLOAD_MAX_MB: f64 = 20.0;

const ALLOWED_PHOTO_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

type Shared = Arc<AppState>;

fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>, message: &'static str) -> Result<T, AppError> {
    payload.map(|Json(payload)| payload).map_err(|e| {
        warn!("Rejected body: {e}");
        AppError::Invalid(message)
    })
}

fn required_spot(query: &SpotQuery) -> Result<&str, AppError> {
    query
        .spot_id()
        .ok_or(AppError::Invalid("spotId is required"))
}

pub async fn healthz_handler() -> &'static str {
    "ok"
}

pub async fn speed_summary_handler(
    State(state): State<Shared>,
    Query(query): Query<SpotQuery>,
) -> Result<Json<SpeedSummary>, AppError> {
    let spot_id = required_spot(&query)?;

    let submissions: Vec<SpeedSubmission> = state
        .store
        .read_all(Collection::SpeedSubmissions)
        .await
        .map_err(AppError::persistence("Failed to load submissions"))?;

    Ok(Json(speed_summary(&submissions, spot_id)))
}

pub async fn speed_submit_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    payload: Result<Json<SpeedPayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let rule = &state.config.rate_limits.speed_submit;
    state
        .limiter
        .admit(&client_key_from_headers(&headers, rule.action), rule)
        .await?;

    let payload = body(payload, "Missing spot fields")?;

    let (Some(spot_id), Some(spot_slug), Some(spot_name), Some(neighborhood)) = (
        non_empty(payload.spot_id.as_deref()),
        non_empty(payload.spot_slug.as_deref()),
        non_empty(payload.spot_name.as_deref()),
        non_empty(payload.neighborhood.as_deref()),
    ) else {
        return Err(AppError::Invalid("Missing spot fields"));
    };

    let latency_ms = payload.latency_ms.unwrap_or(0.0);
    let download_mbps = payload.download_mbps.unwrap_or(0.0);
    let upload_mbps = payload.upload_mbps.unwrap_or(0.0);

    if [latency_ms, download_mbps, upload_mbps]
        .iter()
        .any(|value| !value.is_finite() || *value <= 0.0)
    {
        return Err(AppError::Invalid("Invalid speed values"));
    }

    let submission = SpeedSubmission {
        spot_id: spot_id.to_string(),
        spot_slug: spot_slug.to_string(),
        spot_name: spot_name.to_string(),
        neighborhood: neighborhood.to_string(),
        latency_ms,
        download_mbps,
        upload_mbps,
        created_at: Utc::now(),
    };

    state
        .store
        .update(
            Collection::SpeedSubmissions,
            |items: &mut Vec<SpeedSubmission>| items.insert(0, submission),
        )
        .await
        .map_err(AppError::persistence("Failed to save submission"))?;

    Ok(ok())
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    pub size_mb: Option<String>,
}

/// Requested size clamped to 1..=20 MiB, unparsable sizes fall back to the default.
pub fn download_bytes(size_mb: Option<&str>) -> usize {
    let size_mb = size_mb
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(DOWNLOAD_DEFAULT_MB)
        .clamp(1.0, DOWNLOAD_MAX_MB);

    (size_mb * MIB as f64) as usize
}

pub async fn speed_download_handler(Query(query): Query<DownloadQuery>) -> impl IntoResponse {
    let payload = vec![b'a'; download_bytes(query.size_mb.as_deref())];

    (
        [
            (CONTENT_TYPE, "application/octet-stream"),
            (CACHE_CONTROL, "no-store"),
        ],
        payload,
    )
}

pub async fn speed_upload_handler(body: Bytes) -> Json<Value> {
    Json(json!({ "receivedBytes": body.len() }))
}

pub async fn seat_status_handler(
    State(state): State<Shared>,
    Query(query): Query<SpotQuery>,
) -> Result<Json<SeatSummary>, AppError> {
    let spot_id = required_spot(&query)?;

    let reports: Vec<SeatReport> = state
        .store
        .read_all(Collection::SeatReports)
        .await
        .map_err(AppError::persistence("Failed to load reports"))?;

    Ok(Json(seat_summary(&reports, spot_id, Utc::now())))
}

pub async fn seat_report_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    payload: Result<Json<SeatPayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let rule = &state.config.rate_limits.seat_status;
    state
        .limiter
        .admit(&client_key_from_headers(&headers, rule.action), rule)
        .await?;

    let payload = body(payload, "Invalid payload")?;

    let (Some(spot_id), Some(seat_state)) = (
        non_empty(payload.spot_id.as_deref()),
        payload.state.as_deref().and_then(SeatState::parse),
    ) else {
        return Err(AppError::Invalid("Invalid payload"));
    };

    let now = Utc::now();
    let report = SeatReport {
        spot_id: spot_id.to_string(),
        state: seat_state,
        created_at: now,
    };

    state
        .store
        .update(Collection::SeatReports, |items: &mut Vec<SeatReport>| {
            items.retain(|existing| is_recent(existing, now));
            items.insert(0, report)
        })
        .await
        .map_err(AppError::persistence("Failed to save report"))?;

    Ok(ok())
}

pub async fn work_buddy_handler(
    State(state): State<Shared>,
    Query(query): Query<SpotQuery>,
) -> Result<Json<Value>, AppError> {
    let spot_id = required_spot(&query)?;
    let now = Utc::now();

    let signals: Vec<WorkBuddySignal> = state
        .store
        .read_all(Collection::WorkBuddy)
        .await
        .map_err(AppError::persistence("Failed to load signals"))?;

    let count = signals
        .iter()
        .filter(|signal| signal.spot_id == spot_id && is_active(signal, now))
        .count();

    Ok(Json(json!({ "count": count })))
}

pub async fn work_buddy_signal_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    payload: Result<Json<WorkBuddyPayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let rule = &state.config.rate_limits.work_buddy;
    state
        .limiter
        .admit(&client_key_from_headers(&headers, rule.action), rule)
        .await?;

    let payload = body(payload, "Invalid")?;

    let spot_id = non_empty(payload.spot_id.as_deref()).ok_or(AppError::Invalid("Invalid"))?;
    let until = non_empty(payload.until.as_deref())
        .and_then(|until| DateTime::parse_from_rfc3339(until).ok())
        .map(|until| until.with_timezone(&Utc))
        .ok_or(AppError::Invalid("Invalid"))?;

    let now = Utc::now();
    let signal = WorkBuddySignal {
        spot_id: spot_id.to_string(),
        until,
        created_at: now,
    };

    state
        .store
        .update(Collection::WorkBuddy, |items: &mut Vec<WorkBuddySignal>| {
            items.retain(|existing| is_active(existing, now));
            items.insert(0, signal)
        })
        .await
        .map_err(AppError::persistence("Failed to save signal"))?;

    Ok(ok())
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VibePhotoView {
    pub url: String,
    pub created_at: DateTime<Utc>,
}

pub async fn vibe_photo_handler(
    State(state): State<Shared>,
    Query(query): Query<SpotQuery>,
) -> Result<Json<Value>, AppError> {
    let spot_id = required_spot(&query)?;

    let photos: Vec<VibePhoto> = state
        .store
        .read_all(Collection::VibePhotos)
        .await
        .map_err(AppError::persistence("Failed to load photos"))?;

    let items: Vec<VibePhotoView> = photos
        .into_iter()
        .filter(|photo| photo.spot_id == spot_id)
        .take(1)
        .map(|photo| VibePhotoView {
            url: photo.url,
            created_at: photo.created_at,
        })
        .collect();

    Ok(Json(json!({ "items": items })))
}

#[derive(Debug)]
struct Upload {
    content_type: Option<String>,
    bytes: Bytes,
}

fn photo_extension(content_type: Option<&str>) -> Option<&'static str> {
    let content_type = content_type?;

    ALLOWED_PHOTO_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, extension)| *extension)
}

/// File-name-safe form of a client supplied spot id.
fn file_stem(spot_id: &str) -> String {
    let stem: String = spot_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if stem.is_empty() {
        "spot".to_string()
    } else {
        stem
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<(Option<String>, Option<Upload>), AppError> {
    let invalid = |e: MultipartError| {
        warn!("Rejected upload: {e}");

        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::Invalid("File too large (max 2MB)")
        } else {
            AppError::Invalid("Invalid payload")
        }
    };

    let mut spot_id = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "spotId" => spot_id = Some(field.text().await.map_err(invalid)?),
            "file" => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid)?;
                upload = Some(Upload {
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok((spot_id, upload))
}

/// Moderation and listing entries for a photo already written to disk.
async fn record_photo(
    state: &AppState,
    photo: VibePhoto,
    size: u64,
    too_frequent: bool,
) -> Result<(), StoreError> {
    flag_if_risky(
        &state.store,
        "vibe_photo",
        score_risk(None, Some(size), too_frequent),
        json!({ "spotId": photo.spot_id, "url": photo.url, "bytes": size }),
    )
    .await?;

    state
        .store
        .update(Collection::VibePhotos, |items: &mut Vec<VibePhoto>| {
            items.retain(|existing| existing.spot_id != photo.spot_id);
            items.insert(0, photo)
        })
        .await
}

pub async fn vibe_photo_upload_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let rule = &state.config.rate_limits.vibe_photo;
    let admitted = state
        .limiter
        .admit(&client_key_from_headers(&headers, rule.action), rule)
        .await?;

    let mut multipart = multipart.map_err(|_| AppError::Invalid("Invalid payload"))?;
    let (spot_id, upload) = read_upload(&mut multipart).await?;

    let (Some(spot_id), Some(upload)) = (non_empty(spot_id.as_deref()), upload) else {
        return Err(AppError::Invalid("Invalid payload"));
    };

    let extension = photo_extension(upload.content_type.as_deref())
        .ok_or(AppError::Invalid("Unsupported file type"))?;

    if upload.bytes.len() > MAX_PHOTO_BYTES {
        return Err(AppError::Invalid("File too large (max 2MB)"));
    }

    let now = Utc::now();
    let file_name = format!(
        "{}-{}.{extension}",
        file_stem(spot_id),
        now.timestamp_millis()
    );
    let uploads_dir = &state.config.uploads_dir;

    fs::create_dir_all(uploads_dir)
        .await
        .map_err(StoreError::from)
        .map_err(AppError::persistence("Upload failed"))?;
    let path = uploads_dir.join(&file_name);
    fs::write(&path, &upload.bytes)
        .await
        .map_err(StoreError::from)
        .map_err(AppError::persistence("Upload failed"))?;

    let url = format!("/uploads/{file_name}");
    let photo = VibePhoto {
        spot_id: spot_id.to_string(),
        url: url.clone(),
        created_at: now,
    };

    let size = upload.bytes.len() as u64;
    if let Err(e) = record_photo(&state, photo, size, admitted.too_frequent).await {
        if let Err(remove) = fs::remove_file(&path).await {
            warn!("Failed to remove orphaned upload {}: {remove}", path.display());
        }
        return Err(AppError::persistence("Upload failed")(e));
    }

    info!("Stored vibe photo {url}");

    Ok(Json(json!({ "ok": true, "url": url })))
}

pub async fn newsletter_handler(
    State(state): State<Shared>,
    headers: HeaderMap,
    payload: Result<Json<NewsletterPayload>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let rule = &state.config.rate_limits.newsletter;
    let admitted = state
        .limiter
        .admit(&client_key_from_headers(&headers, rule.action), rule)
        .await?;

    let payload = body(payload, "Invalid email")?;
    let email = non_empty(payload.email.as_deref())
        .filter(|email| email.contains('@'))
        .ok_or(AppError::Invalid("Invalid email"))?
        .to_string();

    flag_if_risky(
        &state.store,
        "newsletter_signup",
        score_risk(Some(&email), None, admitted.too_frequent),
        json!({ "email": email }),
    )
    .await
    .map_err(AppError::persistence("Save failed"))?;

    state
        .store
        .update(Collection::NewsletterSignups, |list: &mut Vec<String>| {
            if !list.contains(&email) {
                list.insert(0, email);
            }
        })
        .await
        .map_err(AppError::persistence("Save failed"))?;

    Ok(ok())
}

#[derive(Deserialize, Debug, Default)]
pub struct SentimentQuery {
    pub q: Option<String>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct SentimentItem {
    pub title: String,
    pub url: String,
    pub source: &'static str,
}

/// First post of a Reddit search listing, if it has a title and permalink.
pub fn first_post(listing: &Value) -> Option<SentimentItem> {
    let post = listing.pointer("/data/children/0/data")?;
    let title = post.get("title")?.as_str()?;
    let permalink = post.get("permalink")?.as_str()?;

    Some(SentimentItem {
        title: title.to_string(),
        url: format!("https://reddit.com{permalink}"),
        source: "Reddit",
    })
}

async fn latest_post(state: &AppState, q: &str) -> Result<Option<SentimentItem>, reqwest::Error> {
    let search = format!("{q} remote work");

    let listing: Value = state
        .http
        .get(&state.config.sentiment_url)
        .query(&[("q", search.as_str()), ("limit", "1"), ("sort", "new")])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(first_post(&listing))
}

pub async fn sentiment_handler(
    State(state): State<Shared>,
    Query(query): Query<SentimentQuery>,
) -> Json<Value> {
    let Some(q) = non_empty(query.q.as_deref()) else {
        return Json(json!({ "item": null }));
    };

    let item = latest_post(&state, q).await.unwrap_or_else(|e| {
        warn!("Sentiment lookup failed: {e}");
        None
    });

    Json(json!({ "item": item }))
}
