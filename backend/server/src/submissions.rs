//! # Community Submissions
//!
//! Records appended by the community API and their wire payloads.
//!
//! Stored records carry their own `createdAt`. Payload structs are what clients send; every
//! field is optional so missing input surfaces as a 400 with a short message instead of a
//! deserialization error.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeedSubmission {
    pub spot_id: String,
    pub spot_slug: String,
    pub spot_name: String,
    pub neighborhood: String,
    pub latency_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpeedPayload {
    pub spot_id: Option<String>,
    pub spot_slug: Option<String>,
    pub spot_name: Option<String>,
    pub neighborhood: Option<String>,
    pub latency_ms: Option<f64>,
    pub download_mbps: Option<f64>,
    pub upload_mbps: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeatState {
    Plenty,
    Busy,
    Full,
}

impl SeatState {
    /// Tie-break order for majority votes.
    pub const ALL: [SeatState; 3] = [SeatState::Plenty, SeatState::Busy, SeatState::Full];

    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "plenty" => Some(SeatState::Plenty),
            "busy" => Some(SeatState::Busy),
            "full" => Some(SeatState::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatState::Plenty => "plenty",
            SeatState::Busy => "busy",
            SeatState::Full => "full",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatReport {
    pub spot_id: String,
    pub state: SeatState,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeatPayload {
    pub spot_id: Option<String>,
    pub state: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkBuddySignal {
    pub spot_id: String,
    pub until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkBuddyPayload {
    pub spot_id: Option<String>,
    pub until: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VibePhoto {
    pub spot_id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default)]
pub struct NewsletterPayload {
    pub email: Option<String>,
}

/// `?spotId=` on every community GET.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpotQuery {
    pub spot_id: Option<String>,
}

impl SpotQuery {
    pub fn spot_id(&self) -> Option<&str> {
        non_empty(self.spot_id.as_deref())
    }
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
