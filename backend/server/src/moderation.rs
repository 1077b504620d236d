//! # Moderation
//!
//! Rule-based triage of community submissions.
//!
//! ## Rules
//! - `high_frequency`: the client is past the soft rate limit for the action
//! - `large_file`: an upload over 1.5 MB
//! - `suspicious_text`: free text containing a link, a messaging app or a spam keyword
//!
//! Two or more reasons make a submission high risk, one makes it medium, none low.
//! Anything above low is appended to the moderation queue, newest first.
use std::fmt;

use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{
    error::StoreError,
    store::{Collection, Store},
};

pub const LARGE_FILE_BYTES: u64 = 1_500_000;

pub const BLOCKED_TOKENS: [&str; 7] = [
    "http://",
    "https://",
    "telegram",
    "whatsapp",
    "crypto",
    "casino",
    "viagra",
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Risk::Low => "low",
            Risk::Medium => "medium",
            Risk::High => "high",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    HighFrequency,
    LargeFile,
    SuspiciousText,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::HighFrequency => "high_frequency",
            Reason::LargeFile => "large_file",
            Reason::SuspiciousText => "suspicious_text",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub risk: Risk,
    pub reasons: Vec<Reason>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ModerationRecord {
    pub id: String,
    pub kind: String,
    pub risk: Risk,
    pub reasons: Vec<Reason>,
    pub created_at: DateTime<Utc>,
    pub payload: Value,
}

pub fn is_suspicious_text(input: &str) -> bool {
    let lowered = input.to_lowercase();

    BLOCKED_TOKENS.iter().any(|token| lowered.contains(token))
}

pub fn score_risk(text: Option<&str>, file_size: Option<u64>, too_frequent: bool) -> Assessment {
    let mut reasons = Vec::new();

    if too_frequent {
        reasons.push(Reason::HighFrequency);
    }
    if file_size.unwrap_or(0) > LARGE_FILE_BYTES {
        reasons.push(Reason::LargeFile);
    }
    if text.is_some_and(is_suspicious_text) {
        reasons.push(Reason::SuspiciousText);
    }

    let risk = match reasons.len() {
        0 => Risk::Low,
        1 => Risk::Medium,
        _ => Risk::High,
    };

    Assessment { risk, reasons }
}

fn record_id(kind: &str, now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();

    format!("{kind}-{}-{suffix}", now.timestamp_millis())
}

/// Queues the submission unless it scored low. Returns whether it was queued.
pub async fn flag_if_risky(
    store: &Store,
    kind: &str,
    assessment: Assessment,
    payload: Value,
) -> Result<bool, StoreError> {
    if assessment.risk == Risk::Low {
        return Ok(false);
    }

    let now = Utc::now();
    let record = ModerationRecord {
        id: record_id(kind, now),
        kind: kind.to_string(),
        risk: assessment.risk,
        reasons: assessment.reasons,
        created_at: now,
        payload,
    };

    info!("Queued {} risk {kind} submission {}", record.risk, record.id);

    store
        .update(Collection::ModerationQueue, |queue: &mut Vec<ModerationRecord>| {
            queue.insert(0, record)
        })
        .await?;

    Ok(true)
}
