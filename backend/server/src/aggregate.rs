use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::submissions::{SeatReport, SeatState, SpeedSubmission, WorkBuddySignal};

pub const SPEED_SAMPLE: usize = 100;
pub const SEAT_WINDOW_MINUTES: i64 = 120;

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeedSummary {
    pub count: usize,
    pub median_download_mbps: f64,
    pub median_upload_mbps: f64,
    pub median_latency_ms: f64,
    pub latest_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatSummary {
    pub count: usize,
    pub current_state: Option<SeatState>,
    pub expires_in_minutes: i64,
}

/// Rounded to one decimal, 0 for an empty set.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    let value = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    (value * 10.0).round() / 10.0
}

/// Medians over the newest submissions for `spot_id`. `submissions` is newest first.
pub fn speed_summary(submissions: &[SpeedSubmission], spot_id: &str) -> SpeedSummary {
    let recent: Vec<&SpeedSubmission> = submissions
        .iter()
        .filter(|s| s.spot_id == spot_id)
        .take(SPEED_SAMPLE)
        .collect();

    let collect = |field: fn(&SpeedSubmission) -> f64| -> Vec<f64> {
        recent.iter().map(|s| field(s)).collect()
    };

    SpeedSummary {
        count: recent.len(),
        median_download_mbps: median(&collect(|s| s.download_mbps)),
        median_upload_mbps: median(&collect(|s| s.upload_mbps)),
        median_latency_ms: median(&collect(|s| s.latency_ms)),
        latest_at: recent.first().map(|s| s.created_at),
    }
}

pub fn seat_window() -> Duration {
    Duration::minutes(SEAT_WINDOW_MINUTES)
}

pub fn is_recent(report: &SeatReport, now: DateTime<Utc>) -> bool {
    now - report.created_at <= seat_window()
}

/// Most reported state; ties go to the roomier state.
pub fn seat_state<'a>(reports: impl IntoIterator<Item = &'a SeatReport>) -> Option<SeatState> {
    let mut counts = [0usize; 3];

    for report in reports {
        let index = SeatState::ALL
            .iter()
            .position(|state| *state == report.state)
            .unwrap_or_default();
        counts[index] += 1;
    }

    let best = counts.iter().copied().max()?;
    if best == 0 {
        return None;
    }

    SeatState::ALL
        .into_iter()
        .zip(counts)
        .find(|(_, count)| *count == best)
        .map(|(state, _)| state)
}

pub fn seat_summary(reports: &[SeatReport], spot_id: &str, now: DateTime<Utc>) -> SeatSummary {
    let active: Vec<&SeatReport> = reports
        .iter()
        .filter(|r| r.spot_id == spot_id && is_recent(r, now))
        .collect();

    SeatSummary {
        count: active.len(),
        current_state: seat_state(active.iter().copied()),
        expires_in_minutes: if active.is_empty() {
            0
        } else {
            SEAT_WINDOW_MINUTES
        },
    }
}

pub fn is_active(signal: &WorkBuddySignal, now: DateTime<Utc>) -> bool {
    signal.until > now
}
