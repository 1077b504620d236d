//! # Environment
//!
//! Heuristics that turn raw logistics into labels shown on cards and location pages.
use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::America::New_York;

use crate::spots::{OutletDensity, SeatingType, VibePrimary, WorkSpot};

const BIOPHILIC_TAGS: [&str; 5] = ["outdoor", "natural-light", "plants", "rooftop", "park"];

pub fn work_mood_tags(spot: &WorkSpot) -> Vec<&'static str> {
    let mut tags = Vec::new();

    let noise = spot.logistics.noise_level;
    let has_booths = spot.has_private_booths();
    let has_communal = spot.logistics.seating_type.contains(&SeatingType::Communal);
    let biophilic = spot
        .vibe
        .tags
        .iter()
        .any(|tag| BIOPHILIC_TAGS.contains(&tag.as_str()));

    if noise <= 50.0
        || has_booths
        || matches!(spot.vibe.primary, VibePrimary::Quiet | VibePrimary::Focus)
    {
        tags.push("#DeepWork");
    }
    if has_communal || spot.vibe.primary == VibePrimary::Social || noise >= 65.0 {
        tags.push("#SocialCollab");
    }
    if spot.meeting_friendly.unwrap_or(false) || has_booths || spot.has_free_parking() {
        tags.push("#ClientReady");
    }
    if biophilic {
        tags.push("#Biophilic");
    }

    if tags.is_empty() {
        tags.push("#DeepWork");
    }

    tags
}

/// 1 to 5. A measured zoom score (0-10) wins over the noise heuristic.
pub fn meeting_ready_score(spot: &WorkSpot) -> u8 {
    if let Some(zoom) = spot.zoom_score {
        return (zoom / 2.0).round().clamp(1.0, 5.0) as u8;
    }

    let mut score: i32 = 3;
    if spot.logistics.noise_level <= 45.0 {
        score += 1;
    }
    if spot.logistics.noise_level >= 70.0 {
        score -= 1;
    }
    if spot.has_private_booths() {
        score += 1;
    }
    if spot.vibe.primary == VibePrimary::Social {
        score -= 1;
    }

    score.clamp(1, 5) as u8
}

pub fn acoustic_label(spot: &WorkSpot) -> &'static str {
    if spot.has_private_booths() {
        return "Soundproof booths available";
    }

    if spot.logistics.noise_level <= 45.0 {
        return "Quiet zone (library-like)";
    }

    if spot.logistics.noise_level >= 70.0 || spot.vibe.primary == VibePrimary::Social {
        return "Social hub (expect interruptions)";
    }

    "Moderate ambient noise"
}

pub fn noise_label(dba: f64) -> &'static str {
    if dba <= 45.0 {
        "Quiet"
    } else if dba <= 70.0 {
        "Moderate"
    } else {
        "Loud"
    }
}

pub fn outlet_stars(density: OutletDensity) -> &'static str {
    match density {
        OutletDensity::Sparse => "☆",
        OutletDensity::Moderate => "☆☆",
        OutletDensity::Plenty => "☆☆☆",
    }
}

pub fn format_wifi_speed(mbps: f64) -> String {
    if mbps >= 1000.0 {
        format!("{:.1} Gbps", mbps / 1000.0)
    } else {
        format!("{mbps} Mbps")
    }
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M").ok()
}

fn twelve_hour(time: &str) -> String {
    parse_time(time)
        .map(|t| t.format("%-I:%M %p").to_string())
        .unwrap_or_else(|| time.to_string())
}

pub fn format_hours(open: Option<&str>, close: Option<&str>) -> String {
    match (open, close) {
        (Some(open), Some(close)) => format!("{} - {}", twelve_hour(open), twelve_hour(close)),
        _ => "Closed".to_string(),
    }
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Wall-clock time in Northern Virginia, which is what posted hours refer to.
pub fn nova_time(at: DateTime<Utc>) -> NaiveDateTime {
    at.with_timezone(&New_York).naive_local()
}

pub fn is_open_now(spot: &WorkSpot) -> bool {
    is_open_at(spot, nova_time(Utc::now()))
}

pub fn is_open_at(spot: &WorkSpot, at: NaiveDateTime) -> bool {
    let day = day_name(at.weekday());

    let Some(hours) = spot.hours.iter().find(|h| h.day == day) else {
        return false;
    };

    match (
        hours.open.as_deref().and_then(parse_time),
        hours.close.as_deref().and_then(parse_time),
    ) {
        (Some(open), Some(close)) => (open..close).contains(&at.time()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::bundled;

    fn spot(slug: &str) -> WorkSpot {
        bundled().unwrap().by_slug(slug).unwrap().clone()
    }

    #[test]
    fn test_mood_tags() {
        assert_eq!(
            work_mood_tags(&spot("3den-tysons")),
            vec!["#DeepWork", "#ClientReady"]
        );
        assert_eq!(
            work_mood_tags(&spot("northside-social")),
            vec!["#SocialCollab"]
        );
        assert!(work_mood_tags(&spot("caboose-commons")).contains(&"#Biophilic"));
    }

    #[test]
    fn test_meeting_score() {
        // zoom score 9.0 rounds to 5
        assert_eq!(meeting_ready_score(&spot("3den-tysons")), 5);
        // 62 dB, social
        assert_eq!(meeting_ready_score(&spot("northside-social")), 2);
        // 38 dB library
        assert_eq!(meeting_ready_score(&spot("arlington-central-library")), 4);
    }

    #[test]
    fn test_acoustic_label() {
        assert_eq!(acoustic_label(&spot("3den-tysons")), "Soundproof booths available");
        assert_eq!(acoustic_label(&spot("arlington-central-library")), "Quiet zone (library-like)");
        assert_eq!(acoustic_label(&spot("northside-social")), "Social hub (expect interruptions)");
        assert_eq!(acoustic_label(&spot("compass-coffee-rosslyn")), "Moderate ambient noise");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_wifi_speed(240.0), "240 Mbps");
        assert_eq!(format_wifi_speed(1200.0), "1.2 Gbps");
        assert_eq!(format_hours(Some("07:00"), Some("20:30")), "7:00 AM - 8:30 PM");
        assert_eq!(format_hours(Some("00:15"), Some("12:00")), "12:15 AM - 12:00 PM");
        assert_eq!(format_hours(None, None), "Closed");
        assert_eq!(noise_label(44.0), "Quiet");
        assert_eq!(noise_label(70.0), "Moderate");
        assert_eq!(noise_label(71.0), "Loud");
    }

    #[test]
    fn test_open_at() {
        let library = spot("reston-regional-library");
        // 2026-03-01 is a Sunday, the library is closed
        let sunday = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let monday_noon = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let monday_late = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(21, 0, 0)
            .unwrap();

        assert!(!is_open_at(&library, sunday));
        assert!(is_open_at(&library, monday_noon));
        assert!(!is_open_at(&library, monday_late));
    }

    #[test]
    fn test_evening_hours_use_eastern_time() {
        use chrono::TimeZone;

        let library = spot("reston-regional-library");

        // Monday 19:30 EST, already Tuesday in UTC
        let winter_evening = Utc.with_ymd_and_hms(2026, 3, 3, 0, 30, 0).unwrap();
        assert_eq!(
            nova_time(winter_evening),
            NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap()
        );
        assert!(is_open_at(&library, nova_time(winter_evening)));

        // Monday 20:30 EDT
        let summer_evening = Utc.with_ymd_and_hms(2026, 7, 7, 0, 30, 0).unwrap();
        assert!(is_open_at(&library, nova_time(summer_evening)));

        // Monday 21:30 EST, past closing
        let after_close = Utc.with_ymd_and_hms(2026, 3, 3, 2, 30, 0).unwrap();
        assert!(!is_open_at(&library, nova_time(after_close)));
    }
}
