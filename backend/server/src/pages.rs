//! # Pages
//!
//! Server-rendered HTML for the directory.
//!
//! ## Routes
//! - `/` searchable listing of every spot
//! - `/neighborhood/{neighborhood}` featured pick, ranked list and quiet picks
//! - `/location/{neighborhood}/{slug}` full profile with JSON-LD and live community status
//! - `/compare` index of every canonical pair
//! - `/compare/{a-vs-b}` side by side, non-canonical pairs redirect permanently
//! - Landing pages built from catalog queries: fastest Wi-Fi, quiet zones, best Wi-Fi per
//!   neighborhood, laptop-friendly weekends, free parking
//! - Editorial pages from curated tables: laptop policies, free alternatives
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use catalog::{
    ComparePair, SpotFilter,
    curation::{
        FREE_SPACES, LAPTOP_POLICIES, featured_slug, is_featured, is_verified, resident_tip,
        shows_day_pass_partner, shows_outlet_affiliate,
    },
    environment::{
        acoustic_label, format_hours, format_wifi_speed, is_open_now, meeting_ready_score,
        noise_label, outlet_stars, work_mood_tags,
    },
    seo::{breadcrumb_json_ld, work_spot_json_ld},
    spots::{Neighborhood, WorkSpot},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::{
    aggregate::{seat_summary, speed_summary},
    html::{escape, json_ld, layout, not_found, page, spot_list},
    state::State as AppState,
    store::Collection,
    submissions::{SeatReport, SpeedSubmission, VibePhoto},
};

pub const FASTEST_WIFI_MIN_MBPS: f64 = 50.0;
pub const QUIET_MAX_DB: f64 = 65.0;
pub const QUIET_NEIGHBORHOOD_MAX_DB: f64 = 55.0;
const COMPARE_CANDIDATES: usize = 3;

type Shared = Arc<AppState>;

#[derive(Deserialize, Debug, Default)]
pub struct HomeQuery {
    pub neighborhood: Option<String>,
    pub q: Option<String>,
    pub wifi: Option<String>,
    pub late: Option<String>,
}

fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "on"))
}

impl HomeQuery {
    pub fn filter(&self) -> SpotFilter {
        SpotFilter {
            neighborhood: self.neighborhood.as_deref().and_then(Neighborhood::from_slug),
            query: self.q.clone(),
            high_speed_wifi: flag(self.wifi.as_deref()),
            open_late: flag(self.late.as_deref()),
        }
    }
}

fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

pub async fn home_handler(
    State(state): State<Shared>,
    Query(query): Query<HomeQuery>,
) -> Html<String> {
    let filter = query.filter();
    let mut spots = state.catalog.search(&filter);
    spots.sort_by_key(|spot| !is_featured(spot));

    let options: String = Neighborhood::ALL
        .iter()
        .map(|n| {
            let selected = if filter.neighborhood == Some(*n) {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{}\"{selected}>{}</option>",
                n.slug(),
                n.display_name()
            )
        })
        .collect();

    let body = format!(
        "<h1>Remote work spots in Northern Virginia</h1>\
<form method=\"get\" action=\"/\">\
<input name=\"q\" placeholder=\"Search spots, tags, addresses\" value=\"{q}\">\
<select name=\"neighborhood\"><option value=\"\">All neighborhoods</option>{options}</select>\
<label><input type=\"checkbox\" name=\"wifi\" value=\"1\"{wifi}> 100+ Mbps</label>\
<label><input type=\"checkbox\" name=\"late\" value=\"1\"{late}> Open late</label>\
<button>Filter</button></form><p>{count} spots</p>{list}\
<section><h2>Newsletter</h2><p>Weekly picks, POST your email to <code>/api/newsletter</code>.</p></section>",
        q = escape(query.q.as_deref().unwrap_or_default()),
        wifi = checked(filter.high_speed_wifi),
        late = checked(filter.open_late),
        count = spots.len(),
        list = spot_list(spots),
    );

    page(
        "Find your next remote work spot",
        "Cafés, libraries and coworking spots across Arlington, Alexandria, Tysons and Reston.",
        &body,
    )
}

pub async fn neighborhood_handler(
    State(state): State<Shared>,
    Path(neighborhood): Path<String>,
) -> Response {
    let Some(neighborhood) = Neighborhood::from_slug(&neighborhood) else {
        return not_found();
    };
    let name = neighborhood.display_name();

    let featured = state
        .catalog
        .by_slug(featured_slug(neighborhood))
        .map(|spot| {
            format!(
                "<section><h2>Featured</h2>{}</section>",
                spot_list([spot])
            )
        })
        .unwrap_or_default();

    let body = format!(
        "<h1>Remote work in {name}</h1>{featured}\
<h2>All spots, best rated first</h2>{all}\
<h2>Quiet picks</h2>{quiet}",
        all = spot_list(state.catalog.by_neighborhood(neighborhood)),
        quiet = spot_list(
            state
                .catalog
                .quiet_zones(Some(neighborhood), QUIET_NEIGHBORHOOD_MAX_DB)
        ),
    );

    page(
        &format!("Best places to work remotely in {name}"),
        &format!("Laptop-friendly cafés and libraries in {name}, VA with verified Wi-Fi speeds."),
        &body,
    )
    .into_response()
}

/// Live community numbers, empty when the store cannot be read.
async fn community_status(state: &AppState, spot: &WorkSpot) -> String {
    let speeds = state
        .store
        .read_all::<SpeedSubmission>(Collection::SpeedSubmissions)
        .await;
    let seats = state
        .store
        .read_all::<SeatReport>(Collection::SeatReports)
        .await;
    let photos = state
        .store
        .read_all::<VibePhoto>(Collection::VibePhotos)
        .await;

    let (Ok(speeds), Ok(seats), Ok(photos)) = (speeds, seats, photos) else {
        warn!("Community status unavailable for {}", spot.id);
        return String::new();
    };

    let speed = speed_summary(&speeds, &spot.id);
    let seat = seat_summary(&seats, &spot.id, Utc::now());

    let speed_line = if speed.count == 0 {
        "No community speed tests yet.".to_string()
    } else {
        format!(
            "Median of {} tests: {} down, {} up, {} ms",
            speed.count,
            format_wifi_speed(speed.median_download_mbps),
            format_wifi_speed(speed.median_upload_mbps),
            speed.median_latency_ms
        )
    };

    let seat_line = match seat.current_state {
        Some(current) => format!(
            "Seats: {} ({} reports, expires in {} min)",
            current.as_str(),
            seat.count,
            seat.expires_in_minutes
        ),
        None => "No recent seat reports.".to_string(),
    };

    let photo = photos
        .iter()
        .find(|photo| photo.spot_id == spot.id)
        .map(|photo| {
            format!(
                "<img src=\"{}\" alt=\"Latest vibe photo\" width=\"320\">",
                escape(&photo.url)
            )
        })
        .unwrap_or_default();

    format!(
        "<section><h2>Community status</h2><p>{}</p><p>{}</p>{photo}</section>",
        escape(&speed_line),
        escape(&seat_line)
    )
}

fn hours_table(spot: &WorkSpot) -> String {
    let rows: String = spot
        .hours
        .iter()
        .map(|h| {
            format!(
                "<tr><th>{}</th><td>{}</td></tr>",
                escape(&h.day),
                format_hours(h.open.as_deref(), h.close.as_deref())
            )
        })
        .collect();

    format!("<table>{rows}</table>")
}

pub async fn location_handler(
    State(state): State<Shared>,
    Path((neighborhood, slug)): Path<(String, String)>,
) -> Response {
    let Some(spot) = Neighborhood::from_slug(&neighborhood)
        .and_then(|neighborhood| state.catalog.spot(neighborhood, &slug))
    else {
        return not_found();
    };

    let base_url = &state.config.base_url;
    let logistics = &spot.logistics;
    let neighborhood_path = format!("/neighborhood/{}", spot.neighborhood.slug());
    let spot_path = spot.path();

    let head = format!(
        "{}{}<link rel=\"canonical\" href=\"{}\">",
        json_ld(&work_spot_json_ld(spot, base_url)),
        json_ld(&breadcrumb_json_ld(
            &[
                ("Home", "/"),
                (spot.neighborhood.display_name(), neighborhood_path.as_str()),
                (spot.name.as_str(), spot_path.as_str()),
            ],
            base_url,
        )),
        escape(&format!("{base_url}{spot_path}")),
    );

    let seating: Vec<&str> = logistics.seating_type.iter().map(|s| s.label()).collect();
    let tags = work_mood_tags(spot).join(" ");
    let open_now = if is_open_now(spot) {
        "Open now"
    } else {
        "Closed now"
    };

    let optional = |label: &str, value: Option<&String>| {
        value
            .map(|value| format!("<p><strong>{label}:</strong> {}</p>", escape(value)))
            .unwrap_or_default()
    };

    let tip = resident_tip(&spot.slug)
        .map(|tip| {
            format!(
                "<blockquote>{}<br><small>{} ({})</small></blockquote>",
                escape(tip.text),
                escape(tip.name),
                escape(tip.handle)
            )
        })
        .unwrap_or_default();

    let mut partners = String::new();
    if shows_day_pass_partner(spot) {
        partners.push_str("<p class=\"badge\">Day passes available through partners</p>");
    }
    if shows_outlet_affiliate(spot) {
        partners.push_str("<p class=\"badge\">Outlets are scarce, bring a charged power bank</p>");
    }

    let compare: String = state
        .catalog
        .compare_candidates(spot, COMPARE_CANDIDATES)
        .into_iter()
        .filter_map(|other| {
            let pair = ComparePair::between(&spot.slug, &other.slug)?;

            Some(format!(
                "<li><a href=\"/compare/{}\">{} vs {}</a></li>",
                escape(&pair.canonical),
                escape(&spot.name),
                escape(&other.name)
            ))
        })
        .collect();

    let community = community_status(&state, spot).await;

    let body = format!(
        "<h1>{name}</h1><p>{neighborhood} · {address} · {open_now}{verified}</p>\
<p>{description}</p><p>{tags}</p>\
<h2>Logistics</h2><ul>\
<li>Wi-Fi: {down} down / {up} up</li>\
<li>Noise: {noise} ({db} dB), {acoustic}</li>\
<li>Outlets: {outlets} {density}</li>\
<li>Seating: {seating}</li>\
<li>Meeting ready: {meeting}/5</li>\
<li>Last verified: {verified_on}</li></ul>\
{laptop}{expert}{deep_work}{parking}{tip}{partners}\
<h2>Hours</h2>{hours}{community}\
<h2>Compare</h2><ul>{compare}</ul>\
<p><a href=\"{maps}\">Open in Google Maps</a></p>",
        name = escape(&spot.name),
        neighborhood = spot.neighborhood.display_name(),
        address = escape(&spot.address),
        verified = if is_verified(spot) { " · Verified" } else { "" },
        description = escape(&spot.seo.description),
        tags = escape(&tags),
        down = format_wifi_speed(logistics.wifi_speed_down),
        up = format_wifi_speed(logistics.wifi_speed_up),
        noise = noise_label(logistics.noise_level),
        db = logistics.noise_level,
        acoustic = acoustic_label(spot),
        outlets = outlet_stars(logistics.outlet_density),
        density = logistics.outlet_density.label(),
        seating = seating.join(", "),
        meeting = meeting_ready_score(spot),
        verified_on = escape(&logistics.last_verified),
        laptop = optional("Laptop policy", spot.laptop_policy.as_ref()),
        expert = optional("Expert tip", spot.expert_tip.as_ref()),
        deep_work = optional("Deep work zone", spot.deep_work_zone.as_ref()),
        parking = optional("Parking", spot.parking_info.as_ref()),
        hours = hours_table(spot),
        maps = escape(&spot.google_maps_url),
    );

    Html(layout(
        &format!("{} in {}", spot.name, spot.neighborhood.display_name()),
        &spot.seo.description,
        &head,
        &body,
    ))
    .into_response()
}

pub async fn compare_index_handler(State(state): State<Shared>) -> Html<String> {
    let links: String = state
        .catalog
        .compare_pairs()
        .iter()
        .filter_map(|pair| {
            let (left, right) = state.catalog.compare(pair)?;

            Some(format!(
                "<li><a href=\"/compare/{}\">{} vs {}</a></li>",
                escape(&pair.canonical),
                escape(&left.name),
                escape(&right.name)
            ))
        })
        .collect();

    let body = format!(
        "<h1>Compare work spots</h1>\
<p>Wi-Fi, noise, outlets and hours side by side for any two spots.</p><ul>{links}</ul>"
    );

    page(
        "Compare work spots",
        "Side-by-side comparisons of Northern Virginia remote work spots.",
        &body,
    )
}

fn compare_row(label: &str, left: String, right: String) -> String {
    format!(
        "<tr><th>{}</th><td>{}</td><td>{}</td></tr>",
        escape(label),
        escape(&left),
        escape(&right)
    )
}

pub async fn compare_handler(State(state): State<Shared>, Path(pair): Path<String>) -> Response {
    let Some(pair) = ComparePair::parse(&pair) else {
        return not_found();
    };

    if !pair.is_canonical() {
        return Redirect::permanent(&format!("/compare/{}", pair.canonical)).into_response();
    }

    let Some((left, right)) = state.catalog.compare(&pair) else {
        return not_found();
    };

    let row = |label: &str, field: fn(&WorkSpot) -> String| {
        compare_row(label, field(left), field(right))
    };

    let rows = [
        row("Neighborhood", |s| s.neighborhood.display_name().to_string()),
        row("Wi-Fi down", |s| format_wifi_speed(s.logistics.wifi_speed_down)),
        row("Wi-Fi up", |s| format_wifi_speed(s.logistics.wifi_speed_up)),
        row("Noise", |s| format!("{} dB", s.logistics.noise_level)),
        row("Outlets", |s| s.logistics.outlet_density.label().to_string()),
        row("Meeting ready", |s| format!("{}/5", meeting_ready_score(s))),
        row("Rating", |s| format!("{:.1}", s.seo.rating)),
        row("Price", |s| s.seo.price_range.clone()),
        row("Open late", |s| (if s.open_late { "Yes" } else { "No" }).to_string()),
    ]
    .concat();

    let body = format!(
        "<h1>{l} vs {r}</h1><table><tr><th></th>\
<th><a href=\"{lp}\">{l}</a></th><th><a href=\"{rp}\">{r}</a></th></tr>{rows}</table>",
        l = escape(&left.name),
        r = escape(&right.name),
        lp = escape(&left.path()),
        rp = escape(&right.path()),
    );

    page(
        &format!("{} vs {}", left.name, right.name),
        &format!("Wi-Fi, noise and outlets compared for {} and {}.", left.name, right.name),
        &body,
    )
    .into_response()
}

fn landing(title: &str, description: &str, intro: &str, spots: Vec<&WorkSpot>) -> Html<String> {
    let body = format!(
        "<h1>{}</h1><p>{}</p>{}",
        escape(title),
        escape(intro),
        spot_list(spots)
    );

    page(title, description, &body)
}

pub async fn fastest_wifi_handler(State(state): State<Shared>) -> Html<String> {
    landing(
        "Fastest Wi-Fi in Northern Virginia",
        "Remote work spots with verified download speeds of 50 Mbps or more.",
        "Ranked by measured download speed.",
        state.catalog.fastest_wifi(FASTEST_WIFI_MIN_MBPS),
    )
}

pub async fn quiet_zones_map_handler(State(state): State<Shared>) -> Html<String> {
    let spots = state.catalog.quiet_zones(None, QUIET_MAX_DB);

    let points: String = spots
        .iter()
        .filter_map(|spot| {
            spot.coordinates.map(|c| {
                format!(
                    "<li><a href=\"{}\">{}</a> {:.4}, {:.4}</li>",
                    escape(&spot.path()),
                    escape(&spot.name),
                    c.lat,
                    c.lng
                )
            })
        })
        .collect();

    let body = format!(
        "<h1>Quiet zones map</h1><p>Spots at or under {QUIET_MAX_DB} dB, quietest first.</p>\
<ul>{points}</ul>{}",
        spot_list(spots)
    );

    page(
        "Quiet zones map",
        "Quiet places to focus across Northern Virginia, measured in decibels.",
        &body,
    )
}

pub async fn quiet_zones_arlington_handler(State(state): State<Shared>) -> Html<String> {
    landing(
        "Quiet zones in Arlington",
        "The quietest laptop-friendly spots in Arlington, VA.",
        "Spots at or under 55 dB, quietest first.",
        state
            .catalog
            .quiet_zones(Some(Neighborhood::Arlington), QUIET_NEIGHBORHOOD_MAX_DB),
    )
}

pub async fn best_wifi_arlington_handler(State(state): State<Shared>) -> Html<String> {
    landing(
        "Best Wi-Fi in Arlington",
        "Arlington remote work spots ranked by verified Wi-Fi speed.",
        "Ranked by measured download speed.",
        state.catalog.best_wifi(Neighborhood::Arlington),
    )
}

pub async fn best_wifi_tysons_handler(State(state): State<Shared>) -> Html<String> {
    landing(
        "Best Wi-Fi in Tysons",
        "Tysons remote work spots ranked by verified Wi-Fi speed.",
        "Ranked by measured download speed.",
        state.catalog.best_wifi(Neighborhood::Tysons),
    )
}

pub async fn weekends_handler(State(state): State<Shared>) -> Html<String> {
    landing(
        "Laptop-friendly weekends",
        "Northern Virginia spots that welcome laptops on Saturdays and Sundays.",
        "Weekend laptop policies verified by residents.",
        state.catalog.weekend_friendly(),
    )
}

pub async fn free_parking_handler(State(state): State<Shared>) -> Html<String> {
    landing(
        "Free parking for remote work",
        "Remote work spots with free parking or budget pricing.",
        "Libraries first, then the fastest Wi-Fi.",
        state.catalog.free_parking(),
    )
}

/// Location page for a curated row, when the catalog has one.
fn catalog_path(state: &AppState, slug: Option<&str>) -> Option<String> {
    slug.and_then(|slug| state.catalog.by_slug(slug))
        .map(WorkSpot::path)
}

pub async fn laptop_policies_handler(State(state): State<Shared>) -> Html<String> {
    let rows: String = LAPTOP_POLICIES
        .iter()
        .map(|policy| {
            let name = match catalog_path(&state, policy.slug) {
                Some(path) => format!("<a href=\"{}\">{}</a>", escape(&path), escape(policy.name)),
                None => escape(policy.name),
            };

            format!(
                "<tr><td>{name}<br><small>{}</small></td><td>{}</td>\
<td><span class=\"badge\">{}</span> {}</td><td>{}</td></tr>",
                escape(policy.policy),
                escape(policy.area),
                if policy.weekend_friendly() { "Open" } else { "Limited" },
                escape(policy.weekend_policy),
                escape(policy.wifi_quality),
            )
        })
        .collect();

    let tips: String = LAPTOP_POLICIES
        .iter()
        .map(|policy| {
            format!(
                "<li class=\"card\"><strong>{}</strong><p>{}</p></li>",
                escape(policy.name),
                escape(policy.tip)
            )
        })
        .collect();

    let body = format!(
        "<h1>Virginia laptop policies</h1>\
<p>Current laptop policies for Northern Virginia cafes and coworking spaces.</p>\
<table><tr><th>Location</th><th>Neighborhood</th><th>Weekends</th><th>Wi-Fi</th></tr>{rows}</table>\
<h2>Pro tips</h2><ul class=\"cards\">{tips}</ul>"
    );

    page(
        "Virginia laptop policies",
        "Which Northern Virginia cafes allow laptops on weekends, which have time limits, and where to work.",
        &body,
    )
}

pub async fn free_alternatives_handler(State(state): State<Shared>) -> Html<String> {
    let cards: String = FREE_SPACES
        .iter()
        .map(|space| {
            let details = catalog_path(&state, space.slug)
                .map(|path| format!("<p><a href=\"{}\">View details</a></p>", escape(&path)))
                .unwrap_or_default();

            format!(
                "<li class=\"card\"><h3>{name}</h3><p><span class=\"badge\">{kind}</span>{address}</p>\
<p>Wi-Fi: {wifi}<br>Parking: {parking}<br>Hours: {hours}</p><p>Pro tip: {tips}</p>{details}</li>",
                name = escape(space.name),
                kind = space.kind.label(),
                address = escape(space.address),
                wifi = escape(space.wifi),
                parking = escape(space.parking),
                hours = escape(space.hours),
                tips = escape(space.tips),
            )
        })
        .collect();

    let body = format!(
        "<h1>Work for free in NoVA</h1>\
<p>{} free public spaces with reliable internet, no purchase required.</p>\
<ul class=\"cards\">{cards}</ul>",
        FREE_SPACES.len()
    );

    page(
        "Free places to work in Northern Virginia",
        "Free public spaces with Wi-Fi in NoVA: libraries, mall lobbies and public buildings.",
        &body,
    )
}
