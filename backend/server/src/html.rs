//! Server-rendered HTML fragments shared by the public and admin pages.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use catalog::{
    curation::{is_featured, is_verified},
    environment::{format_wifi_speed, noise_label, outlet_stars, work_mood_tags},
    spots::{Neighborhood, WorkSpot},
};
use serde_json::Value;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#0f172a;background:#f8fafc}\
header,main,footer{max-width:960px;margin:0 auto;padding:16px}\
nav a{margin-right:12px}\
.cards{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:12px;padding:0;list-style:none}\
.card{background:#fff;border:1px solid #e2e8f0;border-radius:8px;padding:12px}\
.badge{font-size:12px;background:#e0e7ff;border-radius:4px;padding:2px 6px;margin-right:4px}\
table{border-collapse:collapse}td,th{border:1px solid #e2e8f0;padding:6px 10px;text-align:left}";

pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// `<script type="application/ld+json">` with `</` broken up so the payload cannot close the tag.
pub fn json_ld(value: &Value) -> String {
    format!(
        "<script type=\"application/ld+json\">{}</script>",
        value.to_string().replace("</", "<\\/")
    )
}

fn nav() -> String {
    let neighborhoods: String = Neighborhood::ALL
        .iter()
        .map(|n| {
            format!(
                "<a href=\"/neighborhood/{}\">{}</a>",
                n.slug(),
                n.display_name()
            )
        })
        .collect();

    format!(
        "<nav><a href=\"/\"><strong>NoVaNode</strong></a>{neighborhoods}\
<a href=\"/fastest-wifi-nova\">Fastest Wi-Fi</a><a href=\"/quiet-zones-map\">Quiet Zones</a></nav>"
    )
}

/// Full document. `head_extra` and `body` are trusted HTML, `title` and `description` are escaped.
pub fn layout(title: &str, description: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
<title>{title} | NoVaNode</title><meta name=\"description\" content=\"{description}\">\
<style>{STYLE}</style>{head_extra}</head><body><header>{nav}</header><main>{body}</main>\
<footer><small>Community-verified remote work spots across Northern Virginia.</small></footer>\
</body></html>",
        title = escape(title),
        description = escape(description),
        nav = nav(),
    )
}

pub fn page(title: &str, description: &str, body: &str) -> Html<String> {
    Html(layout(title, description, "", body))
}

pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        page(
            "Not found",
            "This page does not exist.",
            "<h1>Not found</h1><p><a href=\"/\">Back to all spots</a></p>",
        ),
    )
        .into_response()
}

pub fn spot_card(spot: &WorkSpot) -> String {
    let logistics = &spot.logistics;

    let badges: String = is_featured(spot)
        .then_some("Featured")
        .into_iter()
        .chain(work_mood_tags(spot))
        .chain(is_verified(spot).then_some("Verified"))
        .map(|tag| format!("<span class=\"badge\">{}</span>", escape(tag)))
        .collect();

    format!(
        "<li class=\"card\"><h3><a href=\"{path}\">{name}</a></h3>\
<p>{neighborhood} · {price} · {rating:.1}★</p>\
<p>Wi-Fi {wifi} · {noise} ({db} dB) · Outlets {outlets}</p><p>{badges}</p></li>",
        path = escape(&spot.path()),
        name = escape(&spot.name),
        neighborhood = spot.neighborhood.display_name(),
        price = escape(&spot.seo.price_range),
        rating = spot.seo.rating,
        wifi = format_wifi_speed(logistics.wifi_speed_down),
        noise = noise_label(logistics.noise_level),
        db = logistics.noise_level,
        outlets = outlet_stars(logistics.outlet_density),
    )
}

pub fn spot_list<'a>(spots: impl IntoIterator<Item = &'a WorkSpot>) -> String {
    let cards: String = spots.into_iter().map(spot_card).collect();

    if cards.is_empty() {
        "<p>No spots match yet.</p>".to_string()
    } else {
        format!("<ul class=\"cards\">{cards}</ul>")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_json_ld_cannot_close_script() {
        let script = json_ld(&json!({ "name": "</script><script>alert(1)" }));

        assert_eq!(script.matches("</script>").count(), 1);
        assert!(script.ends_with("</script>"));
    }

    #[test]
    fn test_layout_escapes_title() {
        let html = layout("<b>Reston</b>", "desc", "", "<p>body</p>");

        assert!(html.contains("<title>&lt;b&gt;Reston&lt;/b&gt; | NoVaNode</title>"));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn test_spot_card_badges() {
        let catalog = catalog::bundled().unwrap();

        let featured = spot_card(catalog.by_slug("reston-roasters").unwrap());
        assert!(featured.contains("<span class=\"badge\">Featured</span>"));
        assert!(!featured.contains("Verified"));

        let verified = spot_card(catalog.by_slug("compass-coffee-rosslyn").unwrap());
        assert!(verified.contains("Verified"));
        assert!(!verified.contains("Featured"));
    }

    #[test]
    fn test_spot_list_empty() {
        assert_eq!(spot_list(Vec::<&WorkSpot>::new()), "<p>No spots match yet.</p>");
    }
}
