//! # Structured Data
//!
//! schema.org JSON-LD embedded in location pages.
use serde_json::{Value, json};

use crate::spots::WorkSpot;

pub const DEFAULT_BASE_URL: &str = "https://novanode.dev";

fn feature(name: &str, value: String) -> Value {
    json!({
        "@type": "LocationFeatureSpecification",
        "name": name,
        "value": value,
    })
}

pub fn work_spot_json_ld(spot: &WorkSpot, base_url: &str) -> Value {
    let logistics = &spot.logistics;

    let mut amenities = vec![
        feature(
            "High-Speed Wi-Fi",
            format!("{} Mbps download", logistics.wifi_speed_down),
        ),
        feature(
            "Wi-Fi Upload Speed",
            format!("{} Mbps upload", logistics.wifi_speed_up),
        ),
        feature(
            "Power Outlets",
            logistics.outlet_density.label().to_lowercase(),
        ),
        feature("Noise Level", format!("{} dB", logistics.noise_level)),
        feature(
            "Weekend Friendly",
            if spot.weekend_friendly() {
                "Laptops welcome on weekends"
            } else {
                "Restricted weekend laptop policy"
            }
            .to_string(),
        ),
        feature(
            "Remote Work Verified",
            format!(
                "Last verified: {}",
                if logistics.last_verified.is_empty() {
                    "Recently"
                } else {
                    logistics.last_verified.as_str()
                }
            ),
        ),
    ];

    if spot.has_zoom_pods.unwrap_or(false) {
        amenities.push(feature(
            "Zoom Pods",
            "Private soundproof pods available".to_string(),
        ));
    }
    if spot.has_5g.unwrap_or(false) {
        amenities.push(feature(
            "5G Connectivity",
            "Verified 5G for outdoor work".to_string(),
        ));
    }
    if spot.power_player() {
        amenities.push(feature("Power Coverage", "100% outlet coverage".to_string()));
    }

    let opening_hours: Vec<Value> = spot
        .hours
        .iter()
        .filter_map(|h| match (&h.open, &h.close) {
            (Some(open), Some(close)) => Some(json!({
                "@type": "OpeningHoursSpecification",
                "dayOfWeek": h.day,
                "opens": open,
                "closes": close,
            })),
            _ => None,
        })
        .collect();

    let locality = spot.neighborhood.display_name();

    let mut schema = json!({
        "@context": "https://schema.org",
        "@type": "LocalBusiness",
        "name": spot.name,
        "description": format!(
            "Verified remote work logistics for {} in {locality}, VA: {} Mbps Wi-Fi, {} outlets, {}dB noise. {}",
            spot.name,
            logistics.wifi_speed_down,
            logistics.outlet_density.label().to_lowercase(),
            logistics.noise_level,
            spot.laptop_policy.as_deref().unwrap_or_default(),
        )
        .trim_end()
        .to_string(),
        "url": format!("{base_url}{}", spot.path()),
        "address": {
            "@type": "PostalAddress",
            "streetAddress": spot.address,
            "addressLocality": locality,
            "addressRegion": "VA",
            "addressCountry": "US",
        },
        "priceRange": spot.seo.price_range,
        "aggregateRating": {
            "@type": "AggregateRating",
            "ratingValue": spot.seo.rating,
            "reviewCount": spot.seo.review_count,
            "bestRating": 5,
        },
        "amenityFeature": amenities,
    });

    if let Some(phone) = &spot.phone {
        schema["telephone"] = json!(phone);
    }
    if !opening_hours.is_empty() {
        schema["openingHoursSpecification"] = json!(opening_hours);
    }

    schema
}

/// `items` are `(name, url)`; relative urls are joined onto `base_url`.
pub fn breadcrumb_json_ld(items: &[(&str, &str)], base_url: &str) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(index, (name, url))| {
            let item = if url.starts_with("http") {
                url.to_string()
            } else {
                format!("{base_url}{url}")
            };

            json!({
                "@type": "ListItem",
                "position": index + 1,
                "name": name,
                "item": item,
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundled;

    #[test]
    fn test_local_business_schema() {
        let catalog = bundled().unwrap();
        let spot = catalog.by_slug("3den-tysons").unwrap();
        let schema = work_spot_json_ld(spot, DEFAULT_BASE_URL);

        assert_eq!(schema["@type"], "LocalBusiness");
        assert_eq!(schema["url"], "https://novanode.dev/location/tysons/3den-tysons");
        assert_eq!(schema["address"]["addressLocality"], "Tysons");
        assert_eq!(schema["aggregateRating"]["bestRating"], 5);

        let names: Vec<&str> = schema["amenityFeature"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|f| f["name"].as_str())
            .collect();
        assert!(names.contains(&"Zoom Pods"));
        assert!(names.contains(&"Power Coverage"));
        assert!(!names.contains(&"5G Connectivity"));

        assert_eq!(schema["openingHoursSpecification"].as_array().unwrap().len(), 7);
        assert!(schema.get("telephone").is_none());
    }

    #[test]
    fn test_closed_days_skipped() {
        let catalog = bundled().unwrap();
        let spot = catalog.by_slug("reston-regional-library").unwrap();
        let schema = work_spot_json_ld(spot, DEFAULT_BASE_URL);

        assert_eq!(schema["openingHoursSpecification"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_breadcrumbs() {
        let crumbs = breadcrumb_json_ld(
            &[("Home", "/"), ("Tysons", "https://example.com/neighborhood/tysons")],
            DEFAULT_BASE_URL,
        );
        let items = crumbs["itemListElement"].as_array().unwrap();

        assert_eq!(items[0]["item"], "https://novanode.dev/");
        assert_eq!(items[1]["item"], "https://example.com/neighborhood/tysons");
        assert_eq!(items[1]["position"], 2);
    }
}
