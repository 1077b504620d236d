mod common;

use reqwest::StatusCode;

use common::{no_redirects, spawn};

async fn html(path: &str) -> (StatusCode, String) {
    let server = spawn().await;
    let response = reqwest::get(server.url(path)).await.unwrap();

    (response.status(), response.text().await.unwrap())
}

#[tokio::test]
async fn test_home_lists_and_filters() {
    let (status, body) = html("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Northside Social"));
    assert!(body.contains("Reston Regional Library"));

    let (_, filtered) = html("/?neighborhood=reston&q=library").await;
    assert!(filtered.contains("Reston Regional Library"));
    assert!(!filtered.contains("Reston Roasters"));
    assert!(!filtered.contains("Northside Social"));

    let (_, reston) = html("/?neighborhood=reston").await;
    let featured = reston.find("Reston Roasters").unwrap();
    let library = reston.find("Reston Regional Library").unwrap();
    assert!(featured < library);
    assert_eq!(reston.matches(">Featured</span>").count(), 1);

    let (_, fast) = html("/?wifi=1").await;
    assert!(fast.contains("3DEN Tysons Corner"));
    assert!(!fast.contains("Beatley Central Library"));
}

#[tokio::test]
async fn test_neighborhood_pages() {
    let (status, body) = html("/neighborhood/tysons").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Remote work in Tysons"));
    assert!(body.contains("Caboose Commons"));
    assert!(!body.contains("Reston Roasters"));

    let (missing, _) = html("/neighborhood/fairfax").await;
    assert_eq!(missing, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_location_page_embeds_structured_data() {
    let server = spawn().await;

    let response = reqwest::get(server.url("/location/arlington/northside-social"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.text().await.unwrap();
    assert_eq!(body.matches("application/ld+json").count(), 2);
    assert!(body.contains("BreadcrumbList"));
    assert!(body.contains("https://novanode.dev/location/arlington/northside-social"));
    assert!(body.contains("No community speed tests yet."));

    let wrong_neighborhood = reqwest::get(server.url("/location/tysons/northside-social"))
        .await
        .unwrap();
    assert_eq!(wrong_neighborhood.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compare_redirects_to_canonical_pair() {
    let server = spawn().await;
    let client = no_redirects();

    let redirect = client
        .get(server.url("/compare/northside-social-vs-caboose-commons"))
        .send()
        .await
        .unwrap();
    assert_eq!(redirect.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(
        redirect.headers()["location"],
        "/compare/caboose-commons-vs-northside-social"
    );

    let canonical = client
        .get(server.url("/compare/caboose-commons-vs-northside-social"))
        .send()
        .await
        .unwrap();
    assert_eq!(canonical.status(), StatusCode::OK);
    let body = canonical.text().await.unwrap();
    assert!(body.contains("Caboose Commons vs Northside Social"));

    for path in [
        "/compare/caboose-commons-vs-caboose-commons",
        "/compare/caboose-commons",
        "/compare/caboose-commons-vs-nowhere",
    ] {
        let response = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_landing_pages() {
    let server = spawn().await;

    for path in [
        "/fastest-wifi-nova",
        "/quiet-zones-map",
        "/quiet-zones-arlington",
        "/best-wifi-arlington",
        "/best-wifi-tysons",
        "/laptop-friendly-weekends",
        "/free-parking-remote-work",
    ] {
        let response = reqwest::get(server.url(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    let fastest = reqwest::get(server.url("/fastest-wifi-nova"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let first = fastest.find("3DEN Tysons Corner").unwrap();
    let second = fastest.find("Compass Coffee Rosslyn").unwrap();
    assert!(first < second);
    assert!(!fastest.contains("Misha"));
}

#[tokio::test]
async fn test_compare_index_lists_every_pair() {
    let (status, body) = html("/compare").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body.matches("href=\"/compare/").count(), 45);
    assert!(body.contains("href=\"/compare/caboose-commons-vs-northside-social\""));
    assert!(!body.contains("href=\"/compare/northside-social-vs-caboose-commons\""));
}

#[tokio::test]
async fn test_laptop_policies_page() {
    let (status, body) = html("/virginia-laptop-policies").await;
    assert_eq!(status, StatusCode::OK);

    assert!(body.contains(
        "<a href=\"/location/arlington/northside-social\">Northside Social</a>"
    ));
    assert!(body.contains(
        "<a href=\"/location/arlington/compass-coffee-rosslyn\">Compass Coffee</a>"
    ));
    assert!(body.contains("Blue Print Coffee"));
    assert!(!body.contains(">Blue Print Coffee</a>"));
    assert!(body.contains("Limited, brunch crowd takes priority"));
}

#[tokio::test]
async fn test_free_alternatives_page() {
    let (status, body) = html("/free-alternatives").await;
    assert_eq!(status, StatusCode::OK);

    assert!(body.contains("7 free public spaces"));
    assert!(body.contains("href=\"/location/reston/reston-regional-library\""));
    assert!(body.contains("Tysons Galleria Food Court (3rd Floor)"));
    assert!(!body.contains("tysons-galleria-third-floor"));
}
