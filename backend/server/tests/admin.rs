mod common;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use common::{ADMIN_TOKEN, no_redirects, spawn, spawn_with};

#[tokio::test]
async fn test_unconfigured_token_locks_admin() {
    let server = spawn_with(|config| config.admin_token = None).await;
    let client = Client::new();

    for path in ["/admin", "/admin/moderation", "/api/admin/metrics", "/api/admin/moderation"] {
        let response = client
            .get(server.url(path))
            .header("x-admin-token", "anything")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
}

#[tokio::test]
async fn test_missing_token_is_unauthorized_with_hint() {
    let server = spawn().await;

    let response = reqwest::get(server.url("/api/admin/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["hint"].as_str().unwrap().contains("NOVANODE_ADMIN_TOKEN"));

    let wrong = Client::new()
        .get(server.url("/api/admin/metrics"))
        .header("x-admin-token", "guess")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_each_token_carrier_is_accepted() {
    let server = spawn().await;
    let client = Client::new();

    let by_header = client
        .get(server.url("/api/admin/metrics"))
        .header("x-admin-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(by_header.status(), StatusCode::OK);

    let by_query = client
        .get(server.url(&format!("/api/admin/metrics?token={ADMIN_TOKEN}")))
        .send()
        .await
        .unwrap();
    assert_eq!(by_query.status(), StatusCode::OK);

    let by_cookie = client
        .get(server.url("/admin"))
        .header("cookie", format!("novanode_admin_token={ADMIN_TOKEN}"))
        .send()
        .await
        .unwrap();
    assert_eq!(by_cookie.status(), StatusCode::OK);
    assert!(by_cookie.text().await.unwrap().contains("NoVaNode Admin"));
}

#[tokio::test]
async fn test_metrics_count_collections() {
    let server = spawn().await;
    let client = Client::new();

    client
        .post(server.url("/api/seat-status"))
        .json(&json!({ "spotId": "caboose-commons", "state": "busy" }))
        .send()
        .await
        .unwrap();
    client
        .post(server.url("/api/newsletter"))
        .json(&json!({ "email": "reader@example.com" }))
        .send()
        .await
        .unwrap();

    let metrics: Value = client
        .get(server.url("/api/admin/metrics"))
        .header("x-admin-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        metrics,
        json!({
            "speedSubmissions": 0,
            "seatReports": 1,
            "vibePhotos": 0,
            "newsletterSignups": 1,
            "workBuddySignals": 0,
            "moderationQueue": 0,
        })
    );
}

#[tokio::test]
async fn test_moderation_overview() {
    let server = spawn().await;
    let client = Client::new();

    client
        .post(server.url("/api/newsletter"))
        .json(&json!({ "email": "join my telegram https://x.example @me" }))
        .send()
        .await
        .unwrap();

    let overview: Value = client
        .get(server.url("/api/admin/moderation"))
        .header("x-admin-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(overview["total"], 1);
    assert_eq!(overview["high"], 0);
    assert_eq!(overview["medium"], 1);
    assert_eq!(overview["items"][0]["kind"], "newsletter_signup");
    assert_eq!(overview["items"][0]["reasons"], json!(["suspicious_text"]));

    let page = client
        .get(server.url(&format!("/admin/moderation?token={ADMIN_TOKEN}")))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await.unwrap();
    assert!(html.contains("Total: 1"));
    assert!(html.contains("suspicious_text"));
}

#[tokio::test]
async fn test_login_sets_cookie() {
    let server = spawn().await;
    let client = no_redirects();

    let form = client.get(server.url("/admin/login")).send().await.unwrap();
    assert_eq!(form.status(), StatusCode::OK);

    let wrong = client
        .post(server.url("/admin/login"))
        .form(&[("token", "guess")])
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong.headers().get("set-cookie").is_none());

    let right = client
        .post(server.url("/admin/login"))
        .form(&[("token", ADMIN_TOKEN), ("next", "/admin/moderation")])
        .send()
        .await
        .unwrap();
    assert_eq!(right.status(), StatusCode::SEE_OTHER);
    assert_eq!(right.headers()["location"], "/admin/moderation");

    let cookie = right.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with(&format!("novanode_admin_token={ADMIN_TOKEN};")));

    let session = cookie.split(';').next().unwrap().to_string();
    let admin = client
        .get(server.url("/admin/moderation"))
        .header("cookie", session)
        .send()
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::OK);
}
