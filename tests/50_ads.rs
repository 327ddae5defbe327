mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{expect_error, spawn_app, spawn_app_with, test_config, TEST_CLIENT_SECRET};

fn ad_input(title: &str, start_offset_days: i64, end_offset_days: i64) -> Value {
    let today = Utc::now().date_naive();
    json!({
        "title": title,
        "body": format!("{title} body"),
        "price": 5000,
        "duration": 7,
        "startDate": (today + Duration::days(start_offset_days)).to_string(),
        "endDate": (today + Duration::days(end_offset_days)).to_string(),
    })
}

#[tokio::test]
async fn ads_validate_their_window_and_title() -> Result<()> {
    let app = spawn_app().await?;
    let (_, token) = app.signed_up_user("seller@example.com").await?;

    let blank = app
        .post_json("/api/ads", Some(&token), &ad_input("  ", 0, 7))
        .await?;
    expect_error(blank, 422, "Title and body are required.").await?;

    let inverted = app
        .post_json("/api/ads", Some(&token), &ad_input("Backwards", 7, 0))
        .await?;
    expect_error(inverted, 422, "End date must not precede start date.").await?;

    let created = app
        .post_json("/api/ads", Some(&token), &ad_input("Spring sale", 0, 7))
        .await?;
    assert_eq!(created.status(), 200);
    let body: Value = created.json().await?;
    assert_eq!(body["data"]["ad"]["title"], "Spring sale");
    assert_eq!(body["data"]["ad"]["price"], 5000);
    Ok(())
}

#[tokio::test]
async fn ad_titles_are_unique_per_user_only() -> Result<()> {
    let app = spawn_app().await?;
    let (_, seller) = app.signed_up_user("seller@example.com").await?;
    let (_, rival) = app.signed_up_user("rival@example.com").await?;

    app.post_json("/api/ads", Some(&seller), &ad_input("Spring sale", 0, 7))
        .await?;

    let duplicate = app
        .post_json("/api/ads", Some(&seller), &ad_input("Spring sale", 1, 8))
        .await?;
    expect_error(
        duplicate,
        409,
        "An advertisement with this title already exists for this user.",
    )
    .await?;

    // A different seller may reuse the title.
    let reused = app
        .post_json("/api/ads", Some(&rival), &ad_input("Spring sale", 0, 7))
        .await?;
    assert_eq!(reused.status(), 200);

    // The conflict did not insert anything.
    let listed = app.get("/api/ads", None).await?;
    let body: Value = listed.json().await?;
    assert_eq!(body["data"]["count"], 2);
    Ok(())
}

#[tokio::test]
async fn active_filter_keeps_ads_covering_today() -> Result<()> {
    let app = spawn_app().await?;
    let (_, token) = app.signed_up_user("seller@example.com").await?;
    app.post_json("/api/ads", Some(&token), &ad_input("Expired", -10, -5))
        .await?;
    app.post_json("/api/ads", Some(&token), &ad_input("Running", -1, 1))
        .await?;
    app.post_json("/api/ads", Some(&token), &ad_input("Upcoming", 5, 10))
        .await?;

    let all = app.get("/api/ads", None).await?;
    let body: Value = all.json().await?;
    assert_eq!(body["data"]["count"], 3);

    let active = app.get("/api/ads?active=1", None).await?;
    let body: Value = active.json().await?;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["ads"][0]["title"], "Running");
    // Enriched with the seller's name pair.
    assert_eq!(body["data"]["ads"][0]["user"]["firstName"], "seller");
    Ok(())
}

#[tokio::test]
async fn ad_pagination_windows_the_filtered_set() -> Result<()> {
    let app = spawn_app().await?;
    let (_, token) = app.signed_up_user("seller@example.com").await?;
    for n in 1..=3 {
        app.post_json("/api/ads", Some(&token), &ad_input(&format!("Ad {n}"), 0, 7))
            .await?;
    }

    let response = app.get("/api/ads?limit=2&page=2", None).await?;
    let body: Value = response.json().await?;
    assert_eq!(body["data"]["ads"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["count"], 3);
    Ok(())
}

#[tokio::test]
async fn payment_init_returns_the_client_secret() -> Result<()> {
    let app = spawn_app().await?;
    let (_, token) = app.signed_up_user("seller@example.com").await?;

    let invalid = app
        .post_json(
            "/api/ads/paymentInit",
            Some(&token),
            &json!({ "price": 0, "currency": "usd" }),
        )
        .await?;
    expect_error(invalid, 422, "A positive price and a currency are required.").await?;

    let response = app
        .post_json(
            "/api/ads/paymentInit",
            Some(&token),
            &json!({ "price": 5000, "currency": "usd" }),
        )
        .await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["data"]["clientSecret"], TEST_CLIENT_SECRET);
    Ok(())
}

#[tokio::test]
async fn payment_init_without_a_gateway_is_a_server_error() -> Result<()> {
    let app = spawn_app_with(test_config(), false).await?;
    let (_, token) = app.signed_up_user("seller@example.com").await?;

    let response = app
        .post_json(
            "/api/ads/paymentInit",
            Some(&token),
            &json!({ "price": 5000, "currency": "usd" }),
        )
        .await?;
    let body = expect_error(response, 500, "Payment provider is not configured.").await?;
    assert_eq!(body["message"], "The server encountered an unexpected error");
    Ok(())
}

#[tokio::test]
async fn ads_are_deleted_by_their_owner_only() -> Result<()> {
    let app = spawn_app().await?;
    let (_, seller) = app.signed_up_user("seller@example.com").await?;
    let (_, other) = app.signed_up_user("other@example.com").await?;

    let created = app
        .post_json("/api/ads", Some(&seller), &ad_input("Spring sale", 0, 7))
        .await?;
    let created: Value = created.json().await?;
    let id = created["data"]["ad"]["id"].as_str().unwrap();

    let denied = app.delete(&format!("/api/ads/{id}"), Some(&other)).await?;
    assert_eq!(denied.status(), 403);

    let deleted = app.delete(&format!("/api/ads/{id}"), Some(&seller)).await?;
    assert_eq!(deleted.status(), 200);

    let missing = app.delete(&format!("/api/ads/{id}"), Some(&seller)).await?;
    expect_error(missing, 404, "Advertisement not found.").await?;
    Ok(())
}
