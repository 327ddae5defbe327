mod common;

use anyhow::Result;
use serde_json::{json, Value};

use common::{expect_error, spawn_app};

#[tokio::test]
async fn lists_all_users_newest_first() -> Result<()> {
    let app = spawn_app().await?;
    app.signed_up_user("first@example.com").await?;
    app.signed_up_user("second@example.com").await?;

    let response = app.get("/api/users", None).await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    let users = body["data"]["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|user| user.get("password").is_none()));
    Ok(())
}

#[tokio::test]
async fn unknown_user_is_not_found() -> Result<()> {
    let app = spawn_app().await?;

    let response = app.get("/api/users/no-such-id", None).await?;
    let body = expect_error(response, 404, "User not found.").await?;
    assert_eq!(body["message"], "The requested resource was not found");
    Ok(())
}

#[tokio::test]
async fn owner_updates_own_profile() -> Result<()> {
    let app = spawn_app().await?;
    let (user, token) = app.signed_up_user("ada@example.com").await?;
    let id = user["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/users/{id}"),
            Some(&token),
            &json!({ "firstName": "Augusta", "gender": "female" }),
        )
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    let updated = &body["data"]["user"];
    assert_eq!(updated["firstName"], "Augusta");
    assert_eq!(updated["gender"], "female");
    assert!(updated["updatedAt"].is_string());
    // Email stays what it was even though the row was rewritten.
    assert_eq!(updated["email"], "ada@example.com");
    Ok(())
}

#[tokio::test]
async fn blank_names_are_rejected() -> Result<()> {
    let app = spawn_app().await?;
    let (user, token) = app.signed_up_user("ada@example.com").await?;
    let id = user["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/users/{id}"),
            Some(&token),
            &json!({ "firstName": "   " }),
        )
        .await?;
    expect_error(response, 422, "First name must not be empty.").await?;
    Ok(())
}

#[tokio::test]
async fn password_change_allows_login_with_the_new_one() -> Result<()> {
    let app = spawn_app().await?;
    let (user, token) = app.signed_up_user("ada@example.com").await?;
    let id = user["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/users/{id}"),
            Some(&token),
            &json!({ "password": "a brand new secret" }),
        )
        .await?;
    assert_eq!(response.status(), 200);

    let token = app.login("ada@example.com", "a brand new secret").await?;
    assert!(!token.is_empty());
    Ok(())
}

#[tokio::test]
async fn non_owner_may_not_update_or_delete() -> Result<()> {
    let app = spawn_app().await?;
    let (victim, _) = app.signed_up_user("victim@example.com").await?;
    let (_, intruder) = app.signed_up_user("intruder@example.com").await?;
    let id = victim["id"].as_str().unwrap();

    let update = app
        .put_json(
            &format!("/api/users/{id}"),
            Some(&intruder),
            &json!({ "firstName": "Hacked" }),
        )
        .await?;
    let body = expect_error(
        update,
        403,
        "You don't have permission to change other users' resources.",
    )
    .await?;
    assert_eq!(body["message"], "Access denied: insufficient permissions");

    let delete = app.delete(&format!("/api/users/{id}"), Some(&intruder)).await?;
    assert_eq!(delete.status(), 403);

    // The account is untouched.
    let fetched = app.get(&format!("/api/users/{id}"), None).await?;
    assert_eq!(fetched.status(), 200);
    Ok(())
}

#[tokio::test]
async fn role_changes_are_admin_only() -> Result<()> {
    let app = spawn_app().await?;
    let (user, token) = app.signed_up_user("ada@example.com").await?;
    let id = user["id"].as_str().unwrap();

    // Even on their own account a regular user may not self-promote.
    let response = app
        .put_json(
            &format!("/api/users/{id}"),
            Some(&token),
            &json!({ "role": "admin" }),
        )
        .await?;
    expect_error(response, 403, "Only administrators may change user roles.").await?;
    Ok(())
}

#[tokio::test]
async fn admin_may_update_any_account() -> Result<()> {
    let app = spawn_app().await?;
    let (user, _) = app.signed_up_user("ada@example.com").await?;
    app.signed_up_user("root@example.com").await?;
    app.promote_to_admin("root@example.com").await?;
    let admin = app.login("root@example.com", common::TEST_PASSWORD).await?;
    let id = user["id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/api/users/{id}"),
            Some(&admin),
            &json!({ "firstName": "Renamed", "role": "admin" }),
        )
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["data"]["user"]["firstName"], "Renamed");
    assert_eq!(body["data"]["user"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn owner_deletes_own_account() -> Result<()> {
    let app = spawn_app().await?;
    let (user, token) = app.signed_up_user("ada@example.com").await?;
    let id = user["id"].as_str().unwrap();

    let response = app.delete(&format!("/api/users/{id}"), Some(&token)).await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["customMessage"], "User deleted successfully.");

    let fetched = app.get(&format!("/api/users/{id}"), None).await?;
    assert_eq!(fetched.status(), 404);
    Ok(())
}
