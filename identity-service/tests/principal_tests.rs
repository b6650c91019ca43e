mod common;

use chrono::Duration;
use common::TestApp;
use reqwest::StatusCode;

const API_KEY: &str = "ak_live_2f1c9e7d4b";

#[tokio::test]
async fn test_principal_with_api_key() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("service-account", true).await;
    app.create_api_key(&user_id, API_KEY, None).await;

    let response = app
        .get("/api/auth/principal")
        .header("API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user_id"], user_id.to_string());
    assert_eq!(body["data"]["scheme"], "api_key");
}

#[tokio::test]
async fn test_principal_with_unknown_api_key() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/principal")
        .header("API-Key", "not-a-key")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_principal_with_expired_api_key() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("service-account", true).await;
    let expires_at = app.clock_now() + Duration::days(1);
    app.create_api_key(&user_id, API_KEY, Some(expires_at)).await;

    let response = app
        .get("/api/auth/principal")
        .header("API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    app.clock.advance(Duration::days(1));

    let response = app
        .get("/api/auth/principal")
        .header("API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_principal_with_api_key_of_removed_owner() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("service-account", true).await;
    app.create_api_key(&user_id, API_KEY, None).await;
    app.store.remove_user(&user_id).await;

    let response = app
        .get("/api/auth/principal")
        .header("API-Key", API_KEY)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_principal_falls_back_to_bearer() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("alice", true).await;
    let (bearer, _) = app.login_tokens("alice").await;

    let response = app
        .get_authenticated("/api/auth/principal", &bearer)
        .header("API-Key", "not-a-key")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user_id"], user_id.to_string());
    assert_eq!(body["data"]["scheme"], "bearer");
}

#[tokio::test]
async fn test_principal_rejects_refresh_token_as_bearer() {
    let app = TestApp::spawn().await;
    app.create_user("alice", true).await;
    let (_, refresh) = app.login_tokens("alice").await;

    let response = app
        .get_authenticated("/api/auth/principal", &refresh)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_principal_without_credentials() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/principal")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 401);
    assert_eq!(body["data"]["message"], "Unauthorized");
}
