mod common;

use chrono::Duration;
use common::refresh_cookie;
use common::refresh_set_cookie;
use common::TestApp;
use common::SESSION_CAP;
use identity_service::domain::event::models::AuthEventType;
use reqwest::StatusCode;

#[tokio::test]
async fn test_session_cap_evicts_oldest() {
    let app = TestApp::spawn().await;
    app.create_user("alice", true).await;

    let mut refresh_tokens = Vec::new();
    for _ in 0..=SESSION_CAP {
        let (_, refresh) = app.login_tokens("alice").await;
        refresh_tokens.push(refresh);
        app.clock.advance(Duration::seconds(1));
    }

    let (bearer, _) = app.login_tokens("alice").await;
    let response = app
        .get_authenticated("/api/auth/sessions", &bearer)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"].as_array().unwrap().len(), SESSION_CAP);

    // The two oldest were pushed out by the last two logins
    for evicted in &refresh_tokens[..2] {
        let response = app
            .post_with_cookie("/api/auth/refresh", evicted)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .post_with_cookie("/api/auth/refresh", &refresh_tokens[SESSION_CAP])
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let app = TestApp::spawn().await;
    app.create_user("alice", true).await;
    let (_, refresh) = app.login_tokens("alice").await;

    let response = app
        .post_with_cookie("/api/auth/refresh", &refresh)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = refresh_cookie(&response).expect("Missing refresh cookie");
    assert_ne!(rotated, refresh);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let bearer = body["data"]["token"].as_str().unwrap().to_string();

    // The presented token is spent
    let response = app
        .post_with_cookie("/api/auth/refresh", &refresh)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(refresh_set_cookie(&response).is_none());

    let response = app
        .get_authenticated("/api/auth/principal", &bearer)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_or_with_garbage_cookie() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/refresh")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_with_cookie("/api/auth/refresh", "not-a-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Unauthorized");
}

#[tokio::test]
async fn test_refresh_token_expires() {
    let app = TestApp::spawn().await;
    app.create_user("alice", true).await;
    let (_, refresh) = app.login_tokens("alice").await;

    app.clock.advance(Duration::minutes(31));

    let response = app
        .post_with_cookie("/api/auth/refresh", &refresh)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_expires() {
    let app = TestApp::spawn().await;
    app.create_user("alice", true).await;
    let (bearer, _) = app.login_tokens("alice").await;

    app.clock.advance(Duration::minutes(6));

    let response = app
        .get_authenticated("/api/auth/sessions", &bearer)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("alice", true).await;
    let (_, refresh) = app.login_tokens("alice").await;

    let response = app
        .post_with_cookie("/api/auth/logout", &refresh)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let removal = refresh_set_cookie(&response).expect("Missing removal cookie");
    assert!(removal.contains("Max-Age=0"));

    let response = app
        .post_with_cookie("/api/auth/refresh", &refresh)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let logout = app.store.events().await.pop().unwrap();
    assert_eq!(logout.event_type, AuthEventType::Logout);
    assert_eq!(logout.owner_user_id, Some(user_id));
}

#[tokio::test]
async fn test_logout_always_succeeds() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/logout")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .post_with_cookie("/api/auth/logout", "unknown-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.store.events().await.is_empty());
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let app = TestApp::spawn().await;
    let user_id = app.create_user("alice", true).await;
    let (_, first) = app.login_tokens("alice").await;
    let (bearer, second) = app.login_tokens("alice").await;

    let response = app
        .post_authenticated("/api/auth/logout-all", &bearer)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for refresh in [first, second] {
        let response = app
            .post_with_cookie("/api/auth/refresh", &refresh)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let event = app.store.events().await.pop().unwrap();
    assert_eq!(event.event_type, AuthEventType::LogoutAll);
    assert_eq!(event.owner_user_id, Some(user_id));

    // Bearer tokens stay valid until they expire
    let response = app
        .get_authenticated("/api/auth/sessions", &bearer)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_all_requires_bearer() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/logout-all")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
