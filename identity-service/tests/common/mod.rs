#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use identity_service::config::ApiKeyConfig;
use identity_service::config::Config;
use identity_service::config::JwtConfig;
use identity_service::config::LoginAttemptsConfig;
use identity_service::config::PasswordConfig;
use identity_service::config::ServerConfig;
use identity_service::domain::api_key::authorizer::ApiKeyAuthorizer;
use identity_service::domain::api_key::models::ApiKey;
use identity_service::domain::api_key::models::ApiKeyId;
use identity_service::domain::authentication::ports::AuthenticationServicePort;
use identity_service::domain::authentication::service::AuthenticationService;
use identity_service::domain::clock::Clock;
use identity_service::domain::clock::ManualClock;
use identity_service::domain::user::models::ApiUser;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::models::API_USER_TYPE;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::HttpSettings;
use identity_service::outbound::repositories::InMemoryStore;
use serde_json::json;

pub const PASSWORD: &str = "Correct-Horse-9";
pub const COOKIE_NAME: &str = "refresh_token";
pub const SESSION_CAP: usize = 3;
pub const CLIENT_IP: &str = "203.0.113.10";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub auth_service: Arc<AuthenticationService<InMemoryStore, InMemoryStore, InMemoryStore>>,
    pub api_client: reqwest::Client,
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            http_port: 0,
            trust_forwarded_for: true,
        },
        database: None,
        jwt: JwtConfig {
            secret: "test-secret-key-for-jwt-signing-at-least-32-bytes".to_string(),
            issuer: "identity-service".to_string(),
            audience: "identity-clients".to_string(),
            cookie_name: COOKIE_NAME.to_string(),
            access_token_expiration_ms: 300_000,
            refresh_token_expiration_ms: 1_800_000,
            concurrent_sessions: SESSION_CAP,
            secure_cookie: true,
        },
        login_attempts: LoginAttemptsConfig {
            threshold: 5,
            window_ms: 900_000,
        },
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
            ..PasswordConfig::default()
        },
        api_key: ApiKeyConfig::default(),
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let config = test_config();

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::default());

        let auth_service = Arc::new(
            AuthenticationService::from_config(
                &config,
                store.clone(),
                store.clone(),
                store.clone(),
                clock.clone(),
            )
            .expect("Failed to build authentication service"),
        );
        let api_key_authorizer = Arc::new(ApiKeyAuthorizer::new(
            store.clone(),
            store.clone(),
            clock.clone(),
        ));

        let router = create_router(
            auth_service.clone(),
            api_key_authorizer,
            HttpSettings::from_config(&config),
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            address,
            store,
            clock,
            auth_service,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
        }
    }

    /// Store a user whose password satisfies the password policy
    pub async fn create_user(&self, login: &str, is_active: bool) -> UserId {
        let user = ApiUser {
            id: UserId::new(),
            login: login.to_string(),
            password_hash: self
                .auth_service
                .generate_password_hash(PASSWORD)
                .expect("Failed to hash password"),
            is_active,
        };
        let id = user.id;
        self.store.add_user(user).await;
        id
    }

    /// Store an API key for a user; `key` is the presented plain text
    pub async fn create_api_key(
        &self,
        owner: &UserId,
        key: &str,
        expired_at: Option<DateTime<Utc>>,
    ) {
        self.store
            .add_api_key(ApiKey {
                id: ApiKeyId::new(),
                owner_id: owner.0,
                owner_type: API_USER_TYPE.to_string(),
                key_hash: auth::KeyHasher::new().hash(key),
                expired_at,
                created_at: self.clock_now(),
            })
            .await;
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .get(&format!("{}{}", self.address, path))
            .header("X-Forwarded-For", CLIENT_IP)
            .header("User-Agent", "integration-tests")
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client
            .post(&format!("{}{}", self.address, path))
            .header("X-Forwarded-For", CLIENT_IP)
            .header("User-Agent", "integration-tests")
    }

    /// Helper to make POST request carrying the refresh cookie
    pub fn post_with_cookie(&self, path: &str, refresh_token: &str) -> reqwest::RequestBuilder {
        self.post(path)
            .header("Cookie", format!("{}={}", COOKIE_NAME, refresh_token))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub async fn login(&self, login: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&json!({
                "login": login,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in with the test password and return (bearer, refresh) tokens
    pub async fn login_tokens(&self, login: &str) -> (String, String) {
        let response = self.login(login, PASSWORD).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let refresh = refresh_cookie(&response).expect("Missing refresh cookie");
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        let bearer = body["data"]["token"]
            .as_str()
            .expect("Missing bearer token")
            .to_string();

        (bearer, refresh)
    }
}

/// Raw `Set-Cookie` header for the refresh cookie, if any
pub fn refresh_set_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{}=", COOKIE_NAME)))
        .map(str::to_string)
}

/// Value of the refresh cookie set by a response, if any
pub fn refresh_cookie(response: &reqwest::Response) -> Option<String> {
    refresh_set_cookie(response).and_then(|header| {
        header
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    })
}
