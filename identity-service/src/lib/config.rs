use std::env;

use auth::password::policy::DEFAULT_REQUIRED_PATTERNS;
use auth::HashCost;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::PasswordPolicy;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Minimum HS256 secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// No database section means the in-memory store is used.
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub login_attempts: LoginAttemptsConfig,
    #[serde(default)]
    pub password: PasswordConfig,
    #[serde(default)]
    pub api_key: ApiKeyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Take the client address from `X-Forwarded-For` when set.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Token signing and session options.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Bearer token lifetime in milliseconds.
    #[serde(default = "default_access_token_expiration_ms")]
    pub access_token_expiration_ms: i64,
    /// Refresh token lifetime in milliseconds.
    #[serde(default = "default_refresh_token_expiration_ms")]
    pub refresh_token_expiration_ms: i64,
    /// Live refresh sessions allowed per user.
    #[serde(default = "default_concurrent_sessions")]
    pub concurrent_sessions: usize,
    #[serde(default = "default_true")]
    pub secure_cookie: bool,
}

impl JwtConfig {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::milliseconds(self.access_token_expiration_ms)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::milliseconds(self.refresh_token_expiration_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoginAttemptsConfig {
    /// Failed logins tolerated inside the window.
    #[serde(default = "default_attempts_threshold")]
    pub threshold: u64,
    #[serde(default = "default_attempts_window_ms")]
    pub window_ms: i64,
}

impl LoginAttemptsConfig {
    pub fn window(&self) -> Duration {
        Duration::milliseconds(self.window_ms)
    }
}

impl Default for LoginAttemptsConfig {
    fn default() -> Self {
        Self {
            threshold: default_attempts_threshold(),
            window_ms: default_attempts_window_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_required_patterns")]
    pub required_patterns: Vec<String>,
}

impl PasswordConfig {
    pub fn cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }

    pub fn hasher(&self) -> Result<PasswordHasher, PasswordError> {
        PasswordHasher::with_cost(self.cost())
    }

    pub fn policy(&self) -> Result<PasswordPolicy, PasswordError> {
        PasswordPolicy::new(
            self.min_length,
            self.max_length,
            self.required_patterns.as_slice(),
        )
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let cost = HashCost::default();
        Self {
            memory_kib: cost.memory_kib,
            iterations: cost.iterations,
            parallelism: cost.parallelism,
            min_length: default_min_length(),
            max_length: default_max_length(),
            required_patterns: default_required_patterns(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiKeyConfig {
    #[serde(default = "default_api_key_header")]
    pub header: String,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            header: default_api_key_header(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_cookie_name() -> String {
    "refresh_token".to_string()
}

fn default_access_token_expiration_ms() -> i64 {
    300_000
}

fn default_refresh_token_expiration_ms() -> i64 {
    1_800_000
}

fn default_concurrent_sessions() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_attempts_threshold() -> u64 {
    5
}

fn default_attempts_window_ms() -> i64 {
    900_000
}

fn default_memory_kib() -> u32 {
    HashCost::default().memory_kib
}

fn default_iterations() -> u32 {
    HashCost::default().iterations
}

fn default_parallelism() -> u32 {
    HashCost::default().parallelism
}

fn default_min_length() -> usize {
    PasswordPolicy::DEFAULT_MIN_LENGTH
}

fn default_max_length() -> usize {
    PasswordPolicy::DEFAULT_MAX_LENGTH
}

fn default_required_patterns() -> Vec<String> {
    DEFAULT_REQUIRED_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

fn default_api_key_header() -> String {
    "API-Key".to_string()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        if self.jwt.access_token_expiration_ms <= 0 || self.jwt.refresh_token_expiration_ms <= 0 {
            return Err(ConfigError::Message(
                "token expirations must be positive".to_string(),
            ));
        }
        if self.jwt.concurrent_sessions == 0 {
            return Err(ConfigError::Message(
                "jwt.concurrent_sessions must be at least 1".to_string(),
            ));
        }
        if self.login_attempts.threshold == 0 || self.login_attempts.window_ms <= 0 {
            return Err(ConfigError::Message(
                "login_attempts threshold and window must be positive".to_string(),
            ));
        }
        if self.jwt.cookie_name.is_empty() || self.api_key.header.is_empty() {
            return Err(ConfigError::Message(
                "cookie and header names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
