use std::net::SocketAddr;
use std::sync::Arc;

use identity_service::config::Config;
use identity_service::domain::api_key::authorizer::ApiKeyAuthorizer;
use identity_service::domain::api_key::ports::ApiKeyAuthorizerPort;
use identity_service::domain::authentication::ports::AuthenticationServicePort;
use identity_service::domain::authentication::service::AuthenticationService;
use identity_service::domain::clock::Clock;
use identity_service::domain::clock::SystemClock;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::HttpSettings;
use identity_service::outbound::repositories::InMemoryStore;
use identity_service::outbound::repositories::PostgresApiKeyRepository;
use identity_service::outbound::repositories::PostgresAuthEventRepository;
use identity_service::outbound::repositories::PostgresSessionRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        persistence = if config.database.is_some() { "postgresql" } else { "memory" },
        concurrent_sessions = config.jwt.concurrent_sessions,
        "Configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (auth_service, api_key_authorizer): (
        Arc<dyn AuthenticationServicePort>,
        Arc<dyn ApiKeyAuthorizerPort>,
    ) = match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await?;
            tracing::info!(
                max_connections = database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
            let session_repository = Arc::new(PostgresSessionRepository::new(pg_pool.clone()));
            let event_repository = Arc::new(PostgresAuthEventRepository::new(pg_pool.clone()));
            let api_key_repository = Arc::new(PostgresApiKeyRepository::new(pg_pool));

            let auth_service: Arc<dyn AuthenticationServicePort> =
                Arc::new(AuthenticationService::from_config(
                    &config,
                    Arc::clone(&user_repository),
                    session_repository,
                    event_repository,
                    Arc::clone(&clock),
                )?);
            let api_key_authorizer: Arc<dyn ApiKeyAuthorizerPort> = Arc::new(
                ApiKeyAuthorizer::new(api_key_repository, user_repository, Arc::clone(&clock)),
            );

            (auth_service, api_key_authorizer)
        }
        None => {
            tracing::warn!("No database configured, using the in-memory store");
            let store = Arc::new(InMemoryStore::new());

            let auth_service: Arc<dyn AuthenticationServicePort> =
                Arc::new(AuthenticationService::from_config(
                    &config,
                    Arc::clone(&store),
                    Arc::clone(&store),
                    Arc::clone(&store),
                    Arc::clone(&clock),
                )?);
            let api_key_authorizer: Arc<dyn ApiKeyAuthorizerPort> = Arc::new(
                ApiKeyAuthorizer::new(Arc::clone(&store), store, Arc::clone(&clock)),
            );

            (auth_service, api_key_authorizer)
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        auth_service,
        api_key_authorizer,
        HttpSettings::from_config(&config),
    );

    axum::serve(
        http_listener,
        http_application.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}
