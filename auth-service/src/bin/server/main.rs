use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::Authenticator;
use auth_service::config::Config;
use auth_service::config::StorageBackend;
use auth_service::config::StorageConfig;
use auth_service::domain::auth::ports::AuthServicePort;
use auth_service::domain::auth::ports::CredentialStore;
use auth_service::domain::auth::ports::SessionRegistry;
use auth_service::domain::auth::service::AuthService;
use auth_service::inbound::grpc::AuthGrpcService;
use auth_service::inbound::http::create_router;
use auth_service::inbound::http::SessionCookie;
use auth_service::inbound::sweeper::spawn_sweeper;
use auth_service::memory::InMemoryCredentialStore;
use auth_service::memory::InMemorySessionRegistry;
use auth_service::proto::auth_service_server::AuthServiceServer;
use auth_service::provisioning::seed_accounts;
use auth_service::repositories::PostgresCredentialStore;
use auth_service::repositories::PostgresSessionRegistry;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tonic::transport::Server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        backend = ?config.storage.backend,
        http_port = config.server.http_port,
        grpc_port = config.server.grpc_port,
        session_ttl_secs = config.session.ttl_secs,
        lockout_threshold = config.lockout.threshold,
        lockout_duration_secs = config.lockout.duration_secs,
        seeded_accounts = config.accounts.len(),
        "Configuration loaded"
    );

    let authenticator = Arc::new(Authenticator::new());

    let auth_service: Arc<dyn AuthServicePort> = match config.storage.backend {
        StorageBackend::Postgres => {
            let pg_pool = connect_postgres(&config.storage).await?;
            let credentials = Arc::new(PostgresCredentialStore::new(
                pg_pool.clone(),
                Arc::clone(&authenticator),
            ));
            let sessions = Arc::new(PostgresSessionRegistry::new(
                pg_pool,
                Arc::clone(&authenticator),
            ));
            build_service(&config, credentials, sessions).await?
        }
        StorageBackend::Memory => {
            tracing::warn!("In-memory storage selected, state is lost on restart");
            let credentials = Arc::new(InMemoryCredentialStore::new(Arc::clone(&authenticator)));
            let sessions = Arc::new(InMemorySessionRegistry::new(Arc::clone(&authenticator)));
            build_service(&config, credentials, sessions).await?
        }
    };

    let sweep_interval = Duration::from_secs(config.session.sweep_interval_secs.max(1));
    let _sweeper = spawn_sweeper(Arc::clone(&auth_service), sweep_interval);
    tracing::info!(
        interval_secs = sweep_interval.as_secs(),
        "Session sweeper started"
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let session_cookie = SessionCookie::new(
        config.session.ttl().num_seconds(),
        config.session.secure_cookie,
    );
    let http_application = create_router(Arc::clone(&auth_service), session_cookie);
    let http_server =
        tokio::spawn(async move { axum::serve(http_listener, http_application).await });

    let grpc_address = format!("0.0.0.0:{}", config.server.grpc_port).parse()?;
    let grpc_service = AuthGrpcService::new(Arc::clone(&auth_service));
    tracing::info!(
        address = %grpc_address,
        port = config.server.grpc_port,
        protocol = "grpc",
        "gRpc server listening"
    );

    let grpc_server = tokio::spawn(async move {
        Server::builder()
            .add_service(AuthServiceServer::new(grpc_service))
            .serve(grpc_address)
            .await
    });

    match tokio::try_join!(http_server, grpc_server) {
        Ok((_, _)) => tracing::info!("Servers exited successfully"),
        Err(e) => tracing::error!(error = %e, "Server error"),
    };

    Ok(())
}

async fn connect_postgres(storage: &StorageConfig) -> Result<PgPool, anyhow::Error> {
    let database_url = storage
        .database_url
        .as_deref()
        .context("storage.database_url is required for the postgres backend")?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(storage.max_connections)
        .connect(database_url)
        .await?;
    tracing::info!(
        max_connections = storage.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    Ok(pg_pool)
}

async fn build_service<CS, SR>(
    config: &Config,
    credentials: Arc<CS>,
    sessions: Arc<SR>,
) -> Result<Arc<dyn AuthServicePort>, anyhow::Error>
where
    CS: CredentialStore,
    SR: SessionRegistry,
{
    let provisioned = seed_accounts(credentials.as_ref(), &config.accounts).await?;
    tracing::info!(provisioned, "Account seeding completed");

    Ok(Arc::new(AuthService::new(
        credentials,
        sessions,
        config.lockout.policy(),
        config.session.ttl(),
    )))
}
