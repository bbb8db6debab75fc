use newsnotes::{
    AppState,
    config::{AppConfig, Env, MEMORY_DB_URL},
    create_router,
    repository::{InMemoryRepository, PostgresRepository, RepositoryState},
    seed,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Initializes configuration, logging and storage, then serves HTTP until the process
/// is stopped.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise app debug logs plus request summaries.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "newsnotes=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Storage Initialization
    let repo: RepositoryState = if config.db_url == MEMORY_DB_URL {
        tracing::warn!("Using the in-memory repository; data is lost on exit.");
        Arc::new(InMemoryRepository::new())
    } else {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.db_url)
            .await
            .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

        let postgres = PostgresRepository::new(pool);
        postgres
            .migrate()
            .await
            .expect("FATAL: Failed to apply database migrations.");
        Arc::new(postgres)
    };

    // LOCAL-ONLY: demo content for a fresh database.
    if config.seed_demo {
        if let Err(e) = seed::seed_demo(repo.as_ref()).await {
            tracing::error!("Demo seeding failed: {}", e);
        }
    }

    // 5. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { repo, config });

    // 6. Server Startup
    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: cannot bind {bind_addr}: {e}"));

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("HTTP server stopped: {}", e);
    }
}
