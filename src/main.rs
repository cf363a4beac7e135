// src/main.rs

use neurometric::config::Config;
use neurometric::error::AppError;
use neurometric::routes;
use neurometric::state::AppState;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment (.env is read if present)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("STARTUP FAILED: {}", e);
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if let Err(e) = run(config).await {
        tracing::error!("STARTUP FAILED: {}", e);
        eprintln!("STARTUP FAILED: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), AppError> {
    let pool = connect_with_retry(&config.database_url).await?;
    tracing::info!("History store connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    let bind_addr = config.bind_addr;
    let detect = config.language_detection;

    let state = AppState::initialize(config, pool).await?;

    // Fire and forget; the server answers with English until detection finishes.
    if detect {
        state.language.spawn_detection();
    } else {
        tracing::info!("Language detection disabled");
    }

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    // Start the server
    axum::serve(listener, app).await?;
    Ok(())
}

async fn connect_with_retry(database_url: &str) -> Result<SqlitePool, AppError> {
    let mut retry_count = 0;
    loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => return Ok(pool),
            Err(e) => {
                retry_count += 1;
                if retry_count > 3 {
                    return Err(AppError::Storage(format!(
                        "Failed to open history store after 3 retries: {}",
                        e
                    )));
                }
                tracing::warn!(
                    "History store not ready, retrying in 1s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
