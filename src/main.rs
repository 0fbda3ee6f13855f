use anyhow::{Context, Result};
use paddle_bridge::bridge::PaddleBridge;
use paddle_bridge::config::{AppConfig, ServerConfig};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("paddle-bridge exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => {
            init_tracing(&ServerConfig::default());
            return Err(error).context("loading configuration");
        }
    };
    init_tracing(&config.server);
    config.validate().context("validating configuration")?;
    info!(environment = ?config.server.environment, "Configuration loaded");

    let pool = config
        .database
        .connect()
        .await
        .context("connecting to PostgreSQL")?;
    info!("Postgres connection has been established");

    if config.database.run_migrations {
        sqlx::migrate!().run(&pool).await.context("running migrations")?;
        info!("Migrations applied");
    }

    let bridge = PaddleBridge::from_config(&config, pool)?.build()?;
    let app = bridge
        .router()
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Paddle bridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = log_filter(&server.log_level);

    if server.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(filter).init();
    }
}

/// Falls back to `info` when `directives` do not parse.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", error);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn default_log_level_parses() {
        let filter = log_filter(&ServerConfig::default().log_level);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn invalid_log_level_falls_back_to_info() {
        let filter = log_filter("paddle_bridge=loud");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
