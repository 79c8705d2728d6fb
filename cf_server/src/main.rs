//! Connect Four matchmaking server.
//!
//! Pairs players over WebSocket, substitutes a bot after the grace period,
//! and records finished games.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Error;
use cf_server::{
    api,
    config::{ServerConfig, StorageConfig},
    logging, metrics,
};
use connect_four::{
    analytics::{ChannelEventPublisher, DEFAULT_EVENT_CAPACITY, RedisEventSink, run_log_sink},
    db::{Database, GameRepository, MemoryGameRepository},
};
use log::{info, warn};
use pico_args::Arguments;

const HELP: &str = "\
Run a Connect Four matchmaking server

USAGE:
  cf_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND, env PORT or 0.0.0.0:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --in-memory              Keep results in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  PORT                     Port to listen on when SERVER_BIND is unset
  DATABASE_URL             PostgreSQL connection string
  MATCH_GRACE_PERIOD_MS    Wait before pairing a lone player with a bot
  BOT_MOVE_DELAY_MS        Delay before the bot replies
  ANALYTICS_REDIS_URL      Redis URL for game events (logged only when unset)
  METRICS_BIND             Prometheus exporter address
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        in_memory: pargs.contains("--in-memory"),
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.in_memory)?;
    config.validate()?;

    info!("Starting Connect Four server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics available at http://{}/metrics", addr);
    }

    let repository: Arc<dyn GameRepository> = match &config.storage {
        StorageConfig::Postgres(db_config) => {
            let db = Database::new(db_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.ensure_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create schema: {}", e))?;
            info!("Database connected successfully");
            Arc::new(db.repository())
        }
        StorageConfig::InMemory => {
            warn!("Using in-memory storage; results are lost on restart");
            Arc::new(MemoryGameRepository::new())
        }
    };

    let (publisher, events) = ChannelEventPublisher::new(DEFAULT_EVENT_CAPACITY);
    match &config.analytics.redis_url {
        Some(url) => match RedisEventSink::connect(url, config.analytics.channel.clone()).await {
            Ok(sink) => {
                info!("Publishing game events to Redis channel {}", config.analytics.channel);
                tokio::spawn(sink.run(events));
            }
            Err(e) => {
                warn!("Redis unavailable ({}), logging game events instead", e);
                tokio::spawn(run_log_sink(events));
            }
        },
        None => {
            tokio::spawn(run_log_sink(events));
        }
    }

    let state = api::AppState::new(
        repository,
        Arc::new(publisher),
        config.matchmaking.clone(),
        config.leaderboard_limit,
    );
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
