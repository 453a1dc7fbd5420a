//! Roomcast server: room broadcast over WebSocket with presence tracking.
//!
//! Every text frame sent to `ws://<host>:<port>/<room_id>?username=<name>` is
//! persisted to the room's message log and broadcast to the other sessions in
//! the room. Users that stay silent longer than the inactivity threshold are
//! announced to the room and dropped from presence.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server
//! cargo run --bin roomcast-server -- --host 0.0.0.0 --port 3000 --threshold-seconds 120
//! ROOMCAST_REDIS_URL=redis://127.0.0.1:6379 cargo run --bin roomcast-server
//! ```

use std::sync::Arc;

use clap::Parser;

use roomcast_server::{
    config::{InactivityConfig, Timeouts},
    domain::{MessageLog, PresenceStore},
    infrastructure::{
        message_pusher::SessionRegistry,
        repository::{
            InMemoryMessageLog, InMemoryPresenceStore, RedisMessageLog, RedisPresenceStore,
            redis_store,
        },
    },
    ui::Server,
    usecase::{ChatHistoryUseCase, InactivitySweeper, PresenceTracker, RoomCoordinator},
};
use roomcast_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};

#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "Room broadcast and presence server over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ROOMCAST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ROOMCAST_PORT", default_value = "8080")]
    port: u16,

    /// Seconds without activity before a user is announced as inactive
    #[arg(
        long,
        env = "ROOMCAST_THRESHOLD_SECONDS",
        default_value = "60",
        allow_negative_numbers = true
    )]
    threshold_seconds: i64,

    /// Seconds between two inactivity sweeps
    #[arg(
        long,
        env = "ROOMCAST_CHECK_INTERVAL_SECONDS",
        default_value = "10",
        allow_negative_numbers = true
    )]
    check_interval_seconds: i64,

    /// Timeout for message log / presence store calls (milliseconds)
    #[arg(long, env = "ROOMCAST_COLLABORATOR_TIMEOUT_MS", default_value = "2000")]
    collaborator_timeout_ms: u64,

    /// Timeout for a single send to one session (milliseconds)
    #[arg(long, env = "ROOMCAST_SEND_TIMEOUT_MS", default_value = "1000")]
    send_timeout_ms: u64,

    /// Redis URL for the message log and presence store (in-memory when omitted)
    #[arg(long, env = "ROOMCAST_REDIS_URL")]
    redis_url: Option<String>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "ROOMCAST_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Validate configuration before touching any collaborator
    let inactivity =
        match InactivityConfig::new(args.threshold_seconds, args.check_interval_seconds) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Invalid configuration: {}", e);
                std::process::exit(1);
            }
        };
    let timeouts = match Timeouts::from_millis(args.collaborator_timeout_ms, args.send_timeout_ms)
    {
        Ok(timeouts) => timeouts,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Clock and collaborators (message log, presence store)
    // 2. Session registry
    // 3. UseCases
    // 4. Sweeper task
    // 5. Server

    // 1. Clock and collaborators
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let message_log: Arc<dyn MessageLog>;
    let presence_store: Arc<dyn PresenceStore>;
    match &args.redis_url {
        Some(url) => {
            let conn = match redis_store::connect(url).await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!("Failed to connect to Redis: {}", e);
                    std::process::exit(1);
                }
            };
            message_log = Arc::new(RedisMessageLog::new(conn.clone()));
            presence_store = Arc::new(RedisPresenceStore::new(conn));
        }
        None => {
            tracing::info!("No Redis URL given, using in-memory message log and presence store");
            message_log = Arc::new(InMemoryMessageLog::new(clock.clone()));
            presence_store = Arc::new(InMemoryPresenceStore::new());
        }
    }

    // 2. Session registry
    let registry = Arc::new(SessionRegistry::new(timeouts.send));

    // 3. UseCases
    let presence = Arc::new(PresenceTracker::new(
        presence_store,
        clock.clone(),
        timeouts.collaborator,
    ));
    let coordinator = Arc::new(RoomCoordinator::new(
        registry.clone(),
        presence.clone(),
        message_log.clone(),
        clock.clone(),
        timeouts.collaborator,
    ));
    let chat_history_usecase = Arc::new(ChatHistoryUseCase::new(
        message_log,
        timeouts.collaborator,
    ));

    // 4. Sweeper task
    let sweeper = Arc::new(InactivitySweeper::new(registry, presence, clock, inactivity));
    let sweeper_handle = sweeper.spawn();

    // 5. Server
    let server = Server::new(coordinator, chat_history_usecase);
    let result = server.run(args.host, args.port).await;
    sweeper_handle.abort();

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
