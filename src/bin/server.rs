//! Collaborative code-editing session server.
//!
//! Accepts WebSocket connections, lets participants create and join rooms,
//! and synchronizes a shared document tree and cursor presence between the
//! members of each room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;

use kyodo_rs::{
    common::logger::setup_logger,
    infrastructure::{message_pusher::WebSocketMessagePusher, registry::InMemorySessionRegistry},
    ui::Server,
    usecase::{DocumentUseCase, EventDispatcher, PresenceUseCase, RoomSessionUseCase},
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Collaborative code-editing session server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. SessionRegistry
    // 2. MessagePusher
    // 3. UseCases
    // 4. Dispatcher
    // 5. Server

    // 1. Create SessionRegistry (in-memory room store)
    let registry = Arc::new(InMemorySessionRegistry::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let room_session = RoomSessionUseCase::new(registry.clone(), pusher.clone());
    let document = DocumentUseCase::new(pusher.clone());
    let presence = PresenceUseCase::new(pusher.clone());

    // 4. Create the Dispatcher binding event types to their handlers
    let dispatcher = Arc::new(EventDispatcher::new(
        registry.clone(),
        pusher.clone(),
        room_session,
        document,
        presence,
    ));

    // 5. Create and run the server
    let server = Server::new(dispatcher, registry, pusher);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
