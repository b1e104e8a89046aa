//! Interactive client for the collaborative code-editing session server.
//!
//! Connects with a unique client ID and maps REPL slash commands to protocol
//! events (/create, /join, /file, /edit, ...). Automatically reconnects on
//! disconnection (max 5 attempts with 5 second interval). Duplicate
//! client_id connections are rejected by the server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin client -- --client-id Alice
//! cargo run --bin client -- -c Bob -u ws://127.0.0.1:8080/ws
//! ```

use clap::Parser;

use kyodo_rs::common::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "client")]
#[command(about = "Interactive collaborative-session client with unique client ID", long_about = None)]
struct Args {
    /// Client ID identifying this participant (must be unique)
    #[arg(short = 'c', long)]
    client_id: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = kyodo_rs::client::run_client(args.url, args.client_id).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
