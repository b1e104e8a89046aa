//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::domain::{MessagePusher, SessionRegistry};
use crate::usecase::EventDispatcher;

use super::handler::http::{debug_rooms, get_room_detail, get_rooms, health_check};
use super::handler::websocket::websocket_handler;
use super::signal::shutdown_signal;
use super::state::AppState;

/// Collaborative code-editing session server
///
/// Encapsulates the wired dependencies and runs the axum application.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(dispatcher, registry, pusher);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    dispatcher: Arc<EventDispatcher>,
    registry: Arc<dyn SessionRegistry>,
    pusher: Arc<dyn MessagePusher>,
}

impl Server {
    pub fn new(
        dispatcher: Arc<EventDispatcher>,
        registry: Arc<dyn SessionRegistry>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            dispatcher,
            registry,
            pusher,
        }
    }

    /// Run the session server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            dispatcher: self.dispatcher,
            registry: self.registry,
            pusher: self.pusher,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/debug/rooms", get(debug_rooms))
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Collaborative session server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
