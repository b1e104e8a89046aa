//! UI layer: the axum server, its routes and connection handling.

pub mod handler;
mod server;
mod signal;
mod state;

pub use server::Server;
pub use state::AppState;
