//! Collaborative code-editing session library.
//!
//! This library provides the server and client implementations for a
//! WebSocket-based collaborative code editor: shared rooms, a synchronized
//! document tree and per-member cursor presence.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// client implementation
pub mod client;

// shared library
pub mod common;
