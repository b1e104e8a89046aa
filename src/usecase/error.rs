//! Request-scoped handler errors.
//!
//! Every variant's display string is sent back to the originating client as
//! the payload of an `error` message. Nothing here is fatal: errors never
//! reach other room members and never terminate the connection.

use thiserror::Error;

use crate::domain::{MessagePushError, RegistryError, TreeError, ValidationError};

/// Error produced while executing a request handler
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Push(#[from] MessagePushError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A resolver slot expected by the handler was empty
    #[error("Room doesn't exist")]
    MissingRoom,

    /// The event did not carry the node path the handler needs
    #[error("Node doesn't exist")]
    MissingPath,
}
