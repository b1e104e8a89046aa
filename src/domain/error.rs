//! Error types shared across the domain layer.

use thiserror::Error;

/// Validation errors raised by value-object constructors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier or name was empty
    #[error("identifier must not be empty")]
    Empty,

    /// Identifier or name exceeded the allowed length
    #[error("identifier is too long ({0} characters)")]
    TooLong(usize),

    /// Identifier contained a character outside the allowed set
    #[error("identifier contains an invalid character: '{0}'")]
    InvalidCharacter(char),

    /// Node name contained the reserved path separator
    #[error("node name must not contain '/': '{0}'")]
    ReservedSeparator(String),
}

/// Errors raised by the session registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The referenced room is not registered
    #[error("Room doesn't exist")]
    RoomNotFound,
}

/// Errors raised when pushing messages to clients
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessagePushError {
    /// No channel is registered for the client
    #[error("Client '{0}' is not connected")]
    ClientNotFound(String),

    /// A channel is already registered for the client
    #[error("Client '{0}' is already connected")]
    AlreadyRegistered(String),

    /// The underlying channel rejected the message
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
