//! Error types for command dispatch.
//!
//! Two layers are kept apart. [`DispatchError`] covers failures that escape
//! [`crate::CommandProcessor::execute`] and reach the transport: unknown
//! commands and broken envelopes. [`HandlerError`] covers failures raised while
//! a resolved handler runs; the processor contains those and reports them to
//! the peer as a negative acknowledgement.

use std::io;

use hilite_protocol::ProtocolError;
use thiserror::Error;

use super::target::{FacadeError, SessionError};

/// Errors surfaced during request parsing and command dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered under the command name.
    #[error("command '{command}' is not available")]
    UnknownCommand { command: String },

    /// Request line could not be parsed as valid JSON.
    #[error("malformed JSONL: {message}")]
    MalformedJsonl {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Request JSON is not a command envelope.
    #[error("invalid request structure: {0}")]
    Envelope(#[from] ProtocolError),

    /// Request exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge { size: usize, max_size: usize },

    /// No dispatcher is connected to the receiver.
    #[error("no command processor is connected")]
    Disconnected,

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response serialization failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}

impl DispatchError {
    /// Returns the exit status reported to the peer for this error.
    ///
    /// Protocol violations return status 1. Infrastructure failures return
    /// status 2.
    pub fn exit_status(&self) -> i32 {
        match self {
            Self::UnknownCommand { .. }
            | Self::MalformedJsonl { .. }
            | Self::Envelope(_)
            | Self::RequestTooLarge { .. } => 1,
            Self::Disconnected | Self::Io(_) | Self::SerializeResponse(_) => 2,
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates a malformed JSONL error from a serde error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedJsonl {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed JSONL error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedJsonl {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }
}

/// Failures raised by a command handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The payload does not decode into the handler's arguments.
    #[error("invalid arguments for '{command}': {message}")]
    InvalidArguments { command: String, message: String },

    /// The `method` field of a hilite request names no known method.
    #[error("method '{method}' is not supported")]
    UnknownMethod { method: String },

    /// No facade is bound to the processor.
    #[error("no transport facade is bound")]
    FacadeUnbound,

    /// The shell rejected the request for a reason other than a missing
    /// session.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The facade rejected a session management request.
    #[error(transparent)]
    Facade(#[from] FacadeError),
}

impl HandlerError {
    /// Creates an invalid arguments error.
    pub fn invalid_arguments(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown method error.
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }
}
