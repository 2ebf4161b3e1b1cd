//! Error types for building and rendering hilite commands.

use thiserror::Error;

/// Errors raised by the [`crate::Protocol`] builder and renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Mode is not one of `hilite`, `unhilite`, `toggle` or `clear`.
    #[error("mode '{mode}' not supported")]
    InvalidMode {
        /// Mode as supplied by the caller.
        mode: String,
    },

    /// Command is not a hilite command and cannot be rendered.
    #[error("only hilite commands are supported, got '{command}'")]
    UnsupportedCommand {
        /// Value of the command's `command` field.
        command: String,
    },

    /// A non-clear command carries no `where` clause.
    #[error("{mode} command has no where clause")]
    MissingPredicate {
        /// Mode of the offending command.
        mode: String,
    },

    /// Inbound message does not have the shape of a command envelope.
    #[error("malformed command envelope: {message}")]
    MalformedEnvelope {
        /// Description of the structural problem.
        message: String,
    },
}

impl ProtocolError {
    /// Creates an invalid mode error.
    pub fn invalid_mode(mode: impl Into<String>) -> Self {
        Self::InvalidMode { mode: mode.into() }
    }

    /// Creates an unsupported command error.
    pub fn unsupported_command(command: impl Into<String>) -> Self {
        Self::UnsupportedCommand {
            command: command.into(),
        }
    }

    /// Creates a missing predicate error.
    pub fn missing_predicate(mode: impl Into<String>) -> Self {
        Self::MissingPredicate { mode: mode.into() }
    }

    /// Creates a malformed envelope error.
    pub fn malformed_envelope(message: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            message: message.into(),
        }
    }
}
