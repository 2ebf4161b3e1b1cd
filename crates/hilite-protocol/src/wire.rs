//! JSONL envelopes exchanged between peers and the dispatch daemon.
//!
//! A peer sends one JSON object per line. The `command` field names the
//! command; every other field is handler-specific payload:
//!
//! ```json
//! {"command":"setviewerposition","protocol":"knime","t":0,"x":1,"y":2,"z":3,"c":0}
//! ```
//!
//! The daemon answers with [`ServerMessage`] lines and always finishes with an
//! `exit` line:
//!
//! ```json
//! {"kind":"ack","protocol":"knime","data":{"command":"setviewerposition","t":0},"success":true}
//! {"kind":"exit","status":0}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProtocolError;

/// Keyword payload of a command, decoded verbatim from the wire.
pub type Payload = Map<String, Value>;

/// Name of the field carrying the command name.
pub const COMMAND_FIELD: &str = "command";

/// Name of the field carrying the peer protocol identifier.
pub const PROTOCOL_FIELD: &str = "protocol";

/// A decoded inbound message: command name plus remaining payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Command name as sent by the peer.
    pub command: String,
    /// Remaining fields, passed to the command handler.
    pub data: Payload,
}

impl InboundMessage {
    /// Builds a message from its parts.
    #[must_use]
    pub fn new(command: impl Into<String>, data: Payload) -> Self {
        Self {
            command: command.into(),
            data,
        }
    }

    /// Splits the `command` field out of a decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedEnvelope`] if the value is not an
    /// object or lacks a string `command` field.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(mut data) = value else {
            return Err(ProtocolError::malformed_envelope("message is not an object"));
        };
        match data.remove(COMMAND_FIELD) {
            Some(Value::String(command)) => Ok(Self { command, data }),
            Some(_) => Err(ProtocolError::malformed_envelope(
                "command field is not a string",
            )),
            None => Err(ProtocolError::malformed_envelope("command field is missing")),
        }
    }

    /// Returns the peer protocol identifier, when present.
    #[must_use]
    pub fn protocol(&self) -> Option<&str> {
        self.data.get(PROTOCOL_FIELD).and_then(Value::as_str)
    }
}

/// Outcome of a handled command, reported back to the peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Protocol identifier of the peer that sent the command.
    pub protocol: Option<String>,
    /// Original payload with the `command` field merged back in.
    pub data: Payload,
    /// Whether the handler completed without failure.
    pub success: bool,
}

/// Lines written by the daemon in response to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Acknowledgement of a handled command.
    Ack(Acknowledgement),
    /// Request could not be dispatched.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// Terminal message closing the response stream.
    Exit {
        /// Zero on dispatch, non-zero on failure.
        status: i32,
    },
}

impl ServerMessage {
    /// Creates an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Creates an exit message.
    #[must_use]
    pub const fn exit(status: i32) -> Self {
        Self::Exit { status }
    }
}
