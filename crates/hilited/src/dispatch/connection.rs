//! Connection handler that feeds JSONL requests to the receiver.
//!
//! A connection carries one request line. The line is decoded into an
//! [`InboundMessage`], delivered through the [`Receiver`], and answered with
//! the acknowledgements the facade queued for it followed by an exit line.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

use hilite_protocol::wire::{Acknowledgement, InboundMessage};
use serde_json::Value;
use tracing::{debug, warn};

use crate::facade::PeerRegistry;
use crate::transport::{ConnectionHandler, ConnectionStream};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::receiver::Receiver;
use super::response::ResponseWriter;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Dispatches one JSONL request per connection.
#[derive(Debug)]
pub(crate) struct DispatchConnectionHandler {
    receiver: Arc<Receiver>,
    registry: Arc<PeerRegistry>,
    /// Keeps a delivery and the drain of its acknowledgements together so
    /// concurrent connections never receive each other's acknowledgements.
    delivery: Mutex<()>,
}

impl DispatchConnectionHandler {
    pub(crate) fn new(receiver: Arc<Receiver>, registry: Arc<PeerRegistry>) -> Self {
        Self {
            receiver,
            registry,
            delivery: Mutex::new(()),
        }
    }

    fn dispatch(&self, mut stream: ConnectionStream) {
        let request = match read_request_line(&mut stream) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, "peer disconnected without request");
                return;
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "failed to read request");
                let _ = ResponseWriter::new(&mut stream).write_error(&error);
                return;
            }
        };

        let mut writer = ResponseWriter::new(&mut stream);
        let message = match parse_message(&request) {
            Ok(message) => message,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %error, "malformed request");
                let _ = writer.write_error(&error);
                return;
            }
        };

        let (result, acknowledgements) = {
            let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
            let result = self.receiver.emit(message);
            (result, self.registry.drain_acknowledgements())
        };

        let written = match result {
            Ok(outcome) => {
                debug!(
                    target: DISPATCH_TARGET,
                    command = %outcome.kind,
                    success = outcome.success,
                    "request dispatched"
                );
                write_acknowledged(&mut writer, acknowledgements)
            }
            Err(error) => writer.write_error(&error),
        };
        if let Err(error) = written {
            warn!(target: DISPATCH_TARGET, %error, "failed to write response");
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.dispatch(stream);
    }
}

fn write_acknowledged<W: Write>(
    writer: &mut ResponseWriter<W>,
    acknowledgements: Vec<Acknowledgement>,
) -> Result<(), DispatchError> {
    for acknowledgement in acknowledgements {
        writer.write_ack(acknowledgement)?;
    }
    writer.write_exit(0)
}

/// Decodes a request line into a command name and payload.
fn parse_message(line: &[u8]) -> Result<InboundMessage, DispatchError> {
    let trimmed = line.trim_ascii_end();
    if trimmed.is_empty() {
        return Err(DispatchError::malformed("empty request line"));
    }
    let value: Value = serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)?;
    Ok(InboundMessage::from_value(value)?)
}

/// Reads a bounded JSONL request line from the stream.
///
/// Returns `Ok(None)` if the peer disconnects without sending data, and the
/// bytes read so far if the stream ends before a newline.
fn read_request_line(stream: &mut ConnectionStream) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let bytes_read = read_with_retry(stream, &mut chunk)?;
        if bytes_read == 0 {
            return Ok((!buffer.is_empty()).then_some(buffer));
        }

        let received = &chunk[..bytes_read];
        let newline = received.iter().position(|byte| *byte == b'\n');
        let end = newline.map_or(bytes_read, |position| position + 1);
        buffer.extend_from_slice(&received[..end]);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(DispatchError::request_too_large(
                buffer.len(),
                MAX_REQUEST_BYTES,
            ));
        }
        if newline.is_some() {
            return Ok(Some(buffer));
        }
    }
}

fn read_with_retry(stream: &mut ConnectionStream, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}
