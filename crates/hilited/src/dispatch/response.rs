//! JSONL response framing for the dispatch loop.

use std::io::Write;

use hilite_protocol::wire::{Acknowledgement, ServerMessage};

use super::errors::DispatchError;

/// Writer that serializes [`ServerMessage`] lines to a stream.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a message as a JSONL line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_message(&mut self, message: &ServerMessage) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Writes an acknowledgement line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_ack(&mut self, acknowledgement: Acknowledgement) -> Result<(), DispatchError> {
        self.write_message(&ServerMessage::Ack(acknowledgement))
    }

    /// Writes an exit message and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_exit(&mut self, status: i32) -> Result<(), DispatchError> {
        self.write_message(&ServerMessage::exit(status))?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes an error line followed by an exit line carrying the error's
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        self.write_message(&ServerMessage::error(error.to_string()))?;
        self.write_exit(error.exit_status())
    }
}
