//! Inbound event source connecting the transport to a command processor.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hilite_protocol::wire::{InboundMessage, Payload};
use tracing::{debug, warn};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::processor::Outcome;

/// Consumer of decoded inbound commands.
pub trait CommandSink: Send + Sync {
    /// Handles one command.
    ///
    /// # Errors
    ///
    /// Returns dispatch-level failures such as an unknown command name.
    fn deliver(&self, command: &str, data: Payload) -> Result<Outcome, DispatchError>;
}

/// Forwards decoded messages to the single connected sink.
#[derive(Default)]
pub struct Receiver {
    sink: Mutex<Option<Arc<dyn CommandSink>>>,
}

impl Receiver {
    /// Creates a receiver with nothing connected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects `sink`, replacing any sink connected before.
    pub fn connect(&self, sink: Arc<dyn CommandSink>) {
        let mut slot = self.lock_sink();
        if slot.is_some() {
            warn!(target: DISPATCH_TARGET, "replacing connected command sink");
        }
        *slot = Some(sink);
        debug!(target: DISPATCH_TARGET, "command sink connected");
    }

    /// Disconnects `sink` if it is the one connected.
    pub fn disconnect(&self, sink: &Arc<dyn CommandSink>) -> bool {
        let mut slot = self.lock_sink();
        let connected = slot
            .as_ref()
            .is_some_and(|current| std::ptr::addr_eq(Arc::as_ptr(current), Arc::as_ptr(sink)));
        if connected {
            *slot = None;
            debug!(target: DISPATCH_TARGET, "command sink disconnected");
        }
        connected
    }

    /// Reports whether a sink is connected.
    pub fn is_connected(&self) -> bool {
        self.lock_sink().is_some()
    }

    /// Delivers `message` to the connected sink.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Disconnected`] when nothing is connected, or
    /// whatever the sink reports.
    pub fn emit(&self, message: InboundMessage) -> Result<Outcome, DispatchError> {
        let sink = self
            .lock_sink()
            .as_ref()
            .map(Arc::clone)
            .ok_or(DispatchError::Disconnected)?;
        sink.deliver(&message.command, message.data)
    }

    fn lock_sink(&self) -> MutexGuard<'_, Option<Arc<dyn CommandSink>>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Receiver")
            .field("connected", &self.is_connected())
            .finish()
    }
}
