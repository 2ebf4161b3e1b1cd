//! Command processor: resolves a command name and runs its handler against
//! the bound execution target.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hilite_protocol::wire::{COMMAND_FIELD, PROTOCOL_FIELD, Payload};
use serde_json::Value;
use tracing::{debug, warn};

use super::DISPATCH_TARGET;
use super::command::CommandKind;
use super::errors::DispatchError;
use super::handlers;
use super::receiver::{CommandSink, Receiver};
use super::target::{ExecutionTarget, Facade, Shell};

/// Result of a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Command that was run.
    pub kind: CommandKind,
    /// Whether the handler completed without failure.
    pub success: bool,
    /// Whether an acknowledgement was handed to the facade.
    pub acknowledged: bool,
}

/// Dispatches inbound commands to their handlers.
///
/// The bound target sits behind a mutex that is held for the whole of an
/// [`execute`](Self::execute) call, so deliveries from concurrent connections
/// run one at a time and rebinding waits for the command in flight.
#[derive(Debug, Default)]
pub struct CommandProcessor {
    target: Mutex<ExecutionTarget>,
}

impl CommandProcessor {
    /// Creates a processor with nothing bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the facade and shell, replacing any previous binding.
    ///
    /// Pass `None` as the shell while no project is loaded.
    pub fn bind(&self, facade: Arc<dyn Facade>, shell: Option<Arc<dyn Shell>>) {
        *self.lock_target() = ExecutionTarget::new(facade, shell);
        debug!(target: DISPATCH_TARGET, "execution target bound");
    }

    /// Drops the bound shell and keeps the facade.
    pub fn unbind_shell(&self) {
        self.lock_target().clear_shell();
        debug!(target: DISPATCH_TARGET, "shell unbound");
    }

    /// Reports whether a facade is bound.
    pub fn is_bound(&self) -> bool {
        self.lock_target().facade().is_some()
    }

    /// Registers this processor as the sink of `receiver`.
    pub fn connect(self: &Arc<Self>, receiver: &Receiver) {
        receiver.connect(self.as_sink());
    }

    /// Unregisters this processor from `receiver`.
    ///
    /// Returns `false` when another sink, or none, was connected.
    pub fn disconnect(self: &Arc<Self>, receiver: &Receiver) -> bool {
        receiver.disconnect(&self.as_sink())
    }

    /// Runs the handler registered under `command`.
    ///
    /// Handler failures are contained: they are logged and reported to the
    /// peer as an acknowledgement with `success: false`. Every command except
    /// `handshake`, `goodbye` and `clear peers` is acknowledged through the
    /// facade, with the command name merged into the payload.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownCommand`] when no handler is registered
    /// under `command`. Nothing is acknowledged in that case.
    pub fn execute(&self, command: &str, data: Payload) -> Result<Outcome, DispatchError> {
        let kind = CommandKind::parse(command).inspect_err(|error| {
            warn!(target: DISPATCH_TARGET, %error, "rejected command");
        })?;
        let target = self.lock_target();
        debug!(target: DISPATCH_TARGET, command = %kind, "dispatching command");

        let success = match handlers::run(kind, &target, &data) {
            Ok(()) => true,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, command = %kind, %error, "command handler failed");
                false
            }
        };

        let acknowledged =
            !kind.is_session_management() && acknowledge(&target, kind, data, success);
        Ok(Outcome {
            kind,
            success,
            acknowledged,
        })
    }

    fn lock_target(&self) -> MutexGuard<'_, ExecutionTarget> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn as_sink(self: &Arc<Self>) -> Arc<dyn CommandSink> {
        Arc::clone(self) as Arc<dyn CommandSink>
    }
}

impl CommandSink for CommandProcessor {
    fn deliver(&self, command: &str, data: Payload) -> Result<Outcome, DispatchError> {
        self.execute(command, data)
    }
}

fn acknowledge(
    target: &ExecutionTarget,
    kind: CommandKind,
    mut data: Payload,
    success: bool,
) -> bool {
    let Some(facade) = target.facade() else {
        warn!(target: DISPATCH_TARGET, command = %kind, "no facade bound; acknowledgement dropped");
        return false;
    };
    data.insert(
        String::from(COMMAND_FIELD),
        Value::String(String::from(kind.as_str())),
    );
    let protocol = data
        .get(PROTOCOL_FIELD)
        .and_then(Value::as_str)
        .map(String::from);
    facade.handled_command(protocol, data, success);
    true
}
