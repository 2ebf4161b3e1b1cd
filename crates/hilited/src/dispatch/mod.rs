//! Command dispatch for inbound peer messages.
//!
//! Peers send one JSONL line per connection naming a command and carrying its
//! keyword payload:
//!
//! ```json
//! {"command":"ilastikhilite","protocol":"knime","t":0,"oid":17,"method":"hilite"}
//! ```
//!
//! The [`Receiver`] hands the decoded message to the connected
//! [`CommandProcessor`], which resolves the [`CommandKind`], decodes typed
//! arguments and runs the handler against the bound [`Facade`] and [`Shell`].
//! The response stream holds the acknowledgement, if any, and an exit line:
//!
//! ```json
//! {"kind":"ack","protocol":"knime","data":{"command":"ilastikhilite","protocol":"knime","t":0,"oid":17,"method":"hilite"},"success":true}
//! {"kind":"exit","status":0}
//! ```
//!
//! Unknown command names are protocol errors and end the stream with an
//! `error` line and exit status 1. Handler failures never do; they surface as
//! `success: false` in the acknowledgement.

mod arguments;
mod command;
mod connection;
mod errors;
mod handlers;
mod processor;
mod receiver;
mod response;
mod target;

pub use self::arguments::{
    ClearPeersArguments, HiliteArguments, HiliteMethod, PeerArguments, PositionArguments,
    UnsetPositionArguments,
};
pub use self::command::CommandKind;
pub(crate) use self::connection::DispatchConnectionHandler;
pub use self::errors::{DispatchError, HandlerError};
pub use self::processor::{CommandProcessor, Outcome};
pub use self::receiver::{CommandSink, Receiver};
pub use self::target::{
    ExecutionTarget, Facade, FacadeError, PeerAddress, SessionError, Shell, ViewerPosition,
};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
