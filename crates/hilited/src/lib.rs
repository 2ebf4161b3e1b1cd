//! The hilite command daemon.
//!
//! Peer applications connect over a socket and send commands such as
//! `handshake`, `setviewerposition` or `ilastikhilite`. Each command is
//! decoded by the [`dispatch`] module and executed by a [`CommandProcessor`]
//! against two collaborators: a [`Facade`](dispatch::Facade) that tracks
//! peers and receives acknowledgements, and a [`Shell`](dispatch::Shell)
//! that owns the viewer session.
//!
//! The crate ships reference collaborators for both seams. [`PeerRegistry`]
//! keeps the registered peers and queues acknowledgements for the transport,
//! and [`HeadlessShell`] holds viewer state without a GUI. The binary wires
//! them together via [`bootstrap_with`] and serves until a termination signal
//! arrives.

mod bootstrap;
pub mod dispatch;
mod facade;
mod health;
mod process;
mod shell;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, Listening, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use dispatch::{CommandProcessor, Outcome, Receiver};
pub use facade::{Delivery, PeerRegistry};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    RunError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon, run_with,
};
pub use shell::HeadlessShell;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
