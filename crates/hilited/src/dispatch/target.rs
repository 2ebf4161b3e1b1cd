//! Collaborators a command is executed against.
//!
//! The [`Facade`] is the transport/session side: it tracks peers and carries
//! acknowledgements back to them. The [`Shell`] is the application side: the
//! viewer position and the hilite set. Both are injected into the processor;
//! neither is a process-wide singleton.

use std::fmt;
use std::sync::Arc;

use hilite_protocol::wire::Payload;
use thiserror::Error;

/// Position in every viewer: time, the three spatial axes and channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ViewerPosition {
    pub t: i64,
    pub x: i64,
    pub y: i64,
    pub z: i64,
    pub c: i64,
}

impl ViewerPosition {
    /// Builds a position from its five coordinates.
    #[must_use]
    pub const fn new(t: i64, x: i64, y: i64, z: i64, c: i64) -> Self {
        Self { t, x, y, z, c }
    }

    /// Returns the coordinates in `[t, x, y, z, c]` order.
    #[must_use]
    pub const fn to_array(self) -> [i64; 5] {
        [self.t, self.x, self.y, self.z, self.c]
    }
}

/// Network address a peer announced during its handshake.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    /// Builds an address from host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.host, self.port)
    }
}

/// Reasons a shell refuses a position or hilite request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No project is loaded.
    #[error("no active session")]
    NoActiveSession,

    /// The request addresses a timestep the session does not have.
    #[error("timestep {index} is outside the session range 0..{timesteps}")]
    OutOfRange { index: i64, timesteps: u32 },

    /// The shell refused the request for another reason.
    #[error("shell rejected request: {message}")]
    Rejected { message: String },
}

impl SessionError {
    /// Creates a rejection with `message`.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Reports whether the shell could not resolve the requested index.
    ///
    /// Index errors are expected while nothing, or a shorter session, is
    /// loaded; dispatch treats them as a successful no-op.
    #[must_use]
    pub const fn is_index_error(&self) -> bool {
        matches!(self, Self::NoActiveSession | Self::OutOfRange { .. })
    }
}

/// Reasons a facade refuses a session management request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacadeError {
    /// No peer with this name is registered under the protocol.
    #[error("peer '{name}' is not registered for protocol '{protocol}'")]
    UnknownPeer { protocol: String, name: String },
}

/// Transport and session bookkeeping for remote peers.
pub trait Facade: Send + Sync {
    /// Registers a peer, optionally with the address it can be reached at.
    fn handshake(
        &self,
        protocol: &str,
        name: &str,
        address: Option<PeerAddress>,
    ) -> Result<(), FacadeError>;

    /// Unregisters a peer.
    fn goodbye(
        &self,
        protocol: &str,
        name: &str,
        address: Option<PeerAddress>,
    ) -> Result<(), FacadeError>;

    /// Unregisters every peer of a protocol.
    fn clear_peers(&self, protocol: &str) -> Result<(), FacadeError>;

    /// Reports the outcome of a handled command to the peer that sent it.
    fn handled_command(&self, protocol: Option<String>, data: Payload, success: bool);
}

/// Addressable application state: viewer position and hilite set.
///
/// Every mutator returns [`SessionError::NoActiveSession`] while no project is
/// loaded.
pub trait Shell: Send + Sync {
    /// Moves every viewer to `position` and marks it.
    fn set_all_viewers_position(&self, position: ViewerPosition) -> Result<(), SessionError>;

    /// Removes the marker at `position`; `keep` leaves the viewers where they
    /// are instead of returning them to the origin.
    fn unset_all_viewers_position(
        &self,
        position: ViewerPosition,
        keep: bool,
    ) -> Result<(), SessionError>;

    /// Hilites object `oid` of timestep `t`; `keep` preserves existing hilites.
    fn set_hilite(&self, t: i64, oid: i64, keep: bool) -> Result<(), SessionError>;

    /// Unhilites object `oid` of timestep `t`; without `keep` every hilite is
    /// dropped.
    fn unset_hilite(&self, t: i64, oid: i64, keep: bool) -> Result<(), SessionError>;
}

/// Collaborators currently bound to a processor.
#[derive(Clone, Default)]
pub struct ExecutionTarget {
    facade: Option<Arc<dyn Facade>>,
    shell: Option<Arc<dyn Shell>>,
}

impl ExecutionTarget {
    /// Builds a target from a facade and an optional shell.
    pub fn new(facade: Arc<dyn Facade>, shell: Option<Arc<dyn Shell>>) -> Self {
        Self {
            facade: Some(facade),
            shell,
        }
    }

    /// Bound facade, if any.
    pub fn facade(&self) -> Option<&dyn Facade> {
        self.facade.as_deref()
    }

    /// Bound shell, if any. `None` means no project is loaded.
    pub fn shell(&self) -> Option<&dyn Shell> {
        self.shell.as_deref()
    }

    pub(crate) fn clear_shell(&mut self) {
        self.shell = None;
    }
}

impl fmt::Debug for ExecutionTarget {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ExecutionTarget")
            .field("facade", &self.facade.is_some())
            .field("shell", &self.shell.is_some())
            .finish()
    }
}
