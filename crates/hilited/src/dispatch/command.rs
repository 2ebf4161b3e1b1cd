//! Closed set of commands the dispatcher understands.

use std::fmt;

use super::errors::DispatchError;

/// Commands a peer may send, keyed by their wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `"clear peers"`: forget every peer registered under a protocol.
    ClearPeers,
    /// `"handshake"`: register a peer.
    Handshake,
    /// `"setviewerposition"`: move every viewer to a 5D position.
    SetViewerPosition,
    /// `"unsetviewerposition"`: drop the position marker set by
    /// [`CommandKind::SetViewerPosition`].
    UnsetViewerPosition,
    /// `"ilastikhilite"`: hilite or unhilite a single object.
    Hilite,
    /// `"goodbye"`: unregister a peer.
    Goodbye,
}

impl CommandKind {
    /// Every command, in registration order.
    pub const ALL: [Self; 6] = [
        Self::ClearPeers,
        Self::Handshake,
        Self::SetViewerPosition,
        Self::UnsetViewerPosition,
        Self::Hilite,
        Self::Goodbye,
    ];

    /// Resolves a wire name to a command.
    ///
    /// Names are matched exactly.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownCommand`] for unregistered names.
    pub fn parse(name: &str) -> Result<Self, DispatchError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| DispatchError::unknown_command(name))
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClearPeers => "clear peers",
            Self::Handshake => "handshake",
            Self::SetViewerPosition => "setviewerposition",
            Self::UnsetViewerPosition => "unsetviewerposition",
            Self::Hilite => "ilastikhilite",
            Self::Goodbye => "goodbye",
        }
    }

    /// Session management commands are never acknowledged.
    #[must_use]
    pub const fn is_session_management(self) -> bool {
        matches!(self, Self::Handshake | Self::Goodbye | Self::ClearPeers)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
