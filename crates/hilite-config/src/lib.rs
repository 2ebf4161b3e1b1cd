//! Shared configuration for the hilite dispatch daemon.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a
//! `hilite.toml` configuration file, then `HILITE_*` environment variables,
//! then command-line flags, with later layers winning.

mod defaults;
mod logging;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TCP_PORT, default_log_filter, default_log_filter_string,
    default_log_format, default_socket_endpoint,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HILITE")]
pub struct Config {
    /// Endpoint the daemon listens on for peer messages.
    #[serde(default = "default_socket_endpoint")]
    #[ortho_config(default = default_socket_endpoint())]
    pub listen_socket: SocketEndpoint,
    /// `tracing` filter directive, for example `hilited=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the daemon log.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Number of timesteps of a session to preload into the headless shell.
    ///
    /// Left unset, the daemon starts without an active session and position
    /// or hilite commands are acknowledged as no-ops.
    #[serde(default)]
    pub session_timesteps: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_socket: default_socket_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            session_timesteps: None,
        }
    }
}

impl Config {
    /// Endpoint the daemon listens on.
    #[must_use]
    pub const fn listen_socket(&self) -> &SocketEndpoint {
        &self.listen_socket
    }

    /// Log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Number of timesteps to preload, if any.
    #[must_use]
    pub const fn session_timesteps(&self) -> Option<u32> {
        self.session_timesteps
    }
}
