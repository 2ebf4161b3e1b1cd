use camino::Utf8PathBuf;
#[cfg(unix)]
use std::env;

#[cfg(unix)]
use dirs::runtime_dir;
#[cfg(unix)]
use libc::geteuid;

use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// TCP port used when Unix domain sockets are not available.
pub const DEFAULT_TCP_PORT: u16 = 9997;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// File name of the daemon socket inside the runtime directory.
const SOCKET_FILE_NAME: &str = "hilited.sock";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value for serde and `ortho_config` defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Computes the default listening endpoint for the daemon.
///
/// On Unix this is `$XDG_RUNTIME_DIR/hilite/hilited.sock`, falling back to a
/// per-user directory under the temporary directory. Elsewhere the daemon
/// listens on loopback TCP.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    default_socket_endpoint_inner()
}

#[cfg(unix)]
fn default_socket_endpoint_inner() -> SocketEndpoint {
    let mut base = match runtime_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok()) {
        Some(dir) => dir.join("hilite"),
        None => fallback_base_directory().join("hilite").join(user_namespace()),
    };
    base.push(SOCKET_FILE_NAME);
    SocketEndpoint::unix(base)
}

#[cfg(unix)]
fn fallback_base_directory() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

#[cfg(unix)]
fn user_namespace() -> String {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    let uid = unsafe { geteuid() };
    format!("uid-{uid}")
}

#[cfg(not(unix))]
fn default_socket_endpoint_inner() -> SocketEndpoint {
    let _ = SOCKET_FILE_NAME;
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
}
