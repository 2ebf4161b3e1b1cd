//! Tests for the socket listener.

use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use hilite_config::SocketEndpoint;
use rstest::{fixture, rstest};

use super::listener::SocketListener;
use super::{ConnectionHandler, CountingHandler, ListenerError};

fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[fixture]
fn counting() -> (Arc<AtomicUsize>, Arc<dyn ConnectionHandler>) {
    let (count, handler) = CountingHandler::new();
    let handler: Arc<dyn ConnectionHandler> = handler;
    (count, handler)
}

#[rstest]
fn tcp_listener_hands_every_connection_to_the_handler(
    counting: (Arc<AtomicUsize>, Arc<dyn ConnectionHandler>),
) {
    let (count, handler) = counting;
    let listener =
        SocketListener::bind(&SocketEndpoint::tcp("127.0.0.1", 0)).expect("bind tcp listener");
    let addr = listener.local_addr().expect("tcp listener address");
    let handle = listener.start(handler).expect("start listener");

    for _ in 0..3 {
        TcpStream::connect(addr).expect("connect client");
    }

    assert!(wait_for_count(&count, 3), "expected three connections");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[cfg(unix)]
mod unix {
    use std::os::unix::net::{UnixListener, UnixStream};

    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn socket_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn endpoint(path: &std::path::Path) -> SocketEndpoint {
        SocketEndpoint::unix(path.to_str().expect("utf8 path"))
    }

    #[rstest]
    fn creates_missing_socket_directory(
        socket_dir: TempDir,
        counting: (Arc<AtomicUsize>, Arc<dyn ConnectionHandler>),
    ) {
        let (count, handler) = counting;
        let path = socket_dir.path().join("nested").join("hilited.sock");
        let listener = SocketListener::bind(&endpoint(&path)).expect("bind listener");
        assert!(listener.local_addr().is_none());
        let handle = listener.start(handler).expect("start listener");

        UnixStream::connect(&path).expect("connect unix client");
        assert!(wait_for_count(&count, 1), "expected one connection");

        handle.shutdown();
        handle.join().expect("join listener");
        assert!(!path.exists(), "socket file is removed on shutdown");
    }

    #[rstest]
    fn reclaims_stale_socket_files(
        socket_dir: TempDir,
        counting: (Arc<AtomicUsize>, Arc<dyn ConnectionHandler>),
    ) {
        let (_, handler) = counting;
        let path = socket_dir.path().join("hilited.sock");
        drop(UnixListener::bind(&path).expect("bind stale listener"));
        assert!(path.exists(), "stale socket should remain");

        let listener = SocketListener::bind(&endpoint(&path)).expect("bind over stale socket");
        let handle = listener.start(handler).expect("start listener");
        handle.shutdown();
        handle.join().expect("join listener");
    }

    #[rstest]
    fn rejects_socket_in_use(socket_dir: TempDir) {
        let path = socket_dir.path().join("hilited.sock");
        let _live = UnixListener::bind(&path).expect("bind live listener");

        let error = SocketListener::bind(&endpoint(&path)).expect_err("bind should fail");
        assert!(matches!(error, ListenerError::UnixInUse { .. }));
    }

    #[rstest]
    fn rejects_regular_file(socket_dir: TempDir) {
        let path = socket_dir.path().join("hilited.sock");
        std::fs::write(&path, b"not a socket").expect("write file");

        let error = SocketListener::bind(&endpoint(&path)).expect_err("bind should fail");
        assert!(matches!(error, ListenerError::UnixNotSocket { .. }));
    }
}
