//! Behavioural tests for command dispatch over the socket transport.

use std::cell::RefCell;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use hilite_protocol::wire::ServerMessage;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::{Daemon, Listening, bootstrap_with};

use super::support::{RecordingHealthReporter, TestConfigLoader};

#[derive(Default)]
struct DispatchWorld {
    daemon: Option<Daemon>,
    listening: Option<Listening>,
    responses: Vec<ServerMessage>,
}

impl DispatchWorld {
    fn start(&mut self, loader: &TestConfigLoader) {
        let reporter = Arc::new(RecordingHealthReporter::default());
        let daemon = bootstrap_with(loader, reporter).expect("bootstrap daemon");
        self.listening = Some(daemon.listen().expect("start listener"));
        self.daemon = Some(daemon);
    }

    fn daemon(&self) -> &Daemon {
        self.daemon.as_ref().expect("daemon started")
    }

    fn send_request(&mut self, request: &str) {
        let addr = self
            .listening
            .as_ref()
            .and_then(Listening::local_addr)
            .expect("listener address");
        let mut stream = TcpStream::connect(addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");

        stream.write_all(request.as_bytes()).expect("write request");
        stream.write_all(b"\n").expect("write newline");
        stream.flush().expect("flush");

        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let line = line.expect("read response line");
            self.responses
                .push(serde_json::from_str(&line).expect("decode server message"));
        }
    }

    fn acknowledgements(&self) -> Vec<bool> {
        self.responses
            .iter()
            .filter_map(|message| match message {
                ServerMessage::Ack(ack) => Some(ack.success),
                _ => None,
            })
            .collect()
    }
}

impl Drop for DispatchWorld {
    fn drop(&mut self) {
        if let Some(listening) = self.listening.take() {
            let _ = listening.stop();
        }
    }
}

#[fixture]
fn world() -> RefCell<DispatchWorld> {
    RefCell::new(DispatchWorld::default())
}

#[given("a daemon with a session of {timesteps} timesteps")]
fn given_daemon_with_session(world: &RefCell<DispatchWorld>, timesteps: u32) {
    world
        .borrow_mut()
        .start(&TestConfigLoader::with_session(timesteps));
}

#[given("a daemon without a session")]
fn given_daemon_without_session(world: &RefCell<DispatchWorld>) {
    world.borrow_mut().start(&TestConfigLoader::new());
}

#[when("a peer hilites object {oid} at time {t}")]
fn when_peer_hilites(world: &RefCell<DispatchWorld>, oid: i64, t: i64) {
    world.borrow_mut().send_request(&format!(
        r#"{{"command":"ilastikhilite","protocol":"knime","t":{t},"oid":{oid},"keep":false}}"#
    ));
}

#[when(r#"a peer handshakes as "{name}""#)]
fn when_peer_handshakes(world: &RefCell<DispatchWorld>, name: String) {
    let name = strip_quotes(&name);
    world.borrow_mut().send_request(&format!(
        r#"{{"command":"handshake","protocol":"knime","name":"{name}","host":"localhost","port":9998}}"#
    ));
}

#[when(r#"a peer sends the unknown command "{command}""#)]
fn when_unknown_command(world: &RefCell<DispatchWorld>, command: String) {
    let command = strip_quotes(&command);
    world
        .borrow_mut()
        .send_request(&format!(r#"{{"command":"{command}","protocol":"knime"}}"#));
}

#[when("a malformed JSONL request is sent")]
fn when_malformed_request(world: &RefCell<DispatchWorld>) {
    world.borrow_mut().send_request("not valid json");
}

#[then("the response includes a successful acknowledgement")]
fn then_successful_ack(world: &RefCell<DispatchWorld>) {
    assert_eq!(
        world.borrow().acknowledgements(),
        vec![true],
        "responses: {:?}",
        world.borrow().responses
    );
}

#[then("the response includes a failed acknowledgement")]
fn then_failed_ack(world: &RefCell<DispatchWorld>) {
    assert_eq!(
        world.borrow().acknowledgements(),
        vec![false],
        "responses: {:?}",
        world.borrow().responses
    );
}

#[then("the response holds no acknowledgement")]
fn then_no_ack(world: &RefCell<DispatchWorld>) {
    assert!(
        world.borrow().acknowledgements().is_empty(),
        "responses: {:?}",
        world.borrow().responses
    );
}

#[then("the response includes an exit message with status {status}")]
fn then_exit_status(world: &RefCell<DispatchWorld>, status: i32) {
    assert_eq!(
        world.borrow().responses.last(),
        Some(&ServerMessage::exit(status)),
        "responses: {:?}",
        world.borrow().responses
    );
}

#[then("the response includes an error message")]
fn then_error_message(world: &RefCell<DispatchWorld>) {
    assert!(
        world
            .borrow()
            .responses
            .iter()
            .any(|message| matches!(message, ServerMessage::Error { .. })),
        "responses: {:?}",
        world.borrow().responses
    );
}

#[then("the shell hilites object {oid} at time {t}")]
fn then_shell_hilites(world: &RefCell<DispatchWorld>, oid: i64, t: i64) {
    assert_eq!(world.borrow().daemon().shell().hilites(), vec![(t, oid)]);
}

#[then("the shell hilites nothing")]
fn then_shell_hilites_nothing(world: &RefCell<DispatchWorld>) {
    assert!(world.borrow().daemon().shell().hilites().is_empty());
}

#[then(r#"the peer "{name}" is registered"#)]
fn then_peer_registered(world: &RefCell<DispatchWorld>, name: String) {
    let name = strip_quotes(&name).to_owned();
    assert_eq!(world.borrow().daemon().registry().peers("knime"), vec![name]);
}

/// Strips surrounding double quotes from a string if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "A hilite command is applied and acknowledged"
)]
fn hilite_command_is_acknowledged(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "Without a session a hilite command is acknowledged as a no-op"
)]
fn hilite_without_session_is_a_no_op(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "An out of range timestep is acknowledged as a no-op"
)]
fn out_of_range_timestep_is_a_no_op(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "A negative object id is acknowledged as a failure"
)]
fn negative_object_id_fails(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "A handshake registers the peer without an acknowledgement"
)]
fn handshake_registers_peer(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "An unknown command is rejected"
)]
fn unknown_command_is_rejected(world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/command_dispatch.feature",
    name = "A malformed request is rejected"
)]
fn malformed_request_is_rejected(world: RefCell<DispatchWorld>) {
    drop(world);
}
