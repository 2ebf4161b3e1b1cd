//! Unit tests for bootstrap and process wiring.

use std::io;
use std::sync::Arc;

use hilite_config::SocketEndpoint;
use hilite_protocol::wire::{InboundMessage, Payload};
use rstest::{fixture, rstest};
use serde_json::json;

use crate::bootstrap::{BootstrapError, StaticConfigLoader, bootstrap_with};
use crate::dispatch::{CommandKind, ViewerPosition};
use crate::process::{RunError, ShutdownError, ShutdownSignal, run_with};

use super::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, TestConfigLoader,
};

/// Shutdown signal that returns immediately.
struct ImmediateShutdown;

impl ShutdownSignal for ImmediateShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        Ok(())
    }
}

/// Shutdown signal whose handler installation fails.
struct BrokenShutdown;

impl ShutdownSignal for BrokenShutdown {
    fn wait(&self) -> Result<(), ShutdownError> {
        Err(ShutdownError::Install {
            source: io::Error::other("signal handlers unavailable"),
        })
    }
}

#[fixture]
fn reporter() -> Arc<RecordingHealthReporter> {
    Arc::new(RecordingHealthReporter::default())
}

fn message(command: &str, fields: serde_json::Value) -> InboundMessage {
    let data: Payload = match fields {
        serde_json::Value::Object(map) => map,
        other => panic!("payload must be an object, got {other}"),
    };
    InboundMessage::new(command, data)
}

#[rstest]
fn bootstrap_reports_start_and_success(reporter: Arc<RecordingHealthReporter>) {
    let daemon =
        bootstrap_with(&TestConfigLoader::new(), reporter.clone()).expect("bootstrap succeeds");

    assert_eq!(
        reporter.events(),
        vec![HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
    assert!(daemon.processor().is_bound());
    assert!(daemon.receiver().is_connected());
    assert!(!daemon.shell().has_session());
}

#[rstest]
fn bootstrap_reports_configuration_failures(reporter: Arc<RecordingHealthReporter>) {
    let Err(error) = bootstrap_with(&FailingConfigLoader, reporter.clone()) else {
        panic!("bootstrap should fail");
    };

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    let events = reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::BootstrapStarting));
    assert!(matches!(events.last(), Some(HealthEvent::BootstrapFailed(_))));
}

#[rstest]
fn configured_session_is_preloaded_into_the_shell(reporter: Arc<RecordingHealthReporter>) {
    let daemon =
        bootstrap_with(&TestConfigLoader::with_session(5), reporter).expect("bootstrap succeeds");

    let outcome = daemon
        .receiver()
        .emit(message(
            "setviewerposition",
            json!({"protocol": "knime", "t": 2, "x": 10, "y": 20, "z": 0, "c": 1}),
        ))
        .expect("dispatch succeeds");

    assert_eq!(outcome.kind, CommandKind::SetViewerPosition);
    assert!(outcome.success);
    assert!(outcome.acknowledged);
    assert_eq!(
        daemon.shell().position(),
        Some(ViewerPosition::new(2, 10, 20, 0, 1))
    );
    let acknowledgements = daemon.registry().drain_acknowledgements();
    assert_eq!(acknowledgements.len(), 1);
    assert_eq!(acknowledgements[0].protocol.as_deref(), Some("knime"));
}

#[rstest]
fn handshake_through_the_receiver_registers_the_peer(reporter: Arc<RecordingHealthReporter>) {
    let daemon = bootstrap_with(&TestConfigLoader::new(), reporter).expect("bootstrap succeeds");

    let outcome = daemon
        .receiver()
        .emit(message(
            "handshake",
            json!({"protocol": "knime", "name": "workflow", "host": "localhost", "port": 9998}),
        ))
        .expect("dispatch succeeds");

    assert!(outcome.success);
    assert!(!outcome.acknowledged);
    assert_eq!(daemon.registry().peers("knime"), vec![String::from("workflow")]);
    assert!(daemon.registry().is_sending());
    assert!(daemon.registry().drain_acknowledgements().is_empty());
}

#[rstest]
fn listening_reports_ready_and_stopped(reporter: Arc<RecordingHealthReporter>) {
    let loader = StaticConfigLoader::new(hilite_config::Config {
        listen_socket: SocketEndpoint::tcp("127.0.0.1", 0),
        ..hilite_config::Config::default()
    });
    let daemon = bootstrap_with(&loader, reporter.clone()).expect("bootstrap succeeds");

    let listening = daemon.listen().expect("listener starts");
    assert!(listening.local_addr().is_some());
    listening.stop().expect("listener stops");

    let endpoint = SocketEndpoint::tcp("127.0.0.1", 0);
    let events = reporter.events();
    assert!(events.contains(&HealthEvent::ListenerReady(endpoint.clone())));
    assert_eq!(events.last(), Some(&HealthEvent::ListenerStopped(endpoint)));
}

#[rstest]
fn run_with_stops_the_listener_after_shutdown(reporter: Arc<RecordingHealthReporter>) {
    run_with(&TestConfigLoader::new(), reporter.clone(), &ImmediateShutdown)
        .expect("daemon runs to completion");

    assert!(matches!(
        reporter.events().last(),
        Some(HealthEvent::ListenerStopped(_))
    ));
}

#[rstest]
fn run_with_surfaces_shutdown_failures_after_stopping(reporter: Arc<RecordingHealthReporter>) {
    let error = run_with(&TestConfigLoader::new(), reporter.clone(), &BrokenShutdown)
        .expect_err("shutdown failure propagates");

    assert!(matches!(error, RunError::Shutdown { .. }));
    assert_eq!(error.exit_status(), 2);
    assert!(matches!(
        reporter.events().last(),
        Some(HealthEvent::ListenerStopped(_))
    ));
}

#[rstest]
fn run_with_surfaces_bootstrap_failures(reporter: Arc<RecordingHealthReporter>) {
    let error = run_with(&FailingConfigLoader, reporter, &ImmediateShutdown)
        .expect_err("bootstrap failure propagates");

    assert!(matches!(error, RunError::Bootstrap { .. }));
}
