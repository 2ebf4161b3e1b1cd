//! Daemon bootstrap: configuration, telemetry and collaborator wiring.

use std::net::SocketAddr;
use std::sync::Arc;

use hilite_config::Config;
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use crate::dispatch::{CommandProcessor, DispatchConnectionHandler, Facade, Receiver, Shell};
use crate::facade::PeerRegistry;
use crate::health::HealthReporter;
use crate::shell::HeadlessShell;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that returns a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// A bootstrapped daemon: the processor wired to its collaborators and
/// connected to the inbound receiver.
pub struct Daemon {
    config: Config,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
    registry: Arc<PeerRegistry>,
    shell: Arc<HeadlessShell>,
    processor: Arc<CommandProcessor>,
    receiver: Arc<Receiver>,
}

impl Daemon {
    fn assemble(config: Config, telemetry: TelemetryHandle, reporter: Arc<dyn HealthReporter>) -> Self {
        let registry = Arc::new(PeerRegistry::new());
        let shell = Arc::new(
            config
                .session_timesteps()
                .map_or_else(HeadlessShell::new, HeadlessShell::with_session),
        );
        let processor = Arc::new(CommandProcessor::new());
        processor.bind(
            Arc::clone(&registry) as Arc<dyn Facade>,
            Some(Arc::clone(&shell) as Arc<dyn Shell>),
        );
        let receiver = Arc::new(Receiver::new());
        processor.connect(&receiver);
        Self {
            config,
            telemetry,
            reporter,
            registry,
            shell,
            processor,
            receiver,
        }
    }

    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Peer registry acting as the processor's facade.
    #[must_use]
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Headless shell bound to the processor.
    #[must_use]
    pub fn shell(&self) -> &Arc<HeadlessShell> {
        &self.shell
    }

    /// The command processor.
    #[must_use]
    pub fn processor(&self) -> &Arc<CommandProcessor> {
        &self.processor
    }

    /// Receiver the transport delivers inbound messages to.
    #[must_use]
    pub fn receiver(&self) -> &Arc<Receiver> {
        &self.receiver
    }

    /// Binds the configured endpoint and starts accepting peer messages.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the socket cannot be bound or the
    /// accept loop cannot start.
    pub fn listen(&self) -> Result<Listening, ListenerError> {
        let endpoint = self.config.listen_socket();
        let listener = SocketListener::bind(endpoint)?;
        let local_addr = listener.local_addr();
        let handler = Arc::new(DispatchConnectionHandler::new(
            Arc::clone(&self.receiver),
            Arc::clone(&self.registry),
        ));
        let handle = listener.start(handler)?;
        self.reporter.listener_ready(endpoint);
        Ok(Listening {
            handle,
            local_addr,
            reporter: Arc::clone(&self.reporter),
            config: self.config.clone(),
        })
    }
}

/// A running listener. Dropping it stops the accept loop without waiting.
pub struct Listening {
    handle: ListenerHandle,
    local_addr: Option<SocketAddr>,
    reporter: Arc<dyn HealthReporter>,
    config: Config,
}

impl Listening {
    /// Bound TCP address; `None` for Unix sockets.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Stops the accept loop and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if the accept thread panicked.
    pub fn stop(self) -> Result<(), ListenerError> {
        let Self {
            handle,
            reporter,
            config,
            ..
        } = self;
        handle.shutdown();
        handle.join()?;
        reporter.listener_stopped(config.listen_socket());
        Ok(())
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration or telemetry fails; the
/// reporter is told before the error is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Daemon::assemble(config, telemetry, reporter))
}
