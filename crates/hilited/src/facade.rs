//! In-process peer registry implementing [`Facade`].
//!
//! Peers are grouped by protocol and keyed by name. Acknowledgements handed
//! over by the processor are queued until the transport drains them and
//! writes them back to the requesting connection.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use hilite_protocol::HiliteCommand;
use hilite_protocol::wire::{Acknowledgement, Payload};
use tracing::{debug, info};

use crate::dispatch::{Facade, FacadeError, PeerAddress};

const FACADE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::facade");

type Peers = BTreeMap<String, BTreeMap<String, Option<PeerAddress>>>;

#[derive(Debug, Default)]
struct RegistryState {
    peers: Peers,
    acknowledgements: Vec<Acknowledgement>,
}

/// A hilite command addressed to one registered peer.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Protocol the peer registered under.
    pub protocol: String,
    /// Peer name.
    pub peer: String,
    /// Address the peer announced, if any.
    pub address: Option<PeerAddress>,
    /// Command to send.
    pub command: HiliteCommand,
}

/// Registered peers plus the queue of pending acknowledgements.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    state: Mutex<RegistryState>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the peers registered under `protocol`, in name order.
    pub fn peers(&self, protocol: &str) -> Vec<String> {
        self.lock_state()
            .peers
            .get(protocol)
            .map(|peers| peers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Address announced by a registered peer.
    pub fn address(&self, protocol: &str, name: &str) -> Option<PeerAddress> {
        self.lock_state()
            .peers
            .get(protocol)
            .and_then(|peers| peers.get(name))
            .cloned()
            .flatten()
    }

    /// Reports whether any peer is registered.
    pub fn is_sending(&self) -> bool {
        self.lock_state()
            .peers
            .values()
            .any(|peers| !peers.is_empty())
    }

    /// Addresses `command` to every registered peer.
    pub fn broadcast(&self, command: &HiliteCommand) -> Vec<Delivery> {
        let state = self.lock_state();
        let deliveries: Vec<Delivery> = state
            .peers
            .iter()
            .flat_map(|(protocol, peers)| {
                peers.iter().map(move |(peer, address)| Delivery {
                    protocol: protocol.clone(),
                    peer: peer.clone(),
                    address: address.clone(),
                    command: command.clone(),
                })
            })
            .collect();
        debug!(
            target: FACADE_TARGET,
            mode = %command.mode,
            peers = deliveries.len(),
            "broadcasting hilite command"
        );
        deliveries
    }

    /// Removes and returns every queued acknowledgement.
    pub fn drain_acknowledgements(&self) -> Vec<Acknowledgement> {
        std::mem::take(&mut self.lock_state().acknowledgements)
    }

    fn lock_state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Facade for PeerRegistry {
    fn handshake(
        &self,
        protocol: &str,
        name: &str,
        address: Option<PeerAddress>,
    ) -> Result<(), FacadeError> {
        info!(
            target: FACADE_TARGET,
            protocol,
            peer = name,
            address = ?address,
            "peer registered"
        );
        self.lock_state()
            .peers
            .entry(protocol.to_owned())
            .or_default()
            .insert(name.to_owned(), address);
        Ok(())
    }

    fn goodbye(
        &self,
        protocol: &str,
        name: &str,
        _address: Option<PeerAddress>,
    ) -> Result<(), FacadeError> {
        let mut state = self.lock_state();
        let removed = state
            .peers
            .get_mut(protocol)
            .and_then(|peers| peers.remove(name));
        if removed.is_none() {
            return Err(FacadeError::UnknownPeer {
                protocol: protocol.to_owned(),
                name: name.to_owned(),
            });
        }
        if state.peers.get(protocol).is_some_and(BTreeMap::is_empty) {
            state.peers.remove(protocol);
        }
        info!(target: FACADE_TARGET, protocol, peer = name, "peer unregistered");
        Ok(())
    }

    fn clear_peers(&self, protocol: &str) -> Result<(), FacadeError> {
        let removed = self.lock_state().peers.remove(protocol);
        info!(
            target: FACADE_TARGET,
            protocol,
            count = removed.map_or(0, |peers| peers.len()),
            "peers cleared"
        );
        Ok(())
    }

    fn handled_command(&self, protocol: Option<String>, data: Payload, success: bool) {
        self.lock_state().acknowledgements.push(Acknowledgement {
            protocol,
            data,
            success,
        });
    }
}
