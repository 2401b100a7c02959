//! Connection management for the trivia server
//!
//! This module tracks every peer that has completed the connect handshake:
//! - Connection lifecycle (connect, disconnect, timeout)
//! - The connection id each peer is known by inside sessions
//! - Liveness monitoring through heartbeats and automatic cleanup
//! - Capacity management and address lookup for outgoing delivery
//!
//! Connection ids double as participant ids, so a session never needs to know
//! anything about socket addresses.

use log::info;
use shared::ParticipantId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connected peer
#[derive(Debug)]
pub struct Client {
    /// Connection id assigned by the server
    pub id: ParticipantId,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: ParticipantId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Records activity from this client
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Returns true if nothing was received from this client within `timeout`
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Manages all connected clients
///
/// Enforces the capacity limit, hands out connection ids and resolves ids back
/// to addresses when packets are delivered.
pub struct ClientManager {
    /// Connected clients indexed by their id
    clients: HashMap<ParticipantId, Client>,
    /// Next available id for new connections
    next_client_id: ParticipantId,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
    /// Silence after which a client counts as disconnected
    timeout: Duration,
}

impl ClientManager {
    /// Creates an empty manager. Ids start from 1.
    pub fn new(max_clients: usize, timeout: Duration) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
            timeout,
        }
    }

    /// Attempts to register a new connection
    ///
    /// Returns `None` if the server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<ParticipantId> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Removes a client. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: &ParticipantId) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!("Client {} disconnected", client.id);
            true
        } else {
            false
        }
    }

    /// Finds a client id by network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<ParticipantId> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Refreshes a client's liveness. Returns false for unknown ids.
    pub fn touch(&mut self, client_id: ParticipantId) -> bool {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.touch();
            true
        } else {
            false
        }
    }

    pub fn addr_of(&self, client_id: ParticipantId) -> Option<SocketAddr> {
        self.clients.get(&client_id).map(|client| client.addr)
    }

    /// Addresses of the given clients, skipping any that are no longer connected
    pub fn addrs_of(&self, client_ids: &[ParticipantId]) -> Vec<(ParticipantId, SocketAddr)> {
        client_ids
            .iter()
            .filter_map(|id| self.addr_of(*id).map(|addr| (*id, addr)))
            .collect()
    }

    /// Removes and returns every client silent for longer than the timeout
    pub fn check_timeouts(&mut self) -> Vec<ParticipantId> {
        let timeout = self.timeout;
        let timed_out: Vec<ParticipantId> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for client_id in &timed_out {
            self.remove_client(client_id);
        }

        timed_out
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
