//! Client connection management for the match server
//!
//! This module tracks which network addresses belong to which client id:
//! - Client connection lifecycle (connect, disconnect, timeout)
//! - Liveness tracking from any packet, heartbeats included
//! - Client capacity management and address lookup for broadcasts
//!
//! A client id doubles as the player id once the client joins the match.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Silence after which a client is considered gone.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// A connected client
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Records activity from this client.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Returns true if no packets have been received from this client
    /// within the specified timeout duration.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Roster of connected clients
///
/// Enforces the capacity limit and hands out ids starting from 1. Ids are
/// never reused within one server run.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next available client ID for new connections
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
    timeout: Duration,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self::with_timeout(max_clients, CLIENT_TIMEOUT)
    }

    pub fn with_timeout(max_clients: usize, timeout: Duration) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
            timeout,
        }
    }

    /// Attempts to add a new client connection
    ///
    /// Returns Some(client_id) if successful, None if server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Removes a client. Returns false if they were already gone.
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!("Client {} disconnected", client.id);
            true
        } else {
            false
        }
    }

    /// Finds a client ID by their network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Marks the client as alive. Returns false for unknown ids.
    pub fn touch(&mut self, client_id: u32) -> bool {
        match self.clients.get_mut(&client_id) {
            Some(client) => {
                client.touch();
                true
            }
            None => false,
        }
    }

    /// Removes clients that have been silent longer than the timeout and
    /// returns their ids so the match can drop their players.
    pub fn check_timeouts(&mut self) -> Vec<u32> {
        let timeout = self.timeout;
        let timed_out: Vec<u32> = self
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

    /// Gets all client IDs and their network addresses
    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:8081".parse().unwrap()
    }

    #[test]
    fn test_client_timeout() {
        let mut client = Client::new(1, test_addr());
        assert!(!client.is_timed_out(Duration::from_secs(1)));

        client.last_seen = Instant::now() - Duration::from_secs(2);
        assert!(client.is_timed_out(Duration::from_secs(1)));

        client.touch();
        assert!(!client.is_timed_out(Duration::from_secs(1)));
    }

    #[test]
    fn test_add_clients_until_full() {
        let mut manager = ClientManager::new(2);
        assert!(manager.is_empty());

        assert_eq!(manager.add_client(test_addr()), Some(1));
        assert_eq!(manager.add_client(test_addr2()), Some(2));
        assert_eq!(manager.add_client("127.0.0.1:8082".parse().unwrap()), None);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut manager = ClientManager::new(2);
        let first = manager.add_client(test_addr()).unwrap();
        assert!(manager.remove_client(&first));
        assert!(!manager.remove_client(&first));

        assert_eq!(manager.add_client(test_addr()), Some(2));
    }

    #[test]
    fn test_find_client_by_addr() {
        let mut manager = ClientManager::new(4);
        let id1 = manager.add_client(test_addr()).unwrap();
        let id2 = manager.add_client(test_addr2()).unwrap();

        assert_eq!(manager.find_client_by_addr(test_addr()), Some(id1));
        assert_eq!(manager.find_client_by_addr(test_addr2()), Some(id2));
        assert_eq!(
            manager.find_client_by_addr("10.0.0.1:9000".parse().unwrap()),
            None
        );
    }

    #[test]
    fn test_check_timeouts_removes_silent_clients() {
        let mut manager = ClientManager::with_timeout(4, Duration::from_millis(100));
        let stale = manager.add_client(test_addr()).unwrap();
        let fresh = manager.add_client(test_addr2()).unwrap();

        if let Some(client) = manager.clients.get_mut(&stale) {
            client.last_seen = Instant::now() - Duration::from_secs(1);
        }

        assert_eq!(manager.check_timeouts(), vec![stale]);
        assert_eq!(manager.len(), 1);
        assert!(manager.touch(fresh));
        assert!(!manager.touch(stale));
    }

    #[test]
    fn test_get_client_addrs() {
        let mut manager = ClientManager::new(4);
        manager.add_client(test_addr());
        manager.add_client(test_addr2());

        let mut addrs = manager.get_client_addrs();
        addrs.sort_by_key(|(id, _)| *id);
        assert_eq!(addrs, vec![(1, test_addr()), (2, test_addr2())]);
    }
}
