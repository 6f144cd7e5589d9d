use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tracing::info;

use super::types::{GossipMessage, Node};
use crate::error::Result;
use crate::transport::{self, GossipHandler};

const GOSSIP_INTERVAL: Duration = Duration::from_secs(5);
const SWEEP_INTERVAL: Duration = Duration::from_secs(5);
const STALE_AFTER: Duration = Duration::from_secs(15);

/// Owns the cluster's node table. `self` is held separately and never
/// appears in the map. Every operation takes the one table lock; the lock
/// is never held across an await point.
pub struct MembershipManager {
    self_address: String,
    nodes: Mutex<HashMap<String, Node>>,
}

impl MembershipManager {
    pub fn new(self_address: String) -> Self {
        Self {
            self_address,
            nodes: Mutex::new(HashMap::new()),
        }
    }

    pub fn self_address(&self) -> &str {
        &self.self_address
    }

    /// Inserts a new healthy node if absent and not equal to self.
    /// No-op otherwise.
    pub fn add_node(&self, address: &str) {
        if address == self.self_address {
            return;
        }

        let mut nodes = self.nodes.lock().unwrap();
        if !nodes.contains_key(address) {
            nodes.insert(address.to_string(), Node::new(address.to_string()));
            info!("Node added: {}", address);
        }
    }

    /// Refreshes an existing node's heartbeat and marks it healthy.
    /// Unknown addresses are ignored, never implicitly added.
    pub fn update_heartbeat(&self, address: &str) {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get_mut(address) {
            node.last_heartbeat = Instant::now();
            node.healthy = true;
            tracing::debug!("Updated heartbeat for node {}", address);
        }
    }

    pub fn set_unhealthy(&self, address: &str) {
        let mut nodes = self.nodes.lock().unwrap();
        if let Some(node) = nodes.get_mut(address) {
            node.healthy = false;
            info!("Set node {} as unhealthy", address);
        }
    }

    /// Value snapshot of the full table, safe to read while mutations
    /// proceed.
    pub fn get_state(&self) -> HashMap<String, Node> {
        self.nodes.lock().unwrap().clone()
    }

    /// All known peer addresses, healthy or not. This is the replication
    /// fan-out audience.
    pub fn get_nodes(&self) -> Vec<String> {
        self.nodes.lock().unwrap().keys().cloned().collect()
    }

    /// Addresses currently marked healthy. This is the gossip audience.
    pub fn healthy_nodes(&self) -> Vec<String> {
        self.nodes
            .lock()
            .unwrap()
            .values()
            .filter(|node| node.healthy)
            .map(|node| node.address.clone())
            .collect()
    }

    /// Merges one inbound gossip message: the sender is added and its
    /// heartbeat refreshed; every advertised address that is neither empty
    /// nor self is added if unknown. This is the sole mechanism by which
    /// membership knowledge propagates.
    pub fn apply_gossip(&self, message: &str) -> Result<()> {
        let msg = GossipMessage::parse(message)?;

        self.add_node(&msg.sender);
        self.update_heartbeat(&msg.sender);

        for addr in &msg.peers {
            if !addr.is_empty() && addr != &self.self_address {
                self.add_node(addr);
            }
        }

        tracing::debug!(
            "Processed gossip from {}: {} advertised peer(s)",
            msg.sender,
            msg.peers.len()
        );
        Ok(())
    }

    /// Demotes every peer whose heartbeat is older than `threshold`.
    /// Demoted nodes stay in the table (no eviction) and are revived by
    /// their next heartbeat. Returns the number of demotions.
    pub fn sweep_stale(&self, threshold: Duration) -> usize {
        let mut nodes = self.nodes.lock().unwrap();
        let mut demoted = 0;

        for node in nodes.values_mut() {
            if node.healthy && node.last_heartbeat.elapsed() > threshold {
                node.healthy = false;
                demoted += 1;
                tracing::warn!(
                    "Node {} demoted: no heartbeat for {:?}",
                    node.address,
                    node.last_heartbeat.elapsed()
                );
            }
        }

        demoted
    }

    /// One gossip round every 5 seconds: pick one random healthy peer and
    /// push it the healthy-peer list. Send failures are logged, not
    /// retried, and do not affect local state.
    pub async fn run_gossip(self: Arc<Self>) {
        let mut interval = tokio::time::interval(GOSSIP_INTERVAL);

        loop {
            interval.tick().await;

            let peers = self.healthy_nodes();
            if peers.is_empty() {
                tracing::debug!("No healthy peers to gossip with");
                continue;
            }

            use rand::Rng;
            let target = peers[rand::thread_rng().gen_range(0..peers.len())].clone();

            let msg = GossipMessage {
                sender: self.self_address.clone(),
                timestamp: unix_now(),
                peers,
            };

            if let Err(e) = transport::send_message(&target, &msg.encode()).await {
                tracing::warn!("Error gossiping to peer {}: {}", target, e);
            } else {
                tracing::debug!("Gossiped to peer {}", target);
            }
        }
    }

    /// Periodic staleness sweep demoting peers that missed their
    /// heartbeats.
    pub async fn run_staleness_sweep(self: Arc<Self>) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);

        loop {
            interval.tick().await;
            self.sweep_stale(STALE_AFTER);
        }
    }
}

#[async_trait]
impl GossipHandler for MembershipManager {
    async fn handle_gossip(&self, message: &str) {
        if let Err(e) = self.apply_gossip(message) {
            tracing::warn!("Dropping gossip message: {}", e);
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
