use std::time::Instant;

use crate::error::{DfsError, Result};

/// One cluster member. The address is the unique key; the local node's own
/// address is never present in the peer table.
#[derive(Debug, Clone)]
pub struct Node {
    pub address: String,
    pub healthy: bool,
    pub last_heartbeat: Instant,
    pub files: Vec<String>,
}

impl Node {
    pub fn new(address: String) -> Self {
        Self {
            address,
            healthy: true,
            last_heartbeat: Instant::now(),
            files: Vec::new(),
        }
    }
}

/// The gossip wire message, one line of text:
///
/// ```text
/// GOSSIP|<selfAddress>|<unixTimestampSeconds>|[<addr> <addr> ...]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GossipMessage {
    pub sender: String,
    pub timestamp: u64,
    pub peers: Vec<String>,
}

impl GossipMessage {
    pub fn encode(&self) -> String {
        format!(
            "GOSSIP|{}|{}|[{}]",
            self.sender,
            self.timestamp,
            self.peers.join(" ")
        )
    }

    /// Parses a gossip line. Splits on `|` into at most 4 fields; fewer
    /// fields or a non-numeric timestamp is a [`DfsError::InvalidMessage`].
    pub fn parse(message: &str) -> Result<Self> {
        let parts: Vec<&str> = message.splitn(4, '|').collect();
        if parts.len() < 4 {
            return Err(DfsError::InvalidMessage(format!(
                "gossip message has {} fields, expected 4",
                parts.len()
            )));
        }

        let sender = parts[1].to_string();
        let timestamp = parts[2]
            .parse()
            .map_err(|_| DfsError::InvalidMessage(format!("bad timestamp: {}", parts[2])))?;

        // The list field is bracket-wrapped and space-separated,
        // e.g. `[10.0.0.2:6000 10.0.0.3:6000]`.
        let peers = parts[3]
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(Self {
            sender,
            timestamp,
            peers,
        })
    }
}
