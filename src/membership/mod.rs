//! Membership & Discovery Module
//!
//! Implements a push-style epidemic gossip protocol over TCP to manage the
//! cluster topology. Nodes use this service to discover each other and to
//! disseminate liveness information.
//!
//! ## Core Mechanisms
//! - **Gossip Round**: every 5 seconds a node pushes its healthy-peer list
//!   to one random healthy peer; knowledge spreads transitively because
//!   every gossiped list includes addresses the sender recently learned.
//! - **Staleness Sweep**: peers whose heartbeat is older than a threshold
//!   are demoted to unhealthy; they stay in the table and are revived by
//!   the next heartbeat. No entry is ever evicted.

pub mod handlers;
pub mod manager;
pub mod types;

pub use manager::MembershipManager;

#[cfg(test)]
mod tests;
