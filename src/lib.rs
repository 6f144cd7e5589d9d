//! Distributed File Store Cluster Library
//!
//! This library crate defines the core modules that make up the distributed
//! file store. It serves as the foundation for the node binary (`main.rs`)
//! and the client tool (`client/`).
//!
//! ## Architecture Modules
//! The system is composed of three tightly coupled subsystems:
//!
//! - **`membership`**: The cluster coordination layer. Uses a push-style
//!   epidemic gossip protocol over TCP to discover peers and disseminate
//!   liveness information across the cluster without a central coordinator.
//! - **`storage`**: The chunked file store. Splits files above a fixed
//!   threshold into 1 KiB chunks, persists them on disk, and fans each chunk
//!   out to every known peer on write (best-effort, no quorum).
//! - **`transport`**: The line-delimited TCP framing layer. Accepts inbound
//!   connections, classifies each message by prefix, and dispatches to the
//!   handler injected at construction time. Also provides the one-shot
//!   outbound send primitive both other modules use.

pub mod error;
pub mod membership;
pub mod storage;
pub mod transport;
