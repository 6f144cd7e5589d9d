//! TCP Transport Module
//!
//! Frames and routes newline-delimited text messages over raw TCP.
//!
//! ## Core Mechanisms
//! - **Inbound**: one listening socket, one task per accepted connection.
//!   Each line is classified by a literal prefix (`REPLICATE:` / `GOSSIP|`)
//!   and dispatched to the handler injected at construction time.
//! - **Outbound**: `send_message` opens a one-shot connection per message,
//!   writes the line, and closes. Errors are returned to the caller, who
//!   only logs them.

pub mod tcp;

pub use tcp::{GossipHandler, ReplicateHandler, TcpTransport, send_message};
