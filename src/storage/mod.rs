//! Chunked File Store Module
//!
//! Persists files on disk, splitting anything above 1 KiB into fixed-size
//! chunks, and replicates every chunk to every known peer on write.
//!
//! ## Core Concepts
//! - **Chunking**: files above `CHUNK_SIZE` are sliced into contiguous
//!   chunks, reassembled on read by concatenating in index order.
//! - **Fan-out Replication**: each chunk write sends one `REPLICATE`
//!   message per peer, sequentially, best-effort. No quorum, no ack, no
//!   retry.
//! - **Read-through Cache**: whole-file blobs are cached in memory and
//!   reloaded from disk on a cache miss.

pub mod handlers;
pub mod protocol;
pub mod store;

pub use store::{CHUNK_SIZE, FileStore};
