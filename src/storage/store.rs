use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use super::protocol::ReplicateMessage;
use crate::error::{DfsError, Result};
use crate::membership::MembershipManager;
use crate::transport::{self, ReplicateHandler};

/// Fixed chunk size shared by writer and reader. Files at or below this
/// size are stored as a single whole-file blob.
pub const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub is_chunked: bool,
    pub chunk_count: usize,
}

/// In-memory tables, both behind the one store lock: the whole-file cache
/// and the chunked-file metadata. Metadata entries are never removed.
#[derive(Default)]
struct StoreState {
    files: HashMap<String, Vec<u8>>,
    metadata: HashMap<String, FileMeta>,
}

/// Chunked file store backed by a local data directory. Holds the
/// membership manager solely to read the current peer list for
/// replication fan-out.
pub struct FileStore {
    state: RwLock<StoreState>,
    membership: Arc<MembershipManager>,
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(membership: Arc<MembershipManager>, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(data_dir.join("chunks"))?;

        Ok(Self {
            state: RwLock::new(StoreState::default()),
            membership,
            data_dir,
        })
    }

    /// Persists a file. Blobs at or below `CHUNK_SIZE` are written whole
    /// and cached; no replication occurs for them. Larger files are split
    /// into chunks, each written to disk and then fanned out to every
    /// known peer before the next chunk is processed. Returns the first
    /// disk-write error; partial writes are not rolled back.
    pub async fn save_file(&self, filename: &str, data: &[u8]) -> Result<()> {
        validate_filename(filename)?;

        let mut state = self.state.write().await;

        if data.len() <= CHUNK_SIZE {
            fs::write(self.file_path(filename), data).await?;
            state.files.insert(filename.to_string(), data.to_vec());
            return Ok(());
        }

        let chunk_count = data.len().div_ceil(CHUNK_SIZE);
        for i in 0..chunk_count {
            let start = i * CHUNK_SIZE;
            let end = (start + CHUNK_SIZE).min(data.len());
            let chunk = &data[start..end];

            fs::write(self.chunk_path(filename, i), chunk).await?;
            self.replicate_chunk(filename, i, chunk_count, chunk).await;
        }

        state.metadata.insert(
            filename.to_string(),
            FileMeta {
                is_chunked: true,
                chunk_count,
            },
        );

        Ok(())
    }

    /// Reads a file back. Chunked files are reassembled in index order;
    /// one missing chunk fails the whole read. Whole-file blobs come from
    /// the in-memory cache, falling back to a disk read-through.
    pub async fn get_file(&self, filename: &str) -> Result<Vec<u8>> {
        validate_filename(filename)?;

        let meta = self.state.read().await.metadata.get(filename).cloned();
        if let Some(meta) = meta {
            if meta.is_chunked {
                let mut full = Vec::new();
                for i in 0..meta.chunk_count {
                    let chunk = fs::read(self.chunk_path(filename, i)).await.map_err(|_| {
                        DfsError::ChunkNotFound {
                            filename: filename.to_string(),
                            index: i,
                        }
                    })?;
                    full.extend_from_slice(&chunk);
                }
                return Ok(full);
            }
        }

        if let Some(data) = self.state.read().await.files.get(filename) {
            return Ok(data.clone());
        }

        match fs::read(self.file_path(filename)).await {
            Ok(data) => {
                let mut state = self.state.write().await;
                state.files.insert(filename.to_string(), data.clone());
                Ok(data)
            }
            Err(_) => Err(DfsError::FileNotFound(filename.to_string())),
        }
    }

    /// Persists one inbound replicated chunk, creating metadata with the
    /// advertised count if none exists yet. Idempotent: re-saving the same
    /// index simply overwrites.
    pub async fn save_chunk(
        &self,
        filename: &str,
        chunk_index: usize,
        chunk_count: usize,
        data: &[u8],
    ) -> Result<()> {
        validate_filename(filename)?;

        let mut state = self.state.write().await;
        fs::write(self.chunk_path(filename, chunk_index), data).await?;

        state
            .metadata
            .entry(filename.to_string())
            .or_insert(FileMeta {
                is_chunked: true,
                chunk_count,
            });

        Ok(())
    }

    /// Sends one chunk to every known peer, sequentially. Each failure is
    /// logged independently; the fan-out never aborts early and never
    /// retries.
    async fn replicate_chunk(&self, filename: &str, chunk_index: usize, chunk_count: usize, data: &[u8]) {
        let message = ReplicateMessage {
            filename: filename.to_string(),
            chunk_index,
            chunk_count,
            data: data.to_vec(),
        }
        .encode();

        for peer in self.membership.get_nodes() {
            match transport::send_message(&peer, &message).await {
                Ok(_) => {
                    tracing::debug!("Replicated chunk {} of {} to peer {}", chunk_index, filename, peer)
                }
                Err(e) => tracing::warn!("Replication to peer {} failed: {}", peer, e),
            }
        }
    }

    fn file_path(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }

    fn chunk_path(&self, filename: &str, index: usize) -> PathBuf {
        self.data_dir
            .join("chunks")
            .join(format!("{}.{}", filename, index))
    }
}

#[async_trait]
impl ReplicateHandler for FileStore {
    async fn handle_replicate(&self, message: &str) {
        let msg = match ReplicateMessage::parse(message) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Dropping replication message: {}", e);
                return;
            }
        };

        match self
            .save_chunk(&msg.filename, msg.chunk_index, msg.chunk_count, &msg.data)
            .await
        {
            Ok(_) => tracing::info!(
                "Replicated chunk {} of file '{}' saved",
                msg.chunk_index,
                msg.filename
            ),
            Err(e) => tracing::error!("Error saving replicated chunk: {}", e),
        }
    }
}

/// Filenames double as on-disk names, so anything that could escape the
/// data directory is rejected before touching disk.
fn validate_filename(filename: &str) -> Result<()> {
    if filename.is_empty() || filename.contains('/') || filename.contains('\\') || filename.contains("..")
    {
        return Err(DfsError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
