//! Storage Network Protocol
//!
//! Defines the replication wire message exchanged between nodes over the
//! TCP transport, and the Data Transfer Objects (DTOs) of the HTTP façade
//! (upload/download) serialized as JSON.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::error::{DfsError, Result};

// --- API Endpoints ---

/// Public endpoint for client uploads.
pub const ENDPOINT_UPLOAD: &str = "/upload";
/// Public endpoint for client downloads.
pub const ENDPOINT_DOWNLOAD: &str = "/download";
/// Public endpoint exposing the cluster view.
pub const ENDPOINT_NODES: &str = "/nodes";

// --- Replication wire message ---

/// One replicated chunk, sent over a transport connection as a single
/// newline-terminated line:
///
/// ```text
/// REPLICATE:<filename>:<chunkIndex>:<chunkCount>:<base64(chunkData)>
/// ```
///
/// The payload is standard base64, which cannot contain a colon, so the
/// 5-field split is unambiguous for well-formed input.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateMessage {
    pub filename: String,
    pub chunk_index: usize,
    pub chunk_count: usize,
    pub data: Vec<u8>,
}

impl ReplicateMessage {
    pub fn encode(&self) -> String {
        format!(
            "REPLICATE:{}:{}:{}:{}",
            self.filename,
            self.chunk_index,
            self.chunk_count,
            BASE64.encode(&self.data)
        )
    }

    /// Parses a replication line. Wrong field count, non-numeric
    /// index/count, or bad base64 is a [`DfsError::InvalidMessage`].
    pub fn parse(message: &str) -> Result<Self> {
        let parts: Vec<&str> = message.splitn(5, ':').collect();
        if parts.len() != 5 {
            return Err(DfsError::InvalidMessage(format!(
                "replication message has {} fields, expected 5",
                parts.len()
            )));
        }

        let filename = parts[1].to_string();
        let chunk_index = parts[2]
            .parse()
            .map_err(|_| DfsError::InvalidMessage(format!("bad chunk index: {}", parts[2])))?;
        let chunk_count = parts[3]
            .parse()
            .map_err(|_| DfsError::InvalidMessage(format!("bad chunk count: {}", parts[3])))?;
        let data = BASE64
            .decode(parts[4])
            .map_err(|e| DfsError::InvalidMessage(format!("bad chunk payload: {}", e)))?;

        Ok(Self {
            filename,
            chunk_index,
            chunk_count,
            data,
        })
    }
}

// --- Data Transfer Objects ---

/// Client request for storing a file. The payload travels base64-encoded
/// inside the JSON body.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub data_b64: String,
}

/// Acknowledgment for an upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

/// Query parameters of a download request.
#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub filename: String,
}

/// Response for a download. `data_b64` is `None` when the file or one of
/// its chunks could not be found.
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    pub data_b64: Option<String>,
}
