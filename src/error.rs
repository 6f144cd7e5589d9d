use thiserror::Error;

pub type Result<T> = std::result::Result<T, DfsError>;

#[derive(Error, Debug)]
pub enum DfsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File chunk not found: {filename} chunk {index}")]
    ChunkNotFound { filename: String, index: usize },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}
