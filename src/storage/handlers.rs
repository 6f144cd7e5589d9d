use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::sync::Arc;

use super::protocol::{DownloadParams, DownloadResponse, UploadRequest, UploadResponse};
use super::store::FileStore;
use crate::error::DfsError;

pub async fn handle_upload(
    Extension(store): Extension<Arc<FileStore>>,
    Json(req): Json<UploadRequest>,
) -> (StatusCode, Json<UploadResponse>) {
    let data = match BASE64.decode(&req.data_b64) {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Failed to decode upload payload: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(UploadResponse {
                    success: false,
                    message: "Invalid base64 payload".to_string(),
                }),
            );
        }
    };

    match store.save_file(&req.filename, &data).await {
        Ok(_) => (
            StatusCode::OK,
            Json(UploadResponse {
                success: true,
                message: "File uploaded successfully".to_string(),
            }),
        ),
        Err(e @ DfsError::InvalidFilename(_)) => {
            tracing::error!("Rejected upload: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(UploadResponse {
                    success: false,
                    message: e.to_string(),
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to save file: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UploadResponse {
                    success: false,
                    message: "Failed to save file".to_string(),
                }),
            )
        }
    }
}

pub async fn handle_download(
    Extension(store): Extension<Arc<FileStore>>,
    Query(params): Query<DownloadParams>,
) -> (StatusCode, Json<DownloadResponse>) {
    match store.get_file(&params.filename).await {
        Ok(data) => (
            StatusCode::OK,
            Json(DownloadResponse {
                success: true,
                message: "File retrieved successfully".to_string(),
                data_b64: Some(BASE64.encode(&data)),
            }),
        ),
        Err(e @ (DfsError::FileNotFound(_) | DfsError::ChunkNotFound { .. })) => {
            tracing::error!("Failed to retrieve file: {}", e);
            (
                StatusCode::NOT_FOUND,
                Json(DownloadResponse {
                    success: false,
                    message: e.to_string(),
                    data_b64: None,
                }),
            )
        }
        Err(e @ DfsError::InvalidFilename(_)) => {
            tracing::error!("Rejected download: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(DownloadResponse {
                    success: false,
                    message: e.to_string(),
                    data_b64: None,
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to retrieve file: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DownloadResponse {
                    success: false,
                    message: "Failed to retrieve file".to_string(),
                    data_b64: None,
                }),
            )
        }
    }
}
