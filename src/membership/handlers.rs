use axum::{Json, extract::Extension, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::manager::MembershipManager;

/// Log-visible view of one peer, exposed over HTTP.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeStatus {
    pub address: String,
    pub healthy: bool,
    pub last_heartbeat_secs: u64,
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodesResponse {
    pub self_address: String,
    pub nodes: Vec<NodeStatus>,
}

pub async fn handle_nodes(
    Extension(membership): Extension<Arc<MembershipManager>>,
) -> (StatusCode, Json<NodesResponse>) {
    let nodes = membership
        .get_state()
        .into_values()
        .map(|node| NodeStatus {
            address: node.address,
            healthy: node.healthy,
            last_heartbeat_secs: node.last_heartbeat.elapsed().as_secs(),
            files: node.files,
        })
        .collect();

    (
        StatusCode::OK,
        Json(NodesResponse {
            self_address: membership.self_address().to_string(),
            nodes,
        }),
    )
}
