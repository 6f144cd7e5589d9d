use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use dfs_cluster::membership::MembershipManager;
use dfs_cluster::membership::handlers::handle_nodes;
use dfs_cluster::storage::FileStore;
use dfs_cluster::storage::handlers::{handle_download, handle_upload};
use dfs_cluster::transport::TcpTransport;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut api_port: u16 = 8000;
    let mut tcp_port: u16 = 6000;
    let mut peer: Option<String> = None;
    let mut data_dir = "data".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--api-port" => {
                api_port = args[i + 1].parse()?;
                i += 2;
            }
            "--tcp-port" => {
                tcp_port = args[i + 1].parse()?;
                i += 2;
            }
            "--peer" => {
                peer = Some(args[i + 1].clone());
                i += 2;
            }
            "--data-dir" => {
                data_dir = args[i + 1].clone();
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: {} [--api-port 8000] [--tcp-port 6000] [--peer <addr:port>] [--data-dir data]",
                    args[0]
                );
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    let self_address = format!("127.0.0.1:{}", tcp_port);
    tracing::info!("Starting node {} (data dir: {})", self_address, data_dir);

    // 1. Membership (TCP gossip):
    let membership = Arc::new(MembershipManager::new(self_address));
    if let Some(peer) = &peer {
        tracing::info!("Seeding membership with peer {}", peer);
        membership.add_node(peer);
    } else {
        tracing::info!("Starting without seed peer (founder)");
    }

    // 2. File store:
    let store = Arc::new(FileStore::new(membership.clone(), &data_dir)?);

    // 3. TCP transport with the two handlers injected:
    let transport = TcpTransport::bind(
        &format!("0.0.0.0:{}", tcp_port),
        store.clone(),
        membership.clone(),
    )
    .await?;
    tokio::spawn(transport.serve());

    // 4. Background loops: gossip, staleness sweep, state reporter:
    tokio::spawn(membership.clone().run_gossip());
    tokio::spawn(membership.clone().run_staleness_sweep());

    let stats_membership = membership.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(10));

        loop {
            interval.tick().await;
            let state = stats_membership.get_state();
            tracing::info!("Cluster state: {} known peer(s)", state.len());
            for (addr, node) in state {
                tracing::info!(
                    "  - {} healthy={} last_heartbeat={}s ago files={:?}",
                    addr,
                    node.healthy,
                    node.last_heartbeat.elapsed().as_secs(),
                    node.files
                );
            }
        }
    });

    // 5. HTTP façade:
    let app = Router::new()
        .route("/upload", post(handle_upload))
        .route("/download", get(handle_download))
        .route("/nodes", get(handle_nodes))
        .layer(Extension(store))
        .layer(Extension(membership));

    let http_addr = SocketAddr::from(([0, 0, 0, 0], api_port));
    tracing::info!("HTTP server listening on {}", http_addr);

    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
