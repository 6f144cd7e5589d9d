use anyhow::{Context, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use dfs_cluster::storage::protocol::{
    DownloadResponse, ENDPOINT_DOWNLOAD, ENDPOINT_UPLOAD, UploadRequest, UploadResponse,
};
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut server = "http://127.0.0.1:8000".to_string();
    let mut upload_path: Option<String> = None;
    let mut download_file: Option<String> = None;
    let mut out_path = "downloaded_file".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--server" => {
                server = args[i + 1].clone();
                i += 2;
            }
            "--upload" => {
                upload_path = Some(args[i + 1].clone());
                i += 2;
            }
            "--download" => {
                download_file = Some(args[i + 1].clone());
                i += 2;
            }
            "--out" => {
                out_path = args[i + 1].clone();
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    if upload_path.is_none() && download_file.is_none() {
        eprintln!(
            "Usage: {} [--server http://127.0.0.1:8000] [--upload <path>] [--download <name>] [--out <path>]",
            args[0]
        );
        std::process::exit(1);
    }

    let server = server.trim_end_matches('/').to_string();
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    if let Some(path) = upload_path {
        let data = std::fs::read(&path).with_context(|| format!("Failed to read {}", path))?;
        let filename = Path::new(&path)
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| format!("uploaded_{}", name))
            .context("Invalid upload path")?;

        let req = UploadRequest {
            filename: filename.clone(),
            data_b64: BASE64.encode(&data),
        };

        let resp: UploadResponse = client
            .post(format!("{}{}", server, ENDPOINT_UPLOAD))
            .json(&req)
            .send()
            .await?
            .json()
            .await?;

        if !resp.success {
            bail!("Upload failed: {}", resp.message);
        }
        println!("Uploaded '{}': {}", filename, resp.message);
    }

    if let Some(filename) = download_file {
        let url = format!(
            "{}{}?filename={}",
            server,
            ENDPOINT_DOWNLOAD,
            urlencoding::encode(&filename)
        );

        let resp: DownloadResponse = client.get(url).send().await?.json().await?;
        if !resp.success {
            bail!("Download failed: {}", resp.message);
        }

        let data_b64 = resp.data_b64.context("Server returned no data")?;
        let data = BASE64
            .decode(&data_b64)
            .context("Failed to decode downloaded payload")?;

        std::fs::write(&out_path, &data)
            .with_context(|| format!("Failed to write {}", out_path))?;
        println!("File downloaded and saved to {}", out_path);
    }

    Ok(())
}
