//! Loading the subscriptions snapshot from the spreadsheet endpoint or a file

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use subscription_revenue::Snapshot;

use crate::constants;

/// Where a refresh reads its snapshot from
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Endpoint(String),
    File(PathBuf),
}

impl SnapshotSource {
    pub async fn load(&self, client: &reqwest::Client) -> Result<Snapshot> {
        match self {
            SnapshotSource::Endpoint(url) => fetch_snapshot(client, url).await,
            SnapshotSource::File(path) => load_snapshot_file(path),
        }
    }
}

impl std::fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotSource::Endpoint(url) => write!(f, "{}", mask_deployment_id(url)),
            SnapshotSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}

/// GET the endpoint (following the web app's redirect) and decode it
pub async fn fetch_snapshot(client: &reqwest::Client, url: &str) -> Result<Snapshot> {
    tracing::info!(endpoint = %mask_deployment_id(url), "fetching subscriptions");

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .context("Request to subscriptions endpoint failed")?;

    let status = response.status();
    tracing::debug!(%status, "response received");
    if !status.is_success() {
        anyhow::bail!("Subscriptions endpoint returned status: {}", status);
    }

    let body = response
        .bytes()
        .await
        .context("Failed to read subscriptions response body")?;
    let snapshot = Snapshot::from_slice(&body).context("Subscriptions endpoint sent malformed data")?;

    tracing::info!(records = snapshot.len(), "subscriptions loaded");
    Ok(snapshot)
}

pub fn load_snapshot_file(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read subscriptions file: {}", path.display()))?;
    let snapshot = Snapshot::from_json(&content)
        .with_context(|| format!("Malformed subscriptions file: {}", path.display()))?;

    tracing::info!(records = snapshot.len(), path = %path.display(), "subscriptions loaded");
    Ok(snapshot)
}

/// Hide the web app deployment id for safe logging.
/// Converts ".../macros/s/SECRET/exec" to ".../macros/s/****/exec"
fn mask_deployment_id(url: &str) -> String {
    const MARKER: &str = "/macros/s/";
    let Some(idx) = url.find(MARKER) else {
        return url.to_string();
    };

    let start = idx + MARKER.len();
    let rest = &url[start..];
    let end = rest.find('/').unwrap_or(rest.len());
    format!("{}****{}", &url[..start], &rest[end..])
}
