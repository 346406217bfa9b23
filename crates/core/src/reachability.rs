//! SSH reachability probing.
//!
//! A host counts as reachable when a TCP connection to its SSH port opens
//! within the timeout. No SSH handshake is attempted.

use ck_protocol::ipc::ProbeResult;
use std::time::Duration;
use tokio::net::TcpStream;

pub const DEFAULT_SSH_PORT: u16 = 22;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Probe one host.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> ProbeResult {
    let reachable = matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    );
    tracing::debug!(host, port, reachable, "Probed host");

    ProbeResult {
        host: host.to_string(),
        port,
        reachable,
    }
}

/// Probe every host concurrently.
///
/// Results are in the same order as `hosts`.
pub async fn probe_all(hosts: &[String], port: u16, timeout: Duration) -> Vec<ProbeResult> {
    let handles: Vec<_> = hosts
        .iter()
        .map(|host| {
            let host = host.clone();
            tokio::spawn(async move { probe(&host, port, timeout).await })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (host, handle) in hosts.iter().zip(handles) {
        let result = handle.await.unwrap_or_else(|e| {
            tracing::warn!(host, error = %e, "Probe task failed");
            ProbeResult {
                host: host.clone(),
                port,
                reachable: false,
            }
        });
        results.push(result);
    }
    results
}
