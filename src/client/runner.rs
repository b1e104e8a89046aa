//! Client execution logic with server wake-up and reconnection support.

use std::time::Duration;

use super::error::ClientError;
use super::session::run_client_session;

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;
const WAKE_ATTEMPTS: u32 = 3;

/// Derive the HTTP health endpoint from the WebSocket URL
fn health_url(ws_url: &str) -> String {
    let http = ws_url
        .replacen("wss://", "https://", 1)
        .replacen("ws://", "http://", 1);
    let base = http.strip_suffix("/ws").unwrap_or(&http);
    format!("{}/api/health", base)
}

/// Probe the server's health endpoint until it answers, waking up hosts
/// that suspend idle instances
async fn wake_server(ws_url: &str) {
    let url = health_url(ws_url);
    for attempt in 1..=WAKE_ATTEMPTS {
        match reqwest::get(&url).await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Server is awake ({})", url);
                return;
            }
            Ok(response) => {
                tracing::warn!("Health probe returned {} ({})", response.status(), url);
            }
            Err(e) => {
                tracing::info!(
                    "Waiting for server to wake up (attempt {}/{}): {}",
                    attempt,
                    WAKE_ATTEMPTS,
                    e
                );
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

/// Run the WebSocket client with reconnection logic
pub async fn run_client(url: String, client_id: String) -> Result<(), Box<dyn std::error::Error>> {
    wake_server(&url).await;

    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' (attempt {}/{})",
            url,
            client_id,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &client_id).await {
            Ok(_) => {
                tracing::info!("Client session ended normally");
                // If connection ended normally (user exit), don't reconnect
                break;
            }
            Err(e) => {
                // A duplicate client_id never resolves by retrying
                if let Some(client_err) = e.downcast_ref::<ClientError>()
                    && matches!(client_err, ClientError::DuplicateClientId(_))
                {
                    tracing::error!("{}", e);
                    tracing::error!(
                        "Cannot connect with client_id '{}' as it is already in use. Exiting.",
                        client_id
                    );
                    std::process::exit(1);
                }

                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}
