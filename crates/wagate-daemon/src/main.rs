//! # wagate-daemon
//!
//! Gateway server binary — wires the messaging client to the HTTP/WebSocket
//! facade and runs until ctrl-c.

#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use wagate_client::sim::SimulatedClient;
use wagate_core::{LifecycleEvent, normalize};
use wagate_server::config::ServerConfig;
use wagate_server::server::GatewayServer;

/// wagate gateway server.
#[derive(Parser, Debug)]
#[command(name = "wagate-daemon", about = "WhatsApp HTTP/WebSocket gateway")]
struct Cli {
    /// Host to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind.
    #[arg(long)]
    port: Option<u16>,

    /// Country code substituted for a local `0` destination prefix.
    #[arg(long)]
    country_code: Option<String>,

    /// Destination number the simulated client treats as registered
    /// (repeatable).
    #[arg(long = "registered")]
    registered: Vec<String>,

    /// Seconds after which the simulated client completes pairing.
    #[arg(long, default_value_t = 5)]
    pair_after_secs: u64,
}

impl Cli {
    fn into_config(self) -> (ServerConfig, Vec<String>, u64) {
        let mut config = ServerConfig::from_env();
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(code) = self.country_code {
            config.country_code = code;
        }
        (config, self.registered, self.pair_after_secs)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, registered, pair_after_secs) = args.into_config();

    // No real messaging transport is linked into this binary; the daemon
    // runs the simulated client and walks it through pairing so the facade
    // can be exercised end to end. A real transport implements
    // `MessagingClient` and plugs in here.
    let client = Arc::new(SimulatedClient::new());
    for raw in &registered {
        match normalize(raw, &config.country_code) {
            Ok(address) => client.register(address),
            Err(e) => tracing::warn!(raw, error = %e, "ignoring unusable --registered value"),
        }
    }
    tracing::warn!("no real messaging transport configured — running the simulated client");

    let server = GatewayServer::new(config, client.clone());
    let bridge = server.spawn_bridge();
    let pairing = spawn_pairing_script(client, Duration::from_secs(pair_after_secs));

    let (addr, serve) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("wagate listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("shutting down");
    pairing.abort();
    server.shutdown().graceful_shutdown(vec![serve, bridge], None).await;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Walk the simulated client through pairing: issue a QR shortly after
/// start, then report authenticated and ready after `delay`.
fn spawn_pairing_script(
    client: Arc<SimulatedClient>,
    delay: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        // Give the first subscribers a moment to connect.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let code = format!("1@{}", uuid::Uuid::now_v7().simple());
        let _ = client.emit(LifecycleEvent::QrIssued { code });

        tokio::time::sleep(delay).await;
        let _ = client.emit(LifecycleEvent::Authenticated);
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _ = client.emit(LifecycleEvent::Ready);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["wagate-daemon"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.pair_after_secs, 5);
        assert!(cli.registered.is_empty());
    }

    #[test]
    fn cli_custom_host_and_port() {
        let cli = Cli::parse_from(["wagate-daemon", "--host", "0.0.0.0", "--port", "9090"]);
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(9090));
    }

    #[test]
    fn cli_repeatable_registered() {
        let cli = Cli::parse_from([
            "wagate-daemon",
            "--registered",
            "081234567890",
            "--registered",
            "081234567891",
        ]);
        assert_eq!(cli.registered.len(), 2);
    }

    #[test]
    fn cli_overrides_flow_into_config() {
        let cli = Cli::parse_from([
            "wagate-daemon",
            "--host",
            "0.0.0.0",
            "--port",
            "9090",
            "--country-code",
            "44",
        ]);
        let (config, _, _) = cli.into_config();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9090);
        assert_eq!(config.country_code, "44");
    }

    #[test]
    fn cli_defaults_leave_config_defaults() {
        let cli = Cli::parse_from(["wagate-daemon"]);
        let (config, _, pair_after) = cli.into_config();
        assert_eq!(config.port, 8080);
        assert_eq!(pair_after, 5);
    }

    #[tokio::test]
    async fn pairing_script_walks_the_lifecycle() {
        let client = Arc::new(SimulatedClient::new());
        let mut rx = wagate_client::MessagingClient::subscribe(client.as_ref());

        let handle = spawn_pairing_script(client, Duration::from_millis(10));

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, LifecycleEvent::QrIssued { .. }));
        let second = rx.recv().await.unwrap();
        assert_eq!(second, LifecycleEvent::Authenticated);
        let third = rx.recv().await.unwrap();
        assert_eq!(third, LifecycleEvent::Ready);
        handle.await.unwrap();
    }
}
