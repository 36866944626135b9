/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! GateLink command-line client.
//!
//! Connects to the gateway at `host:port`, keeps the session alive and
//! reconnects until the attempt budget is spent. Ticks are recorded to a
//! JSON-lines file when `--ticks` is given. Log level follows `RUST_LOG`.

use anyhow::Context;
use clap::Parser;
use gatelink_core::event::EventSink;
use gatelink_core::types::{Instrument, OrderIntent, Side};
use gatelink_engine::builder::ClientBuilder;
use gatelink_engine::supervisor::DEFAULT_MAX_ATTEMPTS;
use gatelink_session::config::SessionConfig;
use gatelink_store::{DEFAULT_QUEUE_CAPACITY, MemoryTickStore, TickRecorder};
use gatelink_transport::traits::{DEFAULT_HOST, DEFAULT_PORT, Endpoint};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Records kept when ticks are not written to a file.
const MEMORY_TICK_CAPACITY: usize = 10_000;

/// Reconnecting trading-gateway client.
#[derive(Debug, Parser)]
#[command(name = "gatelink", version, about)]
struct Cli {
    /// Gateway host.
    #[arg(default_value = DEFAULT_HOST)]
    host: String,

    /// Gateway port.
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Append received ticks to this JSON-lines file.
    #[arg(long, value_name = "PATH")]
    ticks: Option<PathBuf>,

    /// Place and cancel a BUY 1000 MSFT LMT 0.01 order once per session.
    #[arg(long)]
    probe_order: bool,

    /// Total connection attempts.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Seconds to wait between attempts.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    retry_interval: u64,
}

impl Cli {
    fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::new();
        if self.probe_order {
            config.with_probe_order(OrderIntent::limit(
                Instrument::stock("MSFT"),
                Side::Buy,
                Decimal::from(1000),
                Decimal::new(1, 2),
            ))
        } else {
            config
        }
    }

    fn client(&self) -> ClientBuilder {
        ClientBuilder::new()
            .with_endpoint(self.endpoint())
            .with_session_config(self.session_config())
            .with_max_reconnect_attempts(self.max_attempts)
            .with_reconnect_interval(Duration::from_secs(self.retry_interval))
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// Starts the tick recorder over the configured store.
fn start_recorder(ticks: Option<&PathBuf>) -> anyhow::Result<TickRecorder> {
    match ticks {
        Some(path) => {
            let recorder = TickRecorder::spawn_jsonl(path, DEFAULT_QUEUE_CAPACITY)
                .with_context(|| format!("cannot record ticks to {}", path.display()))?;
            info!(path = %path.display(), "Recording ticks");
            Ok(recorder)
        }
        None => TickRecorder::spawn(
            MemoryTickStore::with_capacity(MEMORY_TICK_CAPACITY),
            DEFAULT_QUEUE_CAPACITY,
        )
        .context("cannot start tick recorder"),
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let client = cli.client();
    info!(endpoint = %client.endpoint(), "Starting GateLink");

    let recorder = start_recorder(cli.ticks.as_ref())?;
    let summary = client.run(|| Some(Box::new(recorder.clone()) as Box<dyn EventSink>));
    let stats = recorder.shutdown();

    info!(
        attempts = summary.attempts,
        sessions = summary.sessions_established,
        ticks_stored = stats.stored,
        ticks_dropped = stats.dropped,
        "GateLink finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["gatelink"]).unwrap();
        assert_eq!(cli.endpoint(), Endpoint::new("127.0.0.1", 4001));
        assert!(cli.ticks.is_none());
        assert!(!cli.probe_order);

        let client = cli.client();
        assert_eq!(client.max_reconnect_attempts(), 50);
        assert_eq!(client.reconnect_interval(), Duration::from_secs(10));
        assert_eq!(client.endpoint().client_id, 0);
        assert!(client.session_config().probe_order.is_none());
    }

    #[test]
    fn test_cli_host_and_port() {
        let cli = Cli::try_parse_from(["gatelink", "gateway.local", "7497"]).unwrap();
        assert_eq!(cli.endpoint().addr(), "gateway.local:7497");
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "gatelink",
            "--ticks",
            "/tmp/ticks.jsonl",
            "--probe-order",
            "--max-attempts",
            "3",
            "--retry-interval",
            "1",
        ])
        .unwrap();

        assert_eq!(cli.ticks, Some(PathBuf::from("/tmp/ticks.jsonl")));
        let client = cli.client();
        assert_eq!(client.max_reconnect_attempts(), 3);
        assert_eq!(client.reconnect_interval(), Duration::from_secs(1));

        let probe = client.session_config().probe_order.clone().unwrap();
        assert_eq!(probe.to_string(), "BUY 1000 MSFT LMT at 0.01");
    }

    #[test]
    fn test_cli_rejects_bad_port() {
        assert!(Cli::try_parse_from(["gatelink", "localhost", "70000"]).is_err());
    }

    #[test]
    fn test_start_recorder_bad_path() {
        let path = std::env::temp_dir()
            .join("gatelink-missing-dir")
            .join("ticks.jsonl");
        let err = start_recorder(Some(&path)).unwrap_err();
        assert!(err.downcast_ref::<gatelink_core::GateLinkError>().is_some());
    }

    #[test]
    fn test_start_memory_recorder() {
        let recorder = start_recorder(None).unwrap();
        assert_eq!(recorder.shutdown().accepted, 0);
    }
}
