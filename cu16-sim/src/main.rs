//! Standalone CU16 simulator
//!
//! ```text
//! cu16-sim --bind 0.0.0.0:4001 --units 0,1 --delay-ms 50
//! CU16_SIM_UNITS=0,1 RUST_LOG=debug cu16-sim
//! ```

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use cu16_core::MAX_UNITS;
use cu16_sim::{SimulatorConfig, SimulatorServer};
use tokio::sync::oneshot;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cu16-sim", version, about = "Simulated CU16 door control units over TCP")]
struct Args {
    /// Listen address
    #[arg(long, env = "CU16_SIM_ADDR", default_value = "127.0.0.1:4001")]
    bind: String,
    
    /// Control unit ids to simulate
    #[arg(
        long,
        env = "CU16_SIM_UNITS",
        value_delimiter = ',',
        default_value = "0",
        value_parser = clap::value_parser!(u8).range(0..MAX_UNITS as i64)
    )]
    units: Vec<u8>,
    
    /// Pause before every reply, in milliseconds
    #[arg(long, env = "CU16_SIM_DELAY_MS", default_value_t = 0)]
    delay_ms: u64,
}

impl From<Args> for SimulatorConfig {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: args.bind,
            units: args.units,
            response_delay: Duration::from_millis(args.delay_ms),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    
    let config = SimulatorConfig::from(Args::parse());
    
    let server = SimulatorServer::bind(config)
        .await
        .context("binding simulator listener")?;
    
    let (shutdown, signal) = oneshot::channel();
    let serve = tokio::spawn(server.run(signal));
    
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    info!("Interrupted");
    
    let _ = shutdown.send(());
    serve.await.context("simulator task")?;
    
    Ok(())
}
