//! Drive the in-process simulator through the service

use std::time::Duration;

use cu16::{Cu16Service, ServiceConfig};
use cu16_sim::{SimulatorConfig, SimulatorServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();
    
    let sim = SimulatorServer::bind(SimulatorConfig {
        response_delay: Duration::from_millis(100),
        ..SimulatorConfig::default()
    })
    .await?
    .spawn()?;
    
    let addr = sim.local_addr();
    sim.state().set_occupied(0, 2, true);
    
    let mut service = Cu16Service::from_config(&ServiceConfig::new(addr.ip().to_string(), addr.port()))?;
    
    // Queued back to back, answered one at a time
    let unlock = service.unlock_door(2);
    let status = service.get_status(2);
    
    println!("✓ after unlock: {}", unlock.await?);
    println!("✓ status:       {}", status.await?);
    println!("✓ unlock all:   {}", service.unlock_all_doors().await?);
    
    tokio::task::spawn_blocking(move || service.shutdown()).await?;
    sim.shutdown().await;
    
    Ok(())
}
