//! Unlock one door on real hardware
//!
//! CU16_HOST=192.168.1.50 CU16_CU_ID=0 cargo run --example unlock_door -- 3

use cu16::{Cu16Service, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();
    
    let door: u8 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0);
    
    let config = ServiceConfig::from_env()?;
    println!("Unlocking door {} on {}:{} (cu {})...", door, config.host, config.port, config.cu_id);
    
    let mut service = Cu16Service::from_config(&config)?;
    
    let status = service.unlock_door(door).await?;
    println!("✓ {}", status);
    println!("  locked doors: {:?}", status.locked_doors());
    
    tokio::task::spawn_blocking(move || service.shutdown()).await?;
    Ok(())
}
