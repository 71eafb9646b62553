//! TCP listener that answers CU16 frames from a [`HardwareState`]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cu16_core::{Frame, constants::MAX_RESPONSE_SIZE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::{error::Result, hardware::HardwareState};

/// Simulator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Listen address, port 0 picks a free port
    pub bind_addr: String,
    
    /// Control unit ids to simulate
    pub units: Vec<u8>,
    
    /// Pause before every reply
    pub response_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            units: vec![0],
            response_delay: Duration::ZERO,
        }
    }
}

/// Bound simulator, not yet accepting
pub struct SimulatorServer {
    listener: TcpListener,
    state: Arc<HardwareState>,
    response_delay: Duration,
}

impl SimulatorServer {
    /// Bind the listener and create the hardware model
    pub async fn bind(config: SimulatorConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        
        info!(
            "Simulator listening on {} (units={:?})",
            listener.local_addr()?,
            config.units
        );
        
        Ok(Self {
            listener,
            state: Arc::new(HardwareState::with_units(config.units)),
            response_delay: config.response_delay,
        })
    }
    
    /// Address actually bound
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
    
    /// Shared hardware model
    pub fn state(&self) -> Arc<HardwareState> {
        self.state.clone()
    }
    
    /// Accept connections until `shutdown` fires or its sender is dropped
    pub async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Simulator shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Accepted {}", peer);
                        tokio::spawn(serve_connection(
                            stream,
                            self.state.clone(),
                            self.response_delay,
                        ));
                    }
                    Err(e) => warn!("Accept failed: {}", e),
                },
            }
        }
    }
    
    /// Run on the current tokio runtime in the background
    pub fn spawn(self) -> Result<SimulatorHandle> {
        let addr = self.local_addr()?;
        let state = self.state();
        let (shutdown, signal) = oneshot::channel();
        let task = tokio::spawn(self.run(signal));
        
        Ok(SimulatorHandle {
            addr,
            state,
            shutdown: Some(shutdown),
            task,
        })
    }
}

/// Control of a background simulator
pub struct SimulatorHandle {
    addr: SocketAddr,
    state: Arc<HardwareState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Address the simulator listens on
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }
    
    /// Shared hardware model
    pub fn state(&self) -> Arc<HardwareState> {
        self.state.clone()
    }
    
    /// Stop accepting and wait for the accept loop to exit
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("Simulator task failed: {}", e);
        }
    }
}

impl Drop for SimulatorHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Answer requests on one connection until the peer closes it
async fn serve_connection(mut stream: TcpStream, state: Arc<HardwareState>, delay: Duration) {
    let mut buf = [0u8; MAX_RESPONSE_SIZE];
    
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!("Read failed: {}", e);
                break;
            }
        };
        
        trace!("Simulator received {}", hex::encode_upper(&buf[..n]));
        
        let request = match Frame::decode(&buf[..n]) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping malformed request: {}", e);
                break;
            }
        };
        
        // Silence closes the connection, the client reads EOF
        let Some(reply) = state.handle_request(&request) else {
            break;
        };
        
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        
        if let Err(e) = stream.write_all(reply.as_bytes()).await {
            debug!("Write failed: {}", e);
            break;
        }
    }
}
