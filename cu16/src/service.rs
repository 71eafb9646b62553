//! Command-serializing service over a blocking transport

use std::sync::Arc;
use std::thread;

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use cu16_core::{
    Command, Frame, Response, Status, build_simple, build_two_data, constants::frame_len,
    make_address, parse_status,
};
use cu16_transport::{TcpTransport, Transport};

use crate::{
    config::ServiceConfig,
    error::{Error, Result},
    handle::CommandHandle,
};

type Job = Box<dyn FnOnce(&dyn Transport) + Send + 'static>;

/// Worker state of a [`Cu16Service`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Waiting for the next command
    Idle,
    
    /// Executing one command
    Busy,
    
    /// Queue closed and drained
    Stopped,
}

/// CU16 control unit service
///
/// High-level interface used by application code. Every command is turned
/// into a frame on the caller's thread, queued, and executed by one dedicated
/// worker thread strictly in submission order. The caller gets a
/// [`CommandHandle`] back immediately and never blocks on the network.
///
/// One service per physical channel: two services pointed at the same bridge
/// do not coordinate with each other.
///
/// # Examples
///
/// ```no_run
/// use cu16::Cu16Service;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut service = Cu16Service::new("192.168.1.50", 4001, 0)?;
///     
///     let status = service.unlock_door(3).await?;
///     println!("door 3 locked: {}", status.locked[3]);
///     
///     tokio::task::spawn_blocking(move || service.shutdown()).await?;
///     Ok(())
/// }
/// ```
pub struct Cu16Service {
    cu_id: u8,
    queue: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
    state: Arc<RwLock<ServiceState>>,
}

impl Cu16Service {
    /// Start a service talking TCP to `host:port` with default timeouts
    pub fn new(host: impl Into<String>, port: u16, cu_id: u8) -> Result<Self> {
        Self::start(TcpTransport::new(host, port), cu_id)
    }
    
    /// Start a service from a [`ServiceConfig`]
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::start(config.transport(), config.cu_id)
    }
    
    /// Start a service over any transport
    pub fn start(transport: impl Transport + 'static, cu_id: u8) -> Result<Self> {
        Self::with_transport(Arc::new(transport), cu_id)
    }
    
    /// Start a service over a shared transport
    ///
    /// The transport serializes its own exchanges, so sharing it between
    /// services is safe, but commands from different services interleave.
    pub fn with_transport(transport: Arc<dyn Transport>, cu_id: u8) -> Result<Self> {
        let (queue, jobs) = mpsc::unbounded_channel();
        let state = Arc::new(RwLock::new(ServiceState::Idle));
        let remote = transport.remote_addr();
        
        let worker = thread::Builder::new()
            .name(format!("cu16-worker-{}", cu_id & 0x0F))
            .spawn({
                let state = state.clone();
                move || run_worker(transport, jobs, state)
            })
            .map_err(Error::WorkerSpawn)?;
        
        info!("CU16 service started (cu_id={}, remote={})", cu_id & 0x0F, remote);
        
        Ok(Self {
            cu_id,
            queue: Some(queue),
            worker: Some(worker),
            state,
        })
    }
    
    /// Control unit id this service addresses
    pub fn cu_id(&self) -> u8 {
        self.cu_id
    }
    
    /// Current worker state
    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }
    
    /// Check if new commands are accepted
    pub fn is_running(&self) -> bool {
        self.queue.is_some()
    }
    
    /// Unlock one door and report the unit status afterwards
    pub fn unlock_door(&self, door_index: u8) -> CommandHandle<Status> {
        let frame = build_simple(make_address(self.cu_id, door_index), Command::UnlockOne.into());
        self.submit(Command::UnlockOne, frame, decode_status)
    }
    
    /// Read the unit status through a door address
    pub fn get_status(&self, door_index: u8) -> CommandHandle<Status> {
        let frame = build_simple(make_address(self.cu_id, door_index), Command::GetStatus.into());
        self.submit(Command::GetStatus, frame, decode_status)
    }
    
    /// Unlock every door of the unit
    pub fn unlock_all_doors(&self) -> CommandHandle<Status> {
        let frame = build_simple(make_address(self.cu_id, 0), Command::UnlockAll.into());
        self.submit(Command::UnlockAll, frame, decode_status)
    }
    
    /// Bus-wide status request, answered by this unit
    pub fn get_all_status(&self) -> CommandHandle<Status> {
        let frame = build_simple(make_address(self.cu_id, 0), Command::GetAllBus.into());
        self.submit(Command::GetAllBus, frame, decode_status)
    }
    
    /// Set the lock pulse duration; resolves with the unit's echo frame
    pub fn set_unlock_time(&self, value: u16) -> CommandHandle<Frame> {
        let frame = build_two_data(
            make_address(self.cu_id, 0),
            Command::SetUnlockTime.into(),
            value,
        );
        self.submit(Command::SetUnlockTime, frame, decode_unlock_time)
    }
    
    fn submit<T, F>(&self, command: Command, frame: Frame, decode: F) -> CommandHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&[u8]) -> Result<T> + Send + 'static,
    {
        let Some(queue) = &self.queue else {
            warn!("{} rejected: service is shut down", command);
            return CommandHandle::ready(Err(Error::ServiceShutdown));
        };
        
        let (reply, handle) = CommandHandle::channel();
        
        trace!("Queueing {}: {}", command, frame);
        
        let job: Job = Box::new(move |transport| {
            let result = transport
                .send_and_receive(frame.as_bytes())
                .map_err(Error::from)
                .and_then(|bytes: Bytes| decode(&bytes));
            
            match &result {
                Ok(_) => debug!("{} completed", command),
                Err(e) => warn!("{} failed: {}", command, e),
            }
            
            // Receiver gone means the caller stopped caring
            let _ = reply.send(result);
        });
        
        // A dead worker drops the job and its sender; the handle reports it
        if queue.send(job).is_err() {
            warn!("{} dropped: worker is gone", command);
        }
        
        handle
    }
    
    /// Stop accepting commands, run everything already queued, then stop the worker
    ///
    /// Blocks until the queue is drained. Later submissions resolve with
    /// [`Error::ServiceShutdown`].
    ///
    /// # Blocking
    ///
    /// Joins the worker thread. From async code run it through
    /// `tokio::task::spawn_blocking`.
    pub fn shutdown(&mut self) {
        let Some(queue) = self.queue.take() else {
            return;
        };
        drop(queue);
        
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("CU16 worker panicked");
            }
        }
        
        info!("CU16 service stopped (cu_id={})", self.cu_id & 0x0F);
    }
}

impl Drop for Cu16Service {
    fn drop(&mut self) {
        if self.queue.take().is_some() {
            debug!("CU16 service dropped without shutdown, worker drains in background");
        }
    }
}

fn run_worker(
    transport: Arc<dyn Transport>,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    state: Arc<RwLock<ServiceState>>,
) {
    let _stopped = StoppedOnExit(state.clone());
    
    while let Some(job) = jobs.blocking_recv() {
        *state.write() = ServiceState::Busy;
        job(transport.as_ref());
        *state.write() = ServiceState::Idle;
    }
}

/// Marks the service stopped when the worker exits, including by panic
struct StoppedOnExit(Arc<RwLock<ServiceState>>);

impl Drop for StoppedOnExit {
    fn drop(&mut self) {
        *self.0.write() = ServiceState::Stopped;
    }
}

/// Take the first 9 bytes of a reply as a status frame
fn decode_status(reply: &[u8]) -> Result<Status> {
    let frame = first_frame(reply, frame_len::STATUS)?;
    Ok(parse_status(frame)?)
}

/// Take the first 7 bytes of a reply as the UNLOCK_TIME echo
fn decode_unlock_time(reply: &[u8]) -> Result<Frame> {
    let frame = Frame::decode(first_frame(reply, frame_len::TWO_DATA)?)?;
    
    if frame.command() != u8::from(Response::UnlockTime) {
        return Err(cu16_core::Error::UnexpectedOpcode(frame.command()).into());
    }
    
    Ok(frame)
}

fn first_frame(reply: &[u8], len: usize) -> Result<&[u8]> {
    if reply.is_empty() {
        return Err(cu16_transport::Error::NoResponse.into());
    }
    
    if reply.len() < len {
        return Err(Error::InvalidResponseLength {
            expected: len,
            actual: reply.len(),
        });
    }
    
    Ok(&reply[..len])
}
