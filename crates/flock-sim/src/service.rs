//! Run a flock on its own thread, driven by control messages.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info};

use flock_core::{Agent, ForceCoefficients};
use flock_forces::StepChunk;
use flock_schedule::ExecutionUnit;

use crate::{
    ChannelObserver, ControlMessage, Flock, FlockBuilder, PoseFrame, SimError, SimResult,
};

/// How often the service thread checks for finished steps while no control
/// message arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

enum ServiceCommand {
    Control(ControlMessage),
    Shutdown,
}

/// A flock running on a dedicated thread.
///
/// The owner sends [`ControlMessage`]s and reads [`PoseFrame`]s; neither
/// side ever blocks on the other.  Dropping the service stops the thread
/// and joins it.
pub struct FlockService {
    tx:     Sender<ServiceCommand>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FlockService {
    /// Build the flock described by `builder` and start it.  Returns the
    /// service and the receiving end of its pose stream.
    pub fn spawn(builder: FlockBuilder) -> SimResult<(Self, Receiver<PoseFrame>)> {
        let (frames_tx, frames_rx) = mpsc::channel();
        let flock = builder.build(ChannelObserver::new(frames_tx))?;
        Ok((Self::start(flock)?, frames_rx))
    }

    /// Start an already-built flock.
    pub fn start<U>(mut flock: Flock<U, ChannelObserver>) -> SimResult<Self>
    where
        U: ExecutionUnit<Input = StepChunk, Output = Vec<Agent>> + 'static,
    {
        let (tx, rx) = mpsc::channel::<ServiceCommand>();
        let handle = thread::Builder::new()
            .name("flock-service".into())
            .spawn(move || {
                info!(agents = flock.len(), "flock service started");
                loop {
                    match rx.recv_timeout(POLL_INTERVAL) {
                        Ok(ServiceCommand::Control(message)) => {
                            if let Err(err) = flock.handle(message) {
                                error!(?message, error = %err, "control message failed");
                            }
                        }
                        Ok(ServiceCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                            break;
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                    if let Err(err) = flock.poll() {
                        error!(error = %err, "step failed");
                    }
                }
                info!(steps = flock.steps(), "flock service stopped");
            })
            .map_err(SimError::Spawn)?;
        Ok(Self { tx, handle: Some(handle) })
    }

    pub fn send(&self, message: ControlMessage) -> SimResult<()> {
        self.tx
            .send(ServiceCommand::Control(message))
            .map_err(|_| SimError::ServiceStopped)
    }

    pub fn resize(&self, n: usize) -> SimResult<()> {
        self.send(ControlMessage::Resize(n))
    }

    pub fn set_coefficients(&self, coefficients: ForceCoefficients) -> SimResult<()> {
        self.send(ControlMessage::SetCoefficients(coefficients))
    }

    pub fn advance(&self) -> SimResult<()> {
        self.send(ControlMessage::Advance)
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.tx.send(ServiceCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.join() {
                error!("flock service thread panicked: {err:?}");
            } else {
                debug!("flock service joined");
            }
        }
    }
}

impl Drop for FlockService {
    fn drop(&mut self) {
        self.stop();
    }
}
