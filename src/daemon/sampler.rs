//! Periodic collect+render loop and its stop/done handshake.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::error::AppError;

/// One unit of work executed per sampling interval.
pub trait Cycle: Send + Sync + 'static {
    fn run(&self) -> Result<(), AppError>;
}

/// How the sampling loop ended.
#[derive(Debug)]
pub enum LoopExit {
    /// A stop request was observed between cycles.
    Stopped,
    /// A cycle failed in a way that ends the daemon.
    Fatal(AppError),
}

/// Controller side: one stop request out, one done notification in.
pub struct ControllerHandshake {
    pub stop: oneshot::Sender<()>,
    pub done: oneshot::Receiver<LoopExit>,
}

/// Loop side of the handshake.
pub struct LoopHandshake {
    stop: oneshot::Receiver<()>,
    done: oneshot::Sender<LoopExit>,
}

#[cfg(test)]
impl LoopHandshake {
    pub(crate) fn into_parts(self) -> (oneshot::Receiver<()>, oneshot::Sender<LoopExit>) {
        (self.stop, self.done)
    }
}

/// Both channels hold at most one message, so a stop can be requested and
/// acknowledged exactly once.
pub fn handshake() -> (ControllerHandshake, LoopHandshake) {
    let (stop_tx, stop_rx) = oneshot::channel();
    let (done_tx, done_rx) = oneshot::channel();
    (
        ControllerHandshake {
            stop: stop_tx,
            done: done_rx,
        },
        LoopHandshake {
            stop: stop_rx,
            done: done_tx,
        },
    )
}

pub struct SamplingLoop<C: Cycle> {
    cycle: Arc<C>,
    interval: Duration,
}

impl<C: Cycle> SamplingLoop<C> {
    pub fn new(cycle: C, interval: Duration) -> Self {
        Self {
            cycle: Arc::new(cycle),
            interval,
        }
    }

    /// Run cycles until a stop request arrives or a cycle fails fatally.
    ///
    /// A stop request never interrupts a running cycle; it is observed
    /// right after the cycle or during the wait that follows it. The done
    /// notification is sent exactly once, after the last cycle.
    pub async fn run(self, handshake: LoopHandshake) {
        let LoopHandshake { mut stop, done } = handshake;
        let mut cycles: u64 = 0;

        let exit = loop {
            cycles += 1;
            debug!("Starting sampling cycle {}", cycles);

            if let Err(e) = self.run_cycle().await {
                if e.is_fatal() {
                    error!("Sampling cycle {} failed: {}", cycles, e);
                    break LoopExit::Fatal(e);
                }
                warn!("Sampling cycle {} failed: {}", cycles, e);
            }

            match stop.try_recv() {
                Ok(()) | Err(oneshot::error::TryRecvError::Closed) => break LoopExit::Stopped,
                Err(oneshot::error::TryRecvError::Empty) => {}
            }

            tokio::select! {
                _ = &mut stop => break LoopExit::Stopped,
                _ = tokio::time::sleep(self.interval) => {}
            }
        };

        info!("Sampling loop finished after {} cycle(s)", cycles);
        if done.send(exit).is_err() {
            debug!("Lifecycle controller no longer waiting for done");
        }
    }

    async fn run_cycle(&self) -> Result<(), AppError> {
        let cycle = Arc::clone(&self.cycle);
        tokio::task::spawn_blocking(move || cycle.run())
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?
    }
}
