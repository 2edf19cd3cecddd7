//! Daemon state machine: serves control signals and drives shutdown of
//! the sampling loop.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::daemon::sampler::{handshake, ControllerHandshake, Cycle, LoopExit, SamplingLoop};
use crate::daemon::settings::DaemonSettings;
use crate::daemon::signal::{pump_os_signals, LifecycleSignal};
use crate::error::DaemonError;

const LOG_SEPARATOR: &str = "- - - - - - - - - - - - - - -";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl LifecycleState {
    fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Starting, Running) | (Running, Stopping) | (Stopping, Stopped)
        )
    }
}

/// Whether the signal-serving task keeps going after a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

enum Event {
    Signal(Option<LifecycleSignal>),
    LoopDone(Result<LoopExit, oneshot::error::RecvError>),
}

pub struct LifecycleController {
    state: LifecycleState,
    stop: Option<oneshot::Sender<()>>,
    done: Option<oneshot::Receiver<LoopExit>>,
    shutdown_timeout: Duration,
    exit: Option<LoopExit>,
}

impl LifecycleController {
    pub fn new(handshake: ControllerHandshake, shutdown_timeout: Duration) -> Self {
        Self {
            state: LifecycleState::Starting,
            stop: Some(handshake.stop),
            done: Some(handshake.done),
            shutdown_timeout,
            exit: None,
        }
    }

    pub fn mark_running(&mut self) -> Result<(), DaemonError> {
        self.transition(LifecycleState::Running)
    }

    fn transition(&mut self, next: LifecycleState) -> Result<(), DaemonError> {
        if !self.state.can_transition_to(next) {
            return Err(DaemonError::InvalidStateTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// React to one control signal.
    ///
    /// Quit asks the loop to stop and waits for its done notification, up
    /// to the shutdown timeout. Stop asks and returns at once. Reload only
    /// logs.
    pub async fn handle(&mut self, signal: LifecycleSignal) -> Result<Flow, DaemonError> {
        match signal {
            LifecycleSignal::Reload => {
                info!("configuration reloaded");
                Ok(Flow::Continue)
            }
            LifecycleSignal::Quit | LifecycleSignal::Stop => {
                self.transition(LifecycleState::Stopping)?;
                info!("terminating...");
                self.request_stop();

                if signal == LifecycleSignal::Quit {
                    self.wait_for_done().await;
                } else {
                    self.take_finished_exit();
                }

                self.transition(LifecycleState::Stopped)?;
                Ok(Flow::Exit)
            }
        }
    }

    fn request_stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            // An Err means the loop already finished; done says how.
            let _ = stop.send(());
        }
    }

    /// Keep a fatal exit the loop already reported; a fast stop must not
    /// turn it into a clean one.
    fn take_finished_exit(&mut self) {
        if let Some(done) = self.done.as_mut() {
            if let Ok(exit) = done.try_recv() {
                self.exit = Some(exit);
                self.done = None;
            }
        }
    }

    async fn wait_for_done(&mut self) {
        let Some(done) = self.done.take() else {
            return;
        };

        match tokio::time::timeout(self.shutdown_timeout, done).await {
            Ok(Ok(exit)) => self.exit = Some(exit),
            Ok(Err(_)) => warn!("Sampling loop ended without reporting"),
            Err(_) => warn!(
                "Sampling loop did not finish within {:?}, stopping anyway",
                self.shutdown_timeout
            ),
        }
    }

    /// Serve signals until the daemon should exit, and report how the
    /// sampling loop ended.
    pub async fn serve(
        &mut self,
        mut signals: mpsc::Receiver<LifecycleSignal>,
    ) -> Result<LoopExit, DaemonError> {
        loop {
            let event = match self.done.as_mut() {
                // A finished loop wins over a signal arriving in the same poll.
                Some(done) => tokio::select! {
                    biased;
                    exit = done => Event::LoopDone(exit),
                    signal = signals.recv() => Event::Signal(signal),
                },
                None => Event::Signal(signals.recv().await),
            };

            match event {
                Event::Signal(Some(signal)) => {
                    if self.handle(signal).await? == Flow::Exit {
                        break;
                    }
                }
                Event::Signal(None) => {
                    warn!("Signal channel closed, stopping");
                    self.handle(LifecycleSignal::Stop).await?;
                    break;
                }
                Event::LoopDone(exit) => {
                    self.done = None;
                    self.transition(LifecycleState::Stopping)?;
                    self.transition(LifecycleState::Stopped)?;
                    return exit.map_err(|_| {
                        DaemonError::Runtime("sampling loop ended without reporting".to_string())
                    });
                }
            }
        }

        Ok(self.exit.take().unwrap_or(LoopExit::Stopped))
    }
}

/// Run the daemon body on the current runtime: start the sampling loop
/// in the background and serve OS signals until shutdown.
pub async fn run_daemon<C: Cycle>(
    cycle: C,
    settings: &DaemonSettings,
) -> Result<LoopExit, DaemonError> {
    info!("{}", LOG_SEPARATOR);
    info!("daemon started");

    let signals = pump_os_signals()?;
    let (controller_side, loop_side) = handshake();
    let mut controller = LifecycleController::new(controller_side, settings.shutdown_timeout);

    let sampler = SamplingLoop::new(cycle, settings.sample_interval);
    tokio::spawn(sampler.run(loop_side));
    controller.mark_running()?;

    let exit = controller.serve(signals).await;
    info!("daemon terminated");
    exit
}
