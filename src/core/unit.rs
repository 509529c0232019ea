//! Per-file monitoring task
//!
//! Every watched file gets its own tokio task that owns the file's
//! `WatchTarget`. The task waits on three things at once: the terminate
//! signal, pause/resume signals and its poll timer. Nothing is shared with
//! other units except the read-only config.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;
use crate::config::WatchConfig;
use super::target::{TargetStatus, UnitState, WatchTarget};
use super::trigger;

/// Pause/resume request sent to a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Pause,
    Resume,
}

/// The monitoring loop of one file. Consumed by [`WatchUnit::spawn`].
pub struct WatchUnit {
    target: WatchTarget,
    config: Arc<WatchConfig>,
    state: UnitState,
    signal_rx: mpsc::UnboundedReceiver<Signal>,
    terminate_rx: oneshot::Receiver<()>,
    status_tx: watch::Sender<TargetStatus>,
}

/// Control side of a unit, kept by the supervisor.
pub struct UnitHandle {
    pub id: u64,
    signal_tx: mpsc::UnboundedSender<Signal>,
    terminate_tx: Option<oneshot::Sender<()>>,
    status_rx: watch::Receiver<TargetStatus>,
    task: Option<JoinHandle<WatchTarget>>,
}

impl WatchUnit {
    pub fn new(target: WatchTarget, config: Arc<WatchConfig>) -> (Self, UnitHandle) {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (terminate_tx, terminate_rx) = oneshot::channel();
        let (status_tx, status_rx) = watch::channel(target.status(UnitState::Active));

        let handle = UnitHandle {
            id: target.id,
            signal_tx,
            terminate_tx: Some(terminate_tx),
            status_rx,
            task: None,
        };
        let unit = Self {
            target,
            config,
            state: UnitState::Active,
            signal_rx,
            terminate_rx,
            status_tx,
        };
        (unit, handle)
    }

    /// Start the loop on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<WatchTarget> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) -> WatchTarget {
        let period = self.config.interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                // A dropped sender terminates as well.
                _ = &mut self.terminate_rx => break,

                Some(signal) = self.signal_rx.recv() => self.apply(signal),

                _ = ticker.tick() => self.poll().await,
            }
        }

        drop(ticker);
        self.signal_rx.close();
        self.terminate_rx.close();
        self.state = UnitState::Terminated;
        self.publish();
        debug!("--- stopped watching ({}) {}", self.target.id, self.target.file_name);
        self.target
    }

    fn apply(&mut self, signal: Signal) {
        let next = match signal {
            Signal::Pause => UnitState::Paused,
            Signal::Resume => UnitState::Active,
        };
        if next != self.state {
            self.state = next;
            self.publish();
        }
    }

    /// One tick. While paused nothing is recorded, so a change made during the
    /// pause is still different from the stored time and fires on the first
    /// tick after resume.
    async fn poll(&mut self) {
        let metadata = match tokio::fs::metadata(&self.target.path).await {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!("file check error for ({}) {} ({})", self.target.id, self.target.file_name, err);
                return;
            }
        };

        if self.state != UnitState::Active {
            return;
        }

        match self.target.record(metadata) {
            Ok(true) => {
                debug!(" +++ file change: ({}) {}", self.target.id, self.target.file_name);
                self.publish();
                if let Err(err) = trigger::fire(&self.config).await {
                    debug!("Script error: {}", err);
                }
            }
            Ok(false) => {}
            Err(err) => {
                debug!("file check error for ({}) {} ({})", self.target.id, self.target.file_name, err);
            }
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.target.status(self.state));
    }
}

impl UnitHandle {
    /// Best effort, does not wait for the unit to act on it.
    pub fn signal(&self, signal: Signal) {
        if self.signal_tx.send(signal).is_err() {
            debug!("unit {} is no longer listening", self.id);
        }
    }

    /// Latest snapshot published by the unit
    pub fn status(&self) -> TargetStatus {
        self.status_rx.borrow().clone()
    }

    /// Receiver that is notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TargetStatus> {
        self.status_rx.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub(crate) fn attach(&mut self, task: JoinHandle<WatchTarget>) {
        self.task = Some(task);
    }

    /// Send the terminate signal without waiting. The unit stops before its
    /// next tick; a trigger already running finishes first.
    pub fn request_terminate(&mut self) {
        if let Some(tx) = self.terminate_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the unit's task to end.
    ///
    /// Returns the final target, or `None` if the unit was never started or
    /// has already been joined.
    pub async fn join(&mut self) -> Option<WatchTarget> {
        let task = self.task.take()?;
        match task.await {
            Ok(target) => Some(target),
            Err(err) => {
                debug!("unit {} ended abnormally: {}", self.id, err);
                None
            }
        }
    }

    /// Send the terminate signal and wait for the unit to close down.
    pub async fn terminate(&mut self) -> Option<WatchTarget> {
        self.request_terminate();
        self.join().await
    }
}
