use std::sync::Arc;
use tracing::debug;
use crate::config::WatchConfig;
use crate::error::TriggerError;
use super::target::{TargetStatus, WatchTarget};
use super::trigger::{self, TriggerOutcome};
use super::unit::{Signal, UnitHandle, WatchUnit};

/// Owns every watch unit and fans control signals out to them.
pub struct Supervisor {
    config: Arc<WatchConfig>,
    handles: Vec<UnitHandle>,
    /// Units built but not started yet
    pending: Vec<WatchUnit>,
}

impl Supervisor {
    pub fn new(config: Arc<WatchConfig>, targets: Vec<WatchTarget>) -> Self {
        let mut handles = Vec::with_capacity(targets.len());
        let mut pending = Vec::with_capacity(targets.len());
        for target in targets {
            let (unit, handle) = WatchUnit::new(target, Arc::clone(&config));
            handles.push(handle);
            pending.push(unit);
        }
        Self { config, handles, pending }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Spawn the loop of every unit not started yet. Must be called from
    /// within a tokio runtime.
    pub fn start_all(&mut self) {
        for (handle, unit) in self.handles.iter_mut().zip(self.pending.drain(..)) {
            handle.attach(unit.spawn());
        }
        debug!(
            "+++ monitoring {} files at interval {:?}",
            self.handles.len(),
            self.config.interval
        );
    }

    pub fn pause_all(&self) {
        self.broadcast(Signal::Pause);
        debug!("+++ stopped monitoring {} files", self.handles.len());
    }

    pub fn resume_all(&self) {
        self.broadcast(Signal::Resume);
        debug!("+++ monitoring {} files at interval {:?}", self.handles.len(), self.config.interval);
    }

    fn broadcast(&self, signal: Signal) {
        for handle in &self.handles {
            handle.signal(signal);
        }
    }

    /// Signal every unit to terminate, then wait until each has closed down.
    /// Calling it again is a no-op.
    pub async fn terminate_all(&mut self) -> Vec<WatchTarget> {
        self.pending.clear();
        for handle in &mut self.handles {
            handle.request_terminate();
        }

        let mut finished = Vec::with_capacity(self.handles.len());
        for handle in &mut self.handles {
            if let Some(target) = handle.join().await {
                finished.push(target);
            }
        }
        debug!("+++ terminated {} units", finished.len());
        finished
    }

    /// Snapshot of every target, in id order
    pub fn list(&self) -> Vec<TargetStatus> {
        self.handles.iter().map(UnitHandle::status).collect()
    }

    pub fn count(&self) -> usize {
        self.handles.len()
    }

    pub fn handles(&self) -> &[UnitHandle] {
        &self.handles
    }

    /// Run the action once, independent of any change.
    pub async fn fire(&self) -> Result<TriggerOutcome, TriggerError> {
        trigger::fire(&self.config).await
    }
}
