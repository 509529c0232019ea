//! Core functionality module
//!
//! Contains discovery, per-file watch units, the trigger and the supervisor

pub mod filter;
pub mod target;
pub mod discovery;
pub mod trigger;
pub mod unit;
pub mod supervisor;

// Re-export main types
pub use filter::{PathFilter, extension_of};
pub use target::{WatchTarget, TargetStatus, UnitState};
pub use discovery::{discover, Discovery};
pub use trigger::{fire, TriggerOutcome};
pub use unit::{Signal, UnitHandle, WatchUnit};
pub use supervisor::Supervisor;
