// src/unit/mod.rs

//! Task units: event-sourced lifecycle plus dependency arithmetic.
//!
//! - [`event`] defines the lifecycle events.
//! - [`history`] replays an explicit history and enforces the lifecycle rules.
//! - [`projection`] continues an unfinished history to estimate an end date.
//! - [`prerequisites`] holds versioned dependency declarations.
//! - [`dependencies`] resolves true, stale and transitive dependencies and
//!   counts paths to them.
//! - [`task_unit`] ties the above together.

mod dependencies;
pub mod event;
pub mod history;
pub mod prerequisites;
mod projection;
pub mod task_unit;

pub use event::{EventKind, TaskEvent};
pub use history::LifecycleState;
pub use prerequisites::PrerequisitesIteration;
pub use task_unit::{TaskUnit, UnitDefinition};
