//! Discrete-event simulation for the Virtual World tile grid.
//!
//! Every behaviour is an [`Action`] queued on the [`EventScheduler`] at a
//! simulated due time. Dispatching an action runs the owning entity's rule,
//! which mutates the [`vw_core::WorldModel`] and queues whatever comes next.
//! The [`Simulation`] bundles the pieces for drivers.

/// Animation and activity actions.
pub mod action;
/// Per-kind activity rules.
pub mod activity;
/// Simulated time.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to actions.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Single-step movement toward a target.
pub mod movement;
/// Time-ordered event queue with per-entity cancellation.
pub mod scheduler;
/// Top-level simulation orchestrator.
pub mod simulation;

#[cfg(test)]
mod test_support;

/// Re-exports of [`action::Action`] and [`action::Repeat`].
pub use action::{Action, Repeat};
/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-exports of [`config::SimConfig`] and [`config::RulesConfig`].
pub use config::{RulesConfig, SimConfig};
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of [`scheduler::Event`] and [`scheduler::EventScheduler`].
pub use scheduler::{Event, EventScheduler};
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
