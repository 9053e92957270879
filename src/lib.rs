//! # Elevator Simulator
//!
//! A single elevator cabin and the logic deciding where it goes next, modelled
//! as two concurrent, timer-driven state machines.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use elevator_sim::{ElevatorSystem, SimulationConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let system = ElevatorSystem::start(&SimulationConfig::default()).await?;
//!
//! // Somebody on floor 3 calls the cabin, then presses 1 inside it
//! system.dispatch().external_request(3).await?;
//! system.dispatch().internal_request(1).await?;
//!
//! println!("{:?}", system.cabin().state().await?);
//! system.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`notifier`] - topic based fan-out of cabin state changes
//! - [`cabin`] - cabin state machine: floor, doors, step and door timers
//! - [`dispatch`] - request bookkeeping and pluggable dispatch strategies
//! - [`system`] - wires the pieces together
//! - [`config`] - physical parameters of the simulation
//! - [`input`] - console command parsing

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cabin;
pub mod config;
pub mod dispatch;
pub mod input;
pub mod notifier;
pub mod system;

// Re-export main public types for convenience
pub use cabin::{Cabin, CabinConfig, CabinHandle, CabinState, Direction};
pub use config::SimulationConfig;
pub use dispatch::{Action, DirectionalStrategy, DispatchHandle, DispatchStrategy, RequestSet};
pub use notifier::{NotificationBus, StateChange, CABIN_STATE_TOPIC};
pub use system::ElevatorSystem;
