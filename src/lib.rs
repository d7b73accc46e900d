//! Vicsek model of collective motion on a periodic 2D domain.
//!
//! The engine is split along the steps of the model: [`state`] draws the
//! initial configuration, [`grid`] answers periodic radius queries,
//! [`alignment`] and [`noise`] update headings, [`integrator`] moves
//! particles, [`order`] measures polarization and [`simulation`] sequences
//! them into a trajectory. [`output`] persists finished trajectories.

pub mod alignment;
pub mod grid;
pub mod integrator;
pub mod noise;
pub mod order;
pub mod output;
pub mod simulation;
pub mod state;

pub use simulation::{SimPhase, VicsekSimulation, simulate};
pub use state::Configuration;
pub use vicsek_common::{Frame, SimError, SimParams, SimulationConfig, Trajectory, Vec2};
