pub mod config;
pub mod error;
pub mod sim_params;
pub mod trajectory;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{SimulationConfig, UniverseConfig, ParticlesConfig, DynamicsConfig, TimingConfig, OutputConfig};
pub use error::SimError;
pub use sim_params::{SimParams, grid_dim_for};
pub use trajectory::{Frame, Trajectory};
pub use vecmath::{Vec2, angle_to_vec, vec_to_angle, periodic_delta, wrap_coordinate, wrap_angle};
