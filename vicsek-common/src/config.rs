use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::error::SimError;
use crate::sim_params::SimParams;
use std::path::Path;

// Domain geometry
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UniverseConfig {
    pub domain_size: f64,
}

// Particle population, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ParticlesConfig {
    pub count: i64,
    pub speed: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

// Alignment rule parameters
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DynamicsConfig {
    pub noise: f64,
    pub interaction_radius: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub dt: f64,
    pub steps: i64,
    #[serde(default = "default_log_interval_steps")]
    pub log_interval_steps: u32,
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
    #[serde(default = "default_true")]
    pub save_order_parameter_csv: bool,
    #[serde(default)]
    pub save_final_positions: bool,
}

fn default_log_interval_steps() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub universe: UniverseConfig,
    pub particles: ParticlesConfig,
    pub dynamics: DynamicsConfig,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)?;
        Ok(config)
    }

    /// Converts the configuration into validated simulation parameters.
    pub fn sim_params(&self) -> Result<SimParams, SimError> {
        if self.particles.count <= 0 {
            return Err(SimError::invalid(format!(
                "particles.count must be greater than 0, got {}", self.particles.count
            )));
        }
        if self.timing.steps < 0 {
            return Err(SimError::invalid(format!(
                "timing.steps must be non-negative, got {}", self.timing.steps
            )));
        }
        let params = SimParams {
            num_particles: usize::try_from(self.particles.count)
                .map_err(|_| SimError::invalid("particles.count does not fit in usize"))?,
            domain_size: self.universe.domain_size,
            speed: self.particles.speed,
            noise: self.dynamics.noise,
            interaction_radius: self.dynamics.interaction_radius,
            dt: self.timing.dt,
            steps: usize::try_from(self.timing.steps)
                .map_err(|_| SimError::invalid("timing.steps does not fit in usize"))?,
            seed: self.particles.seed,
        };
        params.validate()?;
        Ok(params)
    }
}
