use serde::{Deserialize, Serialize};
use crate::error::SimError;

/// Scalar inputs of one Vicsek run.
///
/// Build it with [`SimParams::new`], or as a struct literal (or from
/// [`crate::SimulationConfig`]) followed by [`SimParams::validate`]; the
/// simulation driver refuses unvalidated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Particle count N.
    pub num_particles: usize,
    /// Linear size L of the periodic square domain.
    pub domain_size: f64,
    /// Constant speed v0 shared by all particles.
    pub speed: f64,
    /// Noise amplitude eta, canonically in [0, 1].
    pub noise: f64,
    /// Interaction radius R0.
    pub interaction_radius: f64,
    pub dt: f64,
    /// Number of steps T; the trajectory holds T + 1 frames.
    pub steps: usize,
    /// RNG seed. `None` draws a fresh, non-reproducible generator.
    pub seed: Option<u64>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            num_particles: 200,
            domain_size: 20.0,
            speed: 0.2,
            noise: 0.1,
            interaction_radius: 1.0,
            dt: 1.0,
            steps: 200,
            seed: Some(3),
        }
    }
}

impl SimParams {
    /// Builds and validates a parameter set in one call.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num_particles: usize,
        domain_size: f64,
        speed: f64,
        noise: f64,
        interaction_radius: f64,
        dt: f64,
        steps: usize,
        seed: Option<u64>,
    ) -> Result<Self, SimError> {
        let params = Self { num_particles, domain_size, speed, noise, interaction_radius, dt, steps, seed };
        params.validate()?;
        Ok(params)
    }

    /// Rejects inputs that would make a run meaningless.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.num_particles == 0 {
            return Err(SimError::invalid("num_particles must be greater than 0"));
        }
        if !(self.domain_size.is_finite() && self.domain_size > 0.0) {
            return Err(SimError::invalid(format!("domain_size must be positive, got {}", self.domain_size)));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::invalid(format!("dt must be positive, got {}", self.dt)));
        }
        if !(self.interaction_radius >= 0.0) {
            return Err(SimError::invalid(format!(
                "interaction_radius must be non-negative, got {}", self.interaction_radius
            )));
        }
        if !(self.noise.is_finite() && self.noise >= 0.0) {
            return Err(SimError::invalid(format!("noise must be non-negative, got {}", self.noise)));
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(SimError::invalid(format!("speed must be non-negative, got {}", self.speed)));
        }
        Ok(())
    }

    /// Neighbor-grid cells per axis.
    pub fn grid_dim(&self) -> u32 {
        grid_dim_for(self.domain_size, self.interaction_radius, self.num_particles)
    }

    /// Edge length of one neighbor-grid cell, never smaller than R0.
    pub fn grid_cell_size(&self) -> f64 {
        self.domain_size / self.grid_dim() as f64
    }

    /// Simulated time reached after `step` steps.
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.dt
    }
}

/// Cells per axis for a periodic grid over an `l`-sized domain whose cells
/// must be at least `radius` wide, so that a 3x3 stencil sees every neighbor.
/// Capped near sqrt(n) to avoid mostly-empty grids for small radii.
pub fn grid_dim_for(l: f64, radius: f64, n: usize) -> u32 {
    let cap = ((n as f64).sqrt().ceil() as u32).max(1);
    if !(radius > 0.0) || !radius.is_finite() {
        return if radius.is_infinite() { 1 } else { cap };
    }
    // shave off a relative epsilon so that cells stay strictly wider than R0
    let by_radius = ((l / radius) * (1.0 - 1e-9)).floor();
    if by_radius < 1.0 {
        1
    } else {
        (by_radius as u32).clamp(1, cap)
    }
}
