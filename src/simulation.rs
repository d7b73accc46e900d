use crate::alignment::mean_neighbor_angles_with_grid;
use crate::grid::PeriodicGrid;
use crate::integrator::advance_all;
use crate::noise::apply_noise;
use crate::order::order_parameter;
use crate::state::Configuration;
use log::{debug, error, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use vicsek_common::{SimError, SimParams, Trajectory, Vec2};

/// Slack allowed on the order parameter beyond `[0, 1]` before it counts as a defect.
const ORDER_PARAMETER_TOLERANCE: f64 = 1e-9;

/// Lifecycle of a run. `new` performs INIT; there is no way back from `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPhase {
    /// Steps `1..=T` remain to be taken.
    Stepping,
    /// All T steps are recorded.
    Done,
}

/// Drives a Vicsek run and records its trajectory.
///
/// Each step produces a new [`Configuration`]; the previous one is only read
/// while the next is computed, so every particle's update sees the same
/// snapshot.
pub struct VicsekSimulation {
    params: SimParams,
    /// Single generator for initial placement and all per-step noise.
    rng: StdRng,
    state: Configuration,
    /// Velocities derived from the current headings, used by the next step.
    velocities: Vec<Vec2>,
    current_step: usize,
    trajectory: Trajectory,
}

impl VicsekSimulation {
    /// Validates `params`, draws the initial configuration and records frame 0.
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        params.validate()?;

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let state = Configuration::initialize(params.num_particles, params.domain_size, &mut rng)?;
        let velocities = state.velocities(params.speed);
        debug!(
            "Initialized {} particles on a {}x{} torus (grid {}x{}, cell size {:.4}).",
            params.num_particles,
            params.domain_size,
            params.domain_size,
            params.grid_dim(),
            params.grid_dim(),
            params.grid_cell_size()
        );

        let mut sim = Self {
            trajectory: Trajectory::with_capacity(params.clone()),
            params,
            rng,
            state,
            velocities,
            current_step: 0,
        };
        sim.record_current()?;
        Ok(sim)
    }

    pub fn phase(&self) -> SimPhase {
        if self.current_step >= self.params.steps { SimPhase::Done } else { SimPhase::Stepping }
    }

    /// Advances the simulation by one step.
    ///
    /// Order: move with the previous velocities, find neighbors on the new
    /// positions, align to the previous headings, add noise, derive the
    /// velocities for the following step, record the frame.
    pub fn step(&mut self) -> Result<(), SimError> {
        if self.phase() == SimPhase::Done {
            return Err(SimError::AlreadyComplete { steps: self.params.steps });
        }
        let step = self.current_step + 1;
        let params = &self.params;

        // --- 1. Integrate positions ---
        let (positions_x, positions_y) = advance_all(
            &self.state.positions_x,
            &self.state.positions_y,
            &self.velocities,
            params.dt,
            params.domain_size,
        );

        // --- 2. Align: new positions, headings still from the previous step ---
        let snapshot = Configuration {
            positions_x,
            positions_y,
            headings: self.state.headings.clone(),
        };
        let grid = PeriodicGrid::for_params(&snapshot.positions_x, &snapshot.positions_y, params);
        let mean_angles = mean_neighbor_angles_with_grid(&snapshot, &grid, params.interaction_radius);

        // --- 3. Noise (serial, index order) ---
        let headings = apply_noise(&mean_angles, params.noise, &mut self.rng)?;

        let next = Configuration {
            positions_x: snapshot.positions_x,
            positions_y: snapshot.positions_y,
            headings,
        };

        // --- 4. Velocities for the next step ---
        self.velocities = next.velocities(params.speed);
        self.state = next;
        self.current_step = step;

        // --- 5. Record ---
        self.record_current()
    }

    /// Runs all remaining steps and returns the complete trajectory.
    ///
    /// On failure the partial trajectory is dropped with the simulation.
    pub fn run(mut self) -> Result<Trajectory, SimError> {
        while self.phase() == SimPhase::Stepping {
            self.step()?;
            trace!("Step {}/{} phi = {:.6}", self.current_step, self.params.steps, self.order_parameter());
        }
        Ok(self.trajectory)
    }

    /// Consumes a finished simulation, yielding its trajectory.
    pub fn into_trajectory(self) -> Result<Trajectory, SimError> {
        match self.phase() {
            SimPhase::Done => Ok(self.trajectory),
            SimPhase::Stepping => Err(SimError::InvalidArgument(format!(
                "trajectory requested after {} of {} steps",
                self.current_step, self.params.steps
            ))),
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn state(&self) -> &Configuration {
        &self.state
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Order parameter of the most recently recorded frame.
    pub fn order_parameter(&self) -> f64 {
        self.trajectory.final_order_parameter().unwrap_or(0.0)
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Checks the step invariants on the current state and appends its frame.
    fn record_current(&mut self) -> Result<(), SimError> {
        let step = self.current_step;
        check_positions(&self.state, self.params.domain_size, step)?;
        let phi = order_parameter(&self.state.headings);
        check_order_parameter(phi, step)?;
        self.trajectory.push_frame(self.state.position_pairs(), self.state.headings.clone(), phi);
        Ok(())
    }
}

/// Runs a full simulation for `params`.
pub fn simulate(params: SimParams) -> Result<Trajectory, SimError> {
    VicsekSimulation::new(params)?.run()
}

fn check_positions(state: &Configuration, l: f64, step: usize) -> Result<(), SimError> {
    let outside = |v: f64| !(v >= 0.0 && v < l);
    for (idx, (&x, &y)) in state.positions_x.iter().zip(&state.positions_y).enumerate() {
        if outside(x) || outside(y) {
            error!("Particle {} left the domain at step {}: ({}, {}) with L = {}", idx, step, x, y, l);
            return Err(SimError::InvariantViolation {
                step,
                detail: format!("particle {} at ({}, {}) outside [0, {})", idx, x, y, l),
            });
        }
    }
    Ok(())
}

fn check_order_parameter(phi: f64, step: usize) -> Result<(), SimError> {
    if !(phi >= -ORDER_PARAMETER_TOLERANCE && phi <= 1.0 + ORDER_PARAMETER_TOLERANCE) {
        error!("Order parameter {} out of [0, 1] at step {}", phi, step);
        return Err(SimError::InvariantViolation {
            step,
            detail: format!("order parameter {} outside [0, 1]", phi),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn small_params() -> SimParams {
        SimParams {
            num_particles: 40,
            domain_size: 5.0,
            speed: 0.3,
            noise: 0.5,
            interaction_radius: 1.0,
            dt: 1.0,
            steps: 10,
            seed: Some(12),
        }
    }

    #[test]
    fn init_records_frame_zero() {
        let sim = VicsekSimulation::new(small_params()).unwrap();
        assert_eq!(sim.current_step(), 0);
        assert_eq!(sim.phase(), SimPhase::Stepping);
        assert_eq!(sim.trajectory().len(), 1);
        let expected = Configuration::from_seed(40, 5.0, 12).unwrap();
        assert_eq!(sim.state(), &expected);
        assert_eq!(sim.trajectory().headings[0], expected.headings);
        assert_eq!(sim.order_parameter(), order_parameter(&expected.headings));
    }

    #[test]
    fn steps_until_done_then_refuses() {
        let mut sim = VicsekSimulation::new(small_params()).unwrap();
        for _ in 0..10 {
            sim.step().unwrap();
        }
        assert_eq!(sim.phase(), SimPhase::Done);
        assert_eq!(sim.step(), Err(SimError::AlreadyComplete { steps: 10 }));
        let trajectory = sim.into_trajectory().unwrap();
        assert_eq!(trajectory.len(), 11);
    }

    #[test]
    fn trajectory_unavailable_mid_run() {
        let mut sim = VicsekSimulation::new(small_params()).unwrap();
        sim.step().unwrap();
        assert!(matches!(sim.into_trajectory(), Err(SimError::InvalidArgument(_))));
    }

    #[test]
    fn zero_steps_is_immediately_done() {
        let params = SimParams { steps: 0, ..small_params() };
        let trajectory = simulate(params).unwrap();
        assert_eq!(trajectory.len(), 1);
    }

    #[test]
    fn invalid_params_fail_before_any_step() {
        let params = SimParams { dt: -1.0, ..small_params() };
        assert!(matches!(VicsekSimulation::new(params), Err(SimError::InvalidArgument(_))));
    }

    #[test]
    fn step_moves_with_previous_velocity() {
        // no noise, radius 0: headings never change, particles drift in straight lines
        let params = SimParams { noise: 0.0, interaction_radius: 0.0, steps: 3, ..small_params() };
        let mut sim = VicsekSimulation::new(params.clone()).unwrap();
        let before = sim.state().clone();
        sim.step().unwrap();
        let after = sim.state();
        for i in 0..before.len() {
            let v = crate::state::velocity_from_heading(params.speed, before.headings[i]);
            let expected = crate::integrator::advance(before.position(i), v, params.dt, params.domain_size);
            assert!((after.positions_x[i] - expected.x).abs() < 1e-12);
            assert!((after.positions_y[i] - expected.y).abs() < 1e-12);
            assert!((after.headings[i] - before.headings[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_noise_full_radius_aligns_in_one_step() {
        let params = SimParams { noise: 0.0, interaction_radius: 100.0, steps: 1, ..small_params() };
        let trajectory = simulate(params).unwrap();
        assert!((trajectory.order_parameter[1] - 1.0).abs() < 1e-9);
        let first = trajectory.headings[1][0];
        assert!(trajectory.headings[1].iter().all(|&t| (t - first).abs() < 1e-12));
    }

    #[test]
    fn position_check_rejects_escaped_particle() {
        let state = Configuration { positions_x: vec![1.0, 5.0], positions_y: vec![1.0, 1.0], headings: vec![0.0, 0.0] };
        let err = check_positions(&state, 5.0, 4).unwrap_err();
        assert!(err.is_defect());
        assert!(matches!(err, SimError::InvariantViolation { step: 4, .. }));
        let state = Configuration { positions_x: vec![-1e-12], positions_y: vec![1.0], headings: vec![PI] };
        assert!(check_positions(&state, 5.0, 0).is_err());
    }

    #[test]
    fn order_parameter_check_allows_rounding_only() {
        assert!(check_order_parameter(1.0, 0).is_ok());
        assert!(check_order_parameter(0.0, 0).is_ok());
        assert!(check_order_parameter(1.0 + 1e-12, 0).is_ok());
        assert!(check_order_parameter(1.01, 2).unwrap_err().is_defect());
        assert!(check_order_parameter(f64::NAN, 2).is_err());
    }
}
