use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Uniform;
use std::f64::consts::{PI, TAU};
use vicsek_common::{SimError, Vec2, angle_to_vec};

/// Positions and headings of all particles at one instant.
///
/// Stored as structure-of-arrays; index `i` in every vector refers to the
/// same particle. Positions lie in `[0, L)`, headings in `(-PI, PI]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub positions_x: Vec<f64>,
    pub positions_y: Vec<f64>,
    pub headings: Vec<f64>,
}

impl Configuration {
    /// Draws a uniformly random configuration on an `l`-sized torus.
    ///
    /// Consumes exactly `3 * n` draws from `rng`: all x, then all y, then all
    /// headings.
    pub fn initialize<R: Rng + ?Sized>(n: usize, l: f64, rng: &mut R) -> Result<Self, SimError> {
        if n == 0 {
            return Err(SimError::InvalidArgument("particle count must be greater than 0".into()));
        }
        if !(l.is_finite() && l > 0.0) {
            return Err(SimError::InvalidArgument(format!("domain size must be positive, got {}", l)));
        }
        let coord_dist = Uniform::new(0.0, l)
            .map_err(|e| SimError::InvalidArgument(format!("domain size {}: {}", l, e)))?;
        let unit_dist = Uniform::new(0.0, 1.0)
            .map_err(|e| SimError::InvalidArgument(e.to_string()))?;

        let positions_x: Vec<f64> = (0..n).map(|_| rng.sample(&coord_dist)).collect();
        let positions_y: Vec<f64> = (0..n).map(|_| rng.sample(&coord_dist)).collect();
        // u in [0, 1) maps onto (-PI, PI]
        let headings: Vec<f64> = (0..n).map(|_| PI - TAU * rng.sample(&unit_dist)).collect();

        Ok(Self { positions_x, positions_y, headings })
    }

    /// Same as [`Configuration::initialize`] with a generator seeded from `seed`.
    pub fn from_seed(n: usize, l: f64, seed: u64) -> Result<Self, SimError> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::initialize(n, l, &mut rng)
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    #[inline(always)]
    pub fn position(&self, idx: usize) -> Vec2 {
        Vec2::new(self.positions_x[idx], self.positions_y[idx])
    }

    /// Velocities `v0 * (cos theta, sin theta)` for every particle.
    pub fn velocities(&self, speed: f64) -> Vec<Vec2> {
        self.headings.iter().map(|&theta| velocity_from_heading(speed, theta)).collect()
    }

    /// Positions as `[x, y]` pairs, the layout stored in a trajectory frame.
    pub fn position_pairs(&self) -> Vec<[f64; 2]> {
        self.positions_x
            .iter()
            .zip(self.positions_y.iter())
            .map(|(&x, &y)| [x, y])
            .collect()
    }
}

/// Velocity of a particle moving at `speed` along `theta`.
#[inline(always)]
pub fn velocity_from_heading(speed: f64, theta: f64) -> Vec2 {
    angle_to_vec(theta).scale(speed)
}
