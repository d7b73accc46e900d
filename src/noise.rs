use rand::Rng;
use rand_distr::Uniform;
use vicsek_common::{SimError, wrap_angle};

/// Perturbs each heading by `eta * (u - 0.5)` with `u ~ U[0, 1)`.
///
/// Draws exactly one sample per particle, in index order, so a seeded
/// generator reproduces the same sequence. Results are normalized into
/// `(-PI, PI]`.
pub fn apply_noise<R: Rng + ?Sized>(mean_angles: &[f64], eta: f64, rng: &mut R) -> Result<Vec<f64>, SimError> {
    if !(eta.is_finite() && eta >= 0.0) {
        return Err(SimError::InvalidArgument(format!("noise amplitude must be non-negative, got {}", eta)));
    }
    let unit_dist = Uniform::new(0.0f64, 1.0).map_err(|e| SimError::InvalidArgument(e.to_string()))?;
    Ok(mean_angles
        .iter()
        .map(|&theta| wrap_angle(theta + eta * (rng.sample(&unit_dist) - 0.5)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    #[test]
    fn zero_noise_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let angles = [0.0, 1.0, -2.5, PI];
        let out = apply_noise(&angles, 0.0, &mut rng).unwrap();
        for (a, b) in angles.iter().zip(&out) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn perturbation_is_bounded_by_half_eta() {
        let mut rng = StdRng::seed_from_u64(2);
        let angles = vec![0.5; 1000];
        let eta = 0.8;
        for theta in apply_noise(&angles, eta, &mut rng).unwrap() {
            assert!((theta - 0.5).abs() <= eta / 2.0 + 1e-12);
        }
    }

    #[test]
    fn consumes_one_draw_per_particle() {
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);
        let _ = apply_noise(&[0.0; 7], 1.0, &mut a).unwrap();
        for _ in 0..7 {
            let _: f64 = b.sample(Uniform::new(0.0f64, 1.0).unwrap());
        }
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }

    #[test]
    fn results_are_wrapped_into_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let angles = vec![PI - 0.01; 500];
        for theta in apply_noise(&angles, 1.0, &mut rng).unwrap() {
            assert!(theta > -PI && theta <= PI);
        }
    }

    #[test]
    fn negative_eta_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(apply_noise(&[0.0], -0.1, &mut rng), Err(SimError::InvalidArgument(_))));
    }
}
