/// Decimal digits kept by [`order_parameter`].
pub const ORDER_PARAMETER_DIGITS: i32 = 10;

/// Global polarization `|sum(cos, sin)| / N`, rounded to
/// [`ORDER_PARAMETER_DIGITS`] decimals. `1` means all headings agree,
/// values near `0` mean disorder. An empty slice yields `0`.
pub fn order_parameter(headings: &[f64]) -> f64 {
    if headings.is_empty() {
        return 0.0;
    }
    let (sx, sy) = headings
        .iter()
        .fold((0.0f64, 0.0f64), |(sx, sy), &theta| (sx + theta.cos(), sy + theta.sin()));
    let phi = (sx * sx + sy * sy).sqrt() / headings.len() as f64;
    round_to_digits(phi, ORDER_PARAMETER_DIGITS)
}

#[inline]
fn round_to_digits(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    #[test]
    fn reference_headings() {
        let theta = [-0.5, 1.5, 1.8, 2.2, -1.0, 0.7, 2.3, 2.1, -0.7, 2.5];
        assert!((order_parameter(&theta) - 0.3673557583).abs() < 1e-9);
    }

    #[test]
    fn equal_headings_are_fully_ordered() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in [1usize, 10, 137, 500] {
            let theta = vec![PI * (2.0 * rng.random::<f64>() - 1.0); n];
            assert!((order_parameter(&theta) - 1.0).abs() < 1e-9);
            assert!(order_parameter(&theta) <= 1.0);
        }
    }

    #[test]
    fn opposite_pairs_cancel() {
        let mut theta = Vec::new();
        for k in 0..50 {
            let a = -PI + 0.03 + k as f64 * 0.1;
            theta.push(a);
            theta.push(a + PI);
        }
        assert!(order_parameter(&theta).abs() < 1e-9);
    }

    #[test]
    fn random_headings_stay_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(8);
        for n in [10usize, 100, 1000] {
            let theta: Vec<f64> = (0..n).map(|_| PI * (2.0 * rng.random::<f64>() - 1.0)).collect();
            let phi = order_parameter(&theta);
            assert!((0.0..=1.0).contains(&phi));
        }
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(order_parameter(&[]), 0.0);
    }
}
