use serde::{Serialize, Deserialize};
use std::f64::consts::{PI, TAU};

// Basic 2D vector type for positions and velocities on the torus.
#[derive(Copy, Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline(always)]
    pub fn new(x: f64, y: f64) -> Self { Self { x, y } }
    #[inline(always)]
    pub fn length_squared(self) -> f64 { self.x * self.x + self.y * self.y }
    #[inline(always)]
    pub fn length(self) -> f64 { self.length_squared().sqrt() }
    #[inline(always)]
    pub fn add(self, other: Self) -> Self { Self::new(self.x + other.x, self.y + other.y) }
    #[inline(always)]
    pub fn scale(self, scalar: f64) -> Self { Self::new(self.x * scalar, self.y * scalar) }

    /// Euclidean distance on an `l`-periodic square, each axis taking the
    /// shorter of the direct and wrapped separations.
    #[inline(always)]
    pub fn periodic_distance(self, other: Self, l: f64) -> f64 {
        let dx = periodic_delta(self.x, other.x, l);
        let dy = periodic_delta(self.y, other.y, l);
        (dx * dx + dy * dy).sqrt()
    }
}

#[inline(always)]
pub fn angle_to_vec(theta: f64) -> Vec2 { Vec2::new(theta.cos(), theta.sin()) }
#[inline(always)]
pub fn vec_to_angle(v: Vec2) -> f64 { v.y.atan2(v.x) }

/// Shortest separation along one periodic axis: `min(|a - b|, l - |a - b|)`.
#[inline(always)]
pub fn periodic_delta(a: f64, b: f64, l: f64) -> f64 {
    let d = (a - b).abs();
    d.min(l - d)
}

/// Mathematical modulo into `[0, l)`, also for negative inputs.
#[inline(always)]
pub fn wrap_coordinate(value: f64, l: f64) -> f64 {
    let wrapped = value.rem_euclid(l);
    // rem_euclid rounds to exactly `l` for tiny negative inputs
    if wrapped >= l { 0.0 } else { wrapped }
}

/// Normalizes an angle into `(-PI, PI]`.
#[inline(always)]
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = (theta + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
