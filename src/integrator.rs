use vicsek_common::{Vec2, wrap_coordinate};

/// Moves `position` by `velocity * dt` and wraps both axes into `[0, l)`.
#[inline(always)]
pub fn advance(position: Vec2, velocity: Vec2, dt: f64, l: f64) -> Vec2 {
    let moved = position.add(velocity.scale(dt));
    Vec2::new(wrap_coordinate(moved.x, l), wrap_coordinate(moved.y, l))
}

/// Advances every particle, returning fresh x and y coordinate vectors.
pub fn advance_all(
    positions_x: &[f64],
    positions_y: &[f64],
    velocities: &[Vec2],
    dt: f64,
    l: f64,
) -> (Vec<f64>, Vec<f64>) {
    positions_x
        .iter()
        .zip(positions_y)
        .zip(velocities)
        .map(|((&x, &y), &v)| {
            let p = advance(Vec2::new(x, y), v, dt, l);
            (p.x, p.y)
        })
        .unzip()
}
