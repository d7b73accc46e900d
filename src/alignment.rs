//! Circular-mean alignment rule.
//!
//! Every particle takes the mean heading of the particles within the
//! interaction radius, itself included. Headings are averaged on the unit
//! circle (`atan2(mean sin, mean cos)`) so that angles near `+PI` and `-PI`
//! reinforce instead of cancelling.

use rayon::prelude::*;
use crate::grid::PeriodicGrid;
use crate::state::Configuration;

/// Circular mean of a set of angles, `None` if the set is empty.
pub fn circular_mean<I>(angles: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum_sin = 0.0;
    let mut sum_cos = 0.0;
    let mut count = 0usize;
    for theta in angles {
        sum_sin += theta.sin();
        sum_cos += theta.cos();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some((sum_sin / n).atan2(sum_cos / n))
}

/// Mean neighbor heading for every particle of `config`.
///
/// Builds a fresh neighbor grid from the snapshot's positions.
pub fn mean_neighbor_angles(config: &Configuration, radius: f64, domain_size: f64) -> Vec<f64> {
    let grid = PeriodicGrid::build(&config.positions_x, &config.positions_y, domain_size, radius);
    mean_neighbor_angles_with_grid(config, &grid, radius)
}

/// Same as [`mean_neighbor_angles`] against an already built grid.
///
/// `config` is only read; results go to a new vector, one slot per particle,
/// so the parallel evaluation is independent of scheduling. Neighbor
/// contributions are summed in ascending index order.
pub fn mean_neighbor_angles_with_grid(config: &Configuration, grid: &PeriodicGrid, radius: f64) -> Vec<f64> {
    let headings = &config.headings;
    let positions_x = &config.positions_x;
    let positions_y = &config.positions_y;

    (0..config.len())
        .into_par_iter()
        .map_init(Vec::new, |neighbors, idx| {
            grid.find_neighbors_into(config.position(idx), radius, positions_x, positions_y, neighbors);
            // the particle always counts itself, so this only falls back on NaN radii
            circular_mean(neighbors.iter().map(|&j| headings[j])).unwrap_or(headings[idx])
        })
        .collect()
}
