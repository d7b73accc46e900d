use rayon::prelude::*;
use vicsek_common::{SimParams, Vec2, grid_dim_for, periodic_delta, wrap_coordinate};

// Calculates the (column, row) grid cell for a position inside [0, L)^2
#[inline(always)]
fn get_grid_cell(pos: Vec2, inv_cell_size: f64, grid_dim: u32) -> (u32, u32) {
    let grid_x = (pos.x * inv_cell_size).floor().max(0.0) as u32;
    let grid_y = (pos.y * inv_cell_size).floor().max(0.0) as u32;
    // Clamp to grid dimensions to handle coordinates rounding up to L
    (grid_x.min(grid_dim - 1), grid_y.min(grid_dim - 1))
}

/// Cell-list index over particle positions on an `L`-periodic square.
///
/// Particles are bucketed with a counting sort: `cell_starts[c]` is the offset
/// of cell `c` inside `cell_particle_indices`, `cell_counts[c]` the number of
/// particles it holds. Within a cell, particle indices are ascending. The grid
/// borrows nothing; it is rebuilt from a positions snapshot whenever positions
/// change.
#[derive(Debug, Clone)]
pub struct PeriodicGrid {
    domain_size: f64,
    grid_dim: u32,
    inv_grid_cell_size: f64,
    // Grid cell index for each particle
    particle_grid_indices: Vec<u32>,
    // Number of particles in each grid cell
    cell_counts: Vec<u32>,
    // Start index in cell_particle_indices for each grid cell (prefix sum)
    cell_starts: Vec<u32>,
    // Particle indices sorted by grid cell
    cell_particle_indices: Vec<u32>,
}

impl PeriodicGrid {
    /// Builds the index for the given positions with cells sized for
    /// queries of `radius`.
    pub fn build(positions_x: &[f64], positions_y: &[f64], domain_size: f64, radius: f64) -> Self {
        let grid_dim = grid_dim_for(domain_size, radius, positions_x.len());
        Self::with_dim(positions_x, positions_y, domain_size, grid_dim)
    }

    pub fn for_params(positions_x: &[f64], positions_y: &[f64], params: &SimParams) -> Self {
        Self::with_dim(positions_x, positions_y, params.domain_size, params.grid_dim())
    }

    fn with_dim(positions_x: &[f64], positions_y: &[f64], domain_size: f64, grid_dim: u32) -> Self {
        debug_assert_eq!(positions_x.len(), positions_y.len());
        let num_particles = positions_x.len().min(positions_y.len());
        let grid_dim = grid_dim.max(1);
        let num_grid_cells = (grid_dim * grid_dim) as usize;
        let inv_grid_cell_size = grid_dim as f64 / domain_size;

        // Phase 1: Assign grid indices to each particle (Parallel).
        let mut particle_grid_indices = vec![0u32; num_particles];
        particle_grid_indices
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, grid_idx_out)| {
                let pos = Vec2::new(positions_x[idx], positions_y[idx]);
                let (cx, cy) = get_grid_cell(pos, inv_grid_cell_size, grid_dim);
                *grid_idx_out = cy * grid_dim + cx;
            });

        // Phase 2: Count particles in each grid cell (Serial).
        let mut cell_counts = vec![0u32; num_grid_cells];
        for &grid_idx in &particle_grid_indices {
            cell_counts[grid_idx as usize] += 1;
        }

        // Phase 3: Cell start indices via prefix sum over the counts.
        let mut cell_starts = vec![0u32; num_grid_cells];
        let mut total_sum = 0;
        for (start, &count) in cell_starts.iter_mut().zip(&cell_counts) {
            *start = total_sum;
            total_sum += count;
        }
        debug_assert_eq!(total_sum as usize, num_particles);

        // Phase 4: Scatter particle indices in index order, keeping each cell ascending.
        let mut write_offsets = cell_starts.clone();
        let mut cell_particle_indices = vec![0u32; num_particles];
        for (particle_idx, &grid_idx) in particle_grid_indices.iter().enumerate() {
            let slot = &mut write_offsets[grid_idx as usize];
            cell_particle_indices[*slot as usize] = particle_idx as u32;
            *slot += 1;
        }

        Self {
            domain_size,
            grid_dim,
            inv_grid_cell_size,
            particle_grid_indices,
            cell_counts,
            cell_starts,
            cell_particle_indices,
        }
    }

    pub fn grid_dim(&self) -> u32 {
        self.grid_dim
    }

    pub fn num_particles(&self) -> usize {
        self.particle_grid_indices.len()
    }

    /// Number of particles bucketed into each cell, row-major.
    pub fn cell_counts(&self) -> &[u32] {
        &self.cell_counts
    }

    /// Calls `f` for every particle whose periodic distance to `pos` is at
    /// most `radius`, including a particle sitting at `pos` itself.
    /// Visiting order follows the cell traversal, not particle index.
    pub fn for_each_neighbor<F>(
        &self,
        pos: Vec2,
        radius: f64,
        positions_x: &[f64],
        positions_y: &[f64],
        mut f: F,
    ) where
        F: FnMut(usize),
    {
        if self.cell_particle_indices.is_empty() || !(radius >= 0.0) {
            return;
        }
        let l = self.domain_size;
        let pos = Vec2::new(wrap_coordinate(pos.x, l), wrap_coordinate(pos.y, l));
        let (center_x, center_y) = get_grid_cell(pos, self.inv_grid_cell_size, self.grid_dim);

        let dim = self.grid_dim as i64;
        // Cells reachable within `radius`, with slack for floor() rounding
        let reach = (radius * self.inv_grid_cell_size + 1e-9).ceil();
        let offsets = if reach.is_finite() && 2.0 * reach + 1.0 < dim as f64 {
            let r = reach as i64;
            -r..=r
        } else {
            // Stencil covers the whole torus: visit every cell exactly once
            0..=dim - 1
        };

        for dy in offsets.clone() {
            let check_y = (center_y as i64 + dy).rem_euclid(dim);
            for dx in offsets.clone() {
                let check_x = (center_x as i64 + dx).rem_euclid(dim);
                let grid_idx = (check_y * dim + check_x) as usize;

                let start = self.cell_starts[grid_idx] as usize;
                let end = start + self.cell_counts[grid_idx] as usize;
                for &neighbor_idx in &self.cell_particle_indices[start..end] {
                    let j = neighbor_idx as usize;
                    let sep_x = periodic_delta(pos.x, positions_x[j], l);
                    let sep_y = periodic_delta(pos.y, positions_y[j], l);
                    if (sep_x * sep_x + sep_y * sep_y).sqrt() <= radius {
                        f(j);
                    }
                }
            }
        }
    }

    /// Writes the ascending neighbor set of `pos` into `out`, replacing its contents.
    pub fn find_neighbors_into(
        &self,
        pos: Vec2,
        radius: f64,
        positions_x: &[f64],
        positions_y: &[f64],
        out: &mut Vec<usize>,
    ) {
        out.clear();
        self.for_each_neighbor(pos, radius, positions_x, positions_y, |j| out.push(j));
        out.sort_unstable();
    }

    pub fn find_neighbors(&self, pos: Vec2, radius: f64, positions_x: &[f64], positions_y: &[f64]) -> Vec<usize> {
        let mut out = Vec::new();
        self.find_neighbors_into(pos, radius, positions_x, positions_y, &mut out);
        out
    }
}

/// Pairwise reference search: indices of all particles within periodic
/// distance `radius` (inclusive) of `query`, ascending.
pub fn find_neighbors(positions_x: &[f64], positions_y: &[f64], radius: f64, query: Vec2, l: f64) -> Vec<usize> {
    let query = Vec2::new(wrap_coordinate(query.x, l), wrap_coordinate(query.y, l));
    positions_x
        .iter()
        .zip(positions_y)
        .enumerate()
        .filter(|&(_, (&x, &y))| query.periodic_distance(Vec2::new(x, y), l) <= radius)
        .map(|(j, _)| j)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Configuration;

    fn grid_matches_brute_force(n: usize, l: f64, radius: f64, seed: u64) {
        let config = Configuration::from_seed(n, l, seed).unwrap();
        let (xs, ys) = (&config.positions_x, &config.positions_y);
        let grid = PeriodicGrid::build(xs, ys, l, radius);
        for i in 0..n {
            let q = config.position(i);
            let expected = find_neighbors(xs, ys, radius, q, l);
            let got = grid.find_neighbors(q, radius, xs, ys);
            assert_eq!(got, expected, "particle {} (n={}, l={}, r={})", i, n, l, radius);
            assert!(got.contains(&i));
        }
    }

    #[test]
    fn grid_agrees_with_pairwise_search() {
        grid_matches_brute_force(300, 20.0, 1.0, 3);
        grid_matches_brute_force(500, 10.0, 0.35, 8);
        grid_matches_brute_force(120, 5.0, 2.2, 1);
        grid_matches_brute_force(64, 7.0, 4.0, 5);
    }

    #[test]
    fn zero_radius_returns_only_self() {
        let config = Configuration::from_seed(200, 10.0, 21).unwrap();
        let (xs, ys) = (&config.positions_x, &config.positions_y);
        let grid = PeriodicGrid::build(xs, ys, 10.0, 0.0);
        for i in 0..config.len() {
            assert_eq!(find_neighbors(xs, ys, 0.0, config.position(i), 10.0), vec![i]);
            assert_eq!(grid.find_neighbors(config.position(i), 0.0, xs, ys), vec![i]);
        }
    }

    #[test]
    fn diagonal_radius_returns_everyone() {
        let l = 10.0;
        let radius = l * 2f64.sqrt();
        let config = Configuration::from_seed(150, l, 2).unwrap();
        let (xs, ys) = (&config.positions_x, &config.positions_y);
        let all: Vec<usize> = (0..config.len()).collect();
        let grid = PeriodicGrid::build(xs, ys, l, radius);
        // a grid built for a small radius must still answer a large query
        let fine_grid = PeriodicGrid::build(xs, ys, l, 0.5);
        for i in 0..config.len() {
            let q = config.position(i);
            assert_eq!(find_neighbors(xs, ys, radius, q, l), all);
            assert_eq!(grid.find_neighbors(q, radius, xs, ys), all);
            assert_eq!(fine_grid.find_neighbors(q, radius, xs, ys), all);
        }
    }

    #[test]
    fn neighbors_wrap_across_edges() {
        let xs = [0.5, 9.5, 5.0, 5.0, 5.0];
        let ys = [5.0, 5.0, 0.5, 9.5, 5.0];
        let grid = PeriodicGrid::build(&xs, &ys, 10.0, 1.0);
        let cases = [(0, vec![0, 1]), (1, vec![0, 1]), (2, vec![2, 3]), (3, vec![2, 3]), (4, vec![4])];
        for (i, expected) in cases {
            let q = Vec2::new(xs[i], ys[i]);
            assert_eq!(find_neighbors(&xs, &ys, 1.0, q, 10.0), expected);
            assert_eq!(grid.find_neighbors(q, 1.0, &xs, &ys), expected);
        }
    }

    #[test]
    fn radius_is_inclusive() {
        let xs = [1.0, 3.0];
        let ys = [1.0, 1.0];
        let grid = PeriodicGrid::build(&xs, &ys, 10.0, 2.0);
        assert_eq!(grid.find_neighbors(Vec2::new(1.0, 1.0), 2.0, &xs, &ys), vec![0, 1]);
        assert_eq!(grid.find_neighbors(Vec2::new(1.0, 1.0), 1.999, &xs, &ys), vec![0]);
    }

    #[test]
    fn counting_sort_buckets_every_particle_once() {
        let config = Configuration::from_seed(400, 16.0, 77).unwrap();
        let grid = PeriodicGrid::build(&config.positions_x, &config.positions_y, 16.0, 1.0);
        assert_eq!(grid.num_particles(), 400);
        assert_eq!(grid.cell_counts().iter().map(|&c| c as usize).sum::<usize>(), 400);
        let mut seen = grid.cell_particle_indices.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..400u32).collect::<Vec<_>>());
        for (c, &start) in grid.cell_starts.iter().enumerate() {
            let cell = &grid.cell_particle_indices[start as usize..(start + grid.cell_counts[c]) as usize];
            assert!(cell.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn params_grid_uses_configured_dimension() {
        let params = SimParams { num_particles: 4, domain_size: 10.0, interaction_radius: 1.0, ..Default::default() };
        let xs = [0.1, 2.5, 9.9, 5.0];
        let ys = [0.1, 2.5, 9.9, 5.0];
        let grid = PeriodicGrid::for_params(&xs, &ys, &params);
        assert_eq!(grid.grid_dim(), params.grid_dim());
        assert_eq!(grid.find_neighbors(Vec2::new(0.1, 0.1), 1.0, &xs, &ys), vec![0, 2]);
    }
}
