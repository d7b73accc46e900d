use serde::{Serialize, Deserialize};
use crate::sim_params::SimParams;

/// Full output of one run, time on the leading axis of every array.
///
/// * `positions`: shape (T+1, N, 2)
/// * `headings`: shape (T+1, N)
/// * `order_parameter`: shape (T+1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// The parameters the run was produced with.
    pub params: SimParams,
    pub positions: Vec<Vec<[f64; 2]>>,
    pub headings: Vec<Vec<f64>>,
    pub order_parameter: Vec<f64>,
}

/// Borrowed view of a single recorded step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    pub step: usize,
    pub time: f64,
    pub positions: &'a [[f64; 2]],
    pub headings: &'a [f64],
    pub order_parameter: f64,
}

impl Trajectory {
    /// Empty trajectory with room for all T+1 frames.
    pub fn with_capacity(params: SimParams) -> Self {
        let frames = params.steps.saturating_add(1);
        Self {
            params,
            positions: Vec::with_capacity(frames),
            headings: Vec::with_capacity(frames),
            order_parameter: Vec::with_capacity(frames),
        }
    }

    pub fn push_frame(&mut self, positions: Vec<[f64; 2]>, headings: Vec<f64>, order_parameter: f64) {
        self.positions.push(positions);
        self.headings.push(headings);
        self.order_parameter.push(order_parameter);
    }

    /// Number of recorded frames (T+1 once the run is complete).
    pub fn len(&self) -> usize {
        self.order_parameter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_parameter.is_empty()
    }

    pub fn frame(&self, step: usize) -> Option<Frame<'_>> {
        Some(Frame {
            step,
            time: self.params.time_at(step),
            positions: self.positions.get(step)?,
            headings: self.headings.get(step)?,
            order_parameter: *self.order_parameter.get(step)?,
        })
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame<'_>> + '_ {
        (0..self.len()).filter_map(move |step| self.frame(step))
    }

    pub fn final_order_parameter(&self) -> Option<f64> {
        self.order_parameter.last().copied()
    }

    /// Time-averaged order parameter over steps `from_step..=T`, the usual
    /// stationary-state estimate when sweeping noise or radius.
    pub fn mean_order_parameter(&self, from_step: usize) -> Option<f64> {
        let tail = self.order_parameter.get(from_step..)?;
        if tail.is_empty() {
            return None;
        }
        Some(tail.iter().sum::<f64>() / tail.len() as f64)
    }
}
