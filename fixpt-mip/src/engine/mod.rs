//! LP engine abstraction for the auxiliary propagation problem.
//!
//! The evaluator creates one problem per node, loads columns and rows in
//! bulk, solves, reads a slice of the primal solution, and drops it.

mod microlp_backend;

pub use microlp_backend::{MicrolpEngine, MicrolpProblem};

use std::ops::Range;

use crate::error::FbbtResult;

/// Direction of the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// Minimize.
    Minimize,
    /// Maximize.
    Maximize,
}

/// Sense of an engine row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// `a^T x <= rhs`
    Le,
    /// `a^T x >= rhs`
    Ge,
    /// `a^T x = rhs`
    Eq,
}

/// Outcome of an engine solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// Optimal solution available.
    Optimal,

    /// No feasible point.
    Infeasible,

    /// Objective unbounded.
    Unbounded,

    /// Numerical trouble or any other non-optimal stop.
    Other,
}

impl LpStatus {
    /// Returns true if a primal solution can be read.
    pub fn is_optimal(self) -> bool {
        matches!(self, LpStatus::Optimal)
    }
}

/// Factory for LP problems.
pub trait LpEngine {
    /// Problem handle type. Dropping it releases engine resources.
    type Problem: LpProblem;

    /// Create an empty named problem.
    fn create_problem(&self, name: &str) -> FbbtResult<Self::Problem>;
}

/// A single LP owned by the caller.
pub trait LpProblem {
    /// Append columns with objective coefficients and bounds.
    ///
    /// All three slices have one entry per new column.
    fn add_columns(&mut self, obj: &[f64], lower: &[f64], upper: &[f64]) -> FbbtResult<()>;

    /// Append rows in compressed form.
    ///
    /// `row_starts` has one entry per new row plus a final end offset into
    /// `columns` / `coefs`.
    fn add_rows(
        &mut self,
        rhs: &[f64],
        sense: &[ConstraintSense],
        row_starts: &[usize],
        columns: &[usize],
        coefs: &[f64],
    ) -> FbbtResult<()>;

    /// Set the objective direction.
    fn set_objective_sense(&mut self, sense: ObjectiveSense);

    /// Solve the loaded problem.
    fn solve(&mut self) -> FbbtResult<LpStatus>;

    /// Primal values for a contiguous range of columns after an optimal solve.
    fn solution(&self, cols: Range<usize>) -> FbbtResult<Vec<f64>>;

    /// Objective value after an optimal solve.
    fn objective_value(&self) -> FbbtResult<f64>;

    /// Number of columns loaded.
    fn num_cols(&self) -> usize;

    /// Number of rows loaded.
    fn num_rows(&self) -> usize;
}
