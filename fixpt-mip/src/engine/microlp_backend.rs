//! LP engine backed by the pure-Rust `microlp` simplex solver.
//!
//! Columns and rows are buffered as they are loaded and handed to
//! `microlp` in one go when [`LpProblem::solve`] is called.

use std::ops::Range;

use microlp::{ComparisonOp, OptimizationDirection, Problem};

use super::{ConstraintSense, LpEngine, LpProblem, LpStatus, ObjectiveSense};
use crate::error::{FbbtError, FbbtResult};

/// Engine creating [`MicrolpProblem`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpEngine;

impl MicrolpEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }
}

impl LpEngine for MicrolpEngine {
    type Problem = MicrolpProblem;

    fn create_problem(&self, name: &str) -> FbbtResult<MicrolpProblem> {
        Ok(MicrolpProblem::new(name))
    }
}

#[derive(Debug, Clone)]
struct BufferedRow {
    terms: Vec<(usize, f64)>,
    sense: ConstraintSense,
    rhs: f64,
}

/// Buffered LP solved with `microlp`.
#[derive(Debug, Clone)]
pub struct MicrolpProblem {
    name: String,
    direction: ObjectiveSense,

    obj: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    rows: Vec<BufferedRow>,

    /// Primal values and objective of the last optimal solve.
    solved: Option<(Vec<f64>, f64)>,
}

impl MicrolpProblem {
    /// Create an empty minimization problem.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            direction: ObjectiveSense::Minimize,
            obj: Vec::new(),
            lower: Vec::new(),
            upper: Vec::new(),
            rows: Vec::new(),
            solved: None,
        }
    }

    fn build(&self) -> Problem {
        let direction = match self.direction {
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
        };
        let mut problem = Problem::new(direction);

        let vars: Vec<_> = (0..self.obj.len())
            .map(|j| problem.add_var(self.obj[j], (self.lower[j], self.upper[j])))
            .collect();

        for row in &self.rows {
            let op = match row.sense {
                ConstraintSense::Le => ComparisonOp::Le,
                ConstraintSense::Ge => ComparisonOp::Ge,
                ConstraintSense::Eq => ComparisonOp::Eq,
            };
            let expr: Vec<_> = row.terms.iter().map(|&(j, a)| (vars[j], a)).collect();
            problem.add_constraint(expr.as_slice(), op, row.rhs);
        }

        problem
    }
}

/// Sort terms by column and sum repeated columns, dropping exact zeros.
fn merge_terms(mut terms: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    terms.sort_by_key(|&(j, _)| j);
    let mut merged: Vec<(usize, f64)> = Vec::with_capacity(terms.len());
    for (j, a) in terms {
        match merged.last_mut() {
            Some(last) if last.0 == j => last.1 += a,
            _ => merged.push((j, a)),
        }
    }
    merged.retain(|&(_, a)| a != 0.0);
    merged
}

impl LpProblem for MicrolpProblem {
    fn add_columns(&mut self, obj: &[f64], lower: &[f64], upper: &[f64]) -> FbbtResult<()> {
        if obj.len() != lower.len() || obj.len() != upper.len() {
            return Err(FbbtError::Engine(format!(
                "column arrays differ in length: {} / {} / {}",
                obj.len(),
                lower.len(),
                upper.len()
            )));
        }
        for (k, ((&c, &l), &u)) in obj.iter().zip(lower).zip(upper).enumerate() {
            if !c.is_finite() || l.is_nan() || u.is_nan() || l > u {
                return Err(FbbtError::Engine(format!(
                    "column {} has objective {} and bounds [{}, {}]",
                    self.obj.len() + k,
                    c,
                    l,
                    u
                )));
            }
        }

        self.obj.extend_from_slice(obj);
        self.lower.extend_from_slice(lower);
        self.upper.extend_from_slice(upper);
        self.solved = None;
        Ok(())
    }

    fn add_rows(
        &mut self,
        rhs: &[f64],
        sense: &[ConstraintSense],
        row_starts: &[usize],
        columns: &[usize],
        coefs: &[f64],
    ) -> FbbtResult<()> {
        let count = rhs.len();
        if sense.len() != count || row_starts.len() != count + 1 || columns.len() != coefs.len() {
            return Err(FbbtError::Engine(format!(
                "row arrays inconsistent for {} rows",
                count
            )));
        }
        if row_starts.windows(2).any(|w| w[0] > w[1]) || row_starts[count] > columns.len() {
            return Err(FbbtError::Engine("row starts are not monotone".to_string()));
        }

        let ncols = self.obj.len();
        let mut rows = Vec::with_capacity(count);
        for r in 0..count {
            if !rhs[r].is_finite() {
                return Err(FbbtError::Engine(format!(
                    "row {} has non-finite rhs {}",
                    self.rows.len() + r,
                    rhs[r]
                )));
            }
            let span = row_starts[r]..row_starts[r + 1];
            let mut terms = Vec::with_capacity(span.len());
            for k in span {
                let (j, a) = (columns[k], coefs[k]);
                if j >= ncols || !a.is_finite() {
                    return Err(FbbtError::Engine(format!(
                        "row {} has entry ({}, {}) with {} columns loaded",
                        self.rows.len() + r,
                        j,
                        a,
                        ncols
                    )));
                }
                terms.push((j, a));
            }
            rows.push(BufferedRow {
                terms: merge_terms(terms),
                sense: sense[r],
                rhs: rhs[r],
            });
        }

        self.rows.extend(rows);
        self.solved = None;
        Ok(())
    }

    fn set_objective_sense(&mut self, sense: ObjectiveSense) {
        self.direction = sense;
        self.solved = None;
    }

    fn solve(&mut self) -> FbbtResult<LpStatus> {
        log::debug!(
            "{}: solving with {} columns and {} rows",
            self.name,
            self.obj.len(),
            self.rows.len()
        );

        let problem = self.build();
        match problem.solve() {
            Ok(solution) => {
                let values = solution.iter().map(|(_, &v)| v).collect();
                self.solved = Some((values, solution.objective()));
                Ok(LpStatus::Optimal)
            }
            Err(microlp::Error::Infeasible) => {
                self.solved = None;
                Ok(LpStatus::Infeasible)
            }
            Err(microlp::Error::Unbounded) => {
                self.solved = None;
                Ok(LpStatus::Unbounded)
            }
            Err(microlp::Error::InternalError(msg)) => {
                log::warn!("{}: engine stopped without a solution: {}", self.name, msg);
                self.solved = None;
                Ok(LpStatus::Other)
            }
        }
    }

    fn solution(&self, cols: Range<usize>) -> FbbtResult<Vec<f64>> {
        let (values, _) = self
            .solved
            .as_ref()
            .ok_or_else(|| FbbtError::Engine(format!("{}: no optimal solution", self.name)))?;
        values
            .get(cols.clone())
            .map(<[f64]>::to_vec)
            .ok_or_else(|| {
                FbbtError::Engine(format!(
                    "{}: columns {:?} out of range ({} loaded)",
                    self.name,
                    cols,
                    values.len()
                ))
            })
    }

    fn objective_value(&self) -> FbbtResult<f64> {
        self.solved
            .as_ref()
            .map(|&(_, obj)| obj)
            .ok_or_else(|| FbbtError::Engine(format!("{}: no optimal solution", self.name)))
    }

    fn num_cols(&self) -> usize {
        self.obj.len()
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }
}
