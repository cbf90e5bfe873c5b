//! Assembly of the auxiliary propagation LP.

use super::directional::row_cuts;
use super::variables::{AuxKind, AuxLayout, AuxVar};
use crate::engine::{ConstraintSense, LpProblem, ObjectiveSense};
use crate::error::{FbbtError, FbbtResult};
use crate::model::{Column, RowInterval, RowMatrix};
use crate::settings::PropagationPolicy;

/// One auxiliary column with its objective and bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxColumn {
    /// Variable identity.
    pub var: AuxVar,
    /// Objective coefficient.
    pub objective: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// Linear constraint over auxiliary variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxConstraint {
    /// Engine sense.
    pub sense: ConstraintSense,
    /// Right-hand side.
    pub rhs: f64,
    /// Sparse terms.
    pub terms: Vec<(AuxVar, f64)>,
}

impl AuxConstraint {
    /// `bL_j - bU_j <= 0`
    pub fn row_consistency(row: usize) -> Self {
        Self {
            sense: ConstraintSense::Le,
            rhs: 0.0,
            terms: vec![(AuxVar::row_lower(row), 1.0), (AuxVar::row_upper(row), -1.0)],
        }
    }
}

/// Complete auxiliary LP, ready to be loaded into an engine.
#[derive(Debug, Clone)]
pub struct AuxModel {
    /// Column layout.
    pub layout: AuxLayout,
    /// Columns in engine order.
    pub columns: Vec<AuxColumn>,
    /// Constraints in engine order.
    pub constraints: Vec<AuxConstraint>,
}

impl AuxModel {
    /// Number of auxiliary columns.
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Number of constraints.
    pub fn num_rows(&self) -> usize {
        self.constraints.len()
    }

    /// Total number of constraint terms.
    pub fn nnz(&self) -> usize {
        self.constraints.iter().map(|c| c.terms.len()).sum()
    }

    /// Load columns, rows and the maximize sense into an engine problem.
    pub fn load_into<P: LpProblem>(&self, problem: &mut P) -> FbbtResult<()> {
        let obj: Vec<f64> = self.columns.iter().map(|c| c.objective).collect();
        let lower: Vec<f64> = self.columns.iter().map(|c| c.lower).collect();
        let upper: Vec<f64> = self.columns.iter().map(|c| c.upper).collect();
        problem.add_columns(&obj, &lower, &upper)?;

        let nrows = self.constraints.len();
        let mut rhs = Vec::with_capacity(nrows);
        let mut sense = Vec::with_capacity(nrows);
        let mut row_starts = Vec::with_capacity(nrows + 1);
        let mut columns = Vec::with_capacity(self.nnz());
        let mut coefs = Vec::with_capacity(self.nnz());

        row_starts.push(0);
        for con in &self.constraints {
            for &(var, a) in &con.terms {
                let idx = self.layout.index_of(var).ok_or_else(|| {
                    FbbtError::Engine(format!("{:?} has no column in the auxiliary layout", var))
                })?;
                columns.push(idx);
                coefs.push(a);
            }
            rhs.push(con.rhs);
            sense.push(con.sense);
            row_starts.push(columns.len());
        }

        problem.add_rows(&rhs, &sense, &row_starts, &columns, &coefs)?;
        problem.set_objective_sense(ObjectiveSense::Maximize);
        Ok(())
    }
}

/// Builds the auxiliary LP of a node for a fixed propagation policy.
#[derive(Debug, Clone, Copy)]
pub struct AuxModelBuilder {
    policy: PropagationPolicy,
}

impl AuxModelBuilder {
    /// Create a builder.
    pub fn new(policy: PropagationPolicy) -> Self {
        Self { policy }
    }

    /// Assemble the model for `columns`, `rows` and their translated intervals.
    pub fn build(
        &self,
        columns: &[Column],
        intervals: &[RowInterval],
        rows: &RowMatrix,
    ) -> FbbtResult<AuxModel> {
        let (n, m) = (columns.len(), intervals.len());
        if rows.rows() != m || rows.cols() != n {
            return Err(FbbtError::InvalidNode(format!(
                "row matrix is {}x{} but node has {} rows and {} columns",
                rows.rows(),
                rows.cols(),
                m,
                n
            )));
        }

        let layout = AuxLayout::new(n, m, self.policy);
        let aux_columns = layout
            .iter()
            .map(|var| {
                let (objective, lower, upper) = match var.kind {
                    AuxKind::LowerCopy => {
                        let c = &columns[var.owner];
                        (-1.0, c.lower, c.upper)
                    }
                    AuxKind::UpperCopy => {
                        let c = &columns[var.owner];
                        (1.0, c.lower, c.upper)
                    }
                    AuxKind::RowLowerAux => (0.0, intervals[var.owner].lower, f64::INFINITY),
                    AuxKind::RowUpperAux => (0.0, f64::NEG_INFINITY, intervals[var.owner].upper),
                };
                AuxColumn {
                    var,
                    objective,
                    lower,
                    upper,
                }
            })
            .collect();

        let mut constraints = Vec::new();
        let mut skipped = 0;
        for (row, interval) in rows.iter_rows().zip(intervals) {
            if row.is_empty() {
                skipped += 1;
            } else {
                constraints.extend(row_cuts(&row, interval, self.policy));
            }
        }
        // every row, empty or not, keeps bL_j <= bU_j
        if self.policy.is_extended() {
            constraints.extend((0..m).map(AuxConstraint::row_consistency));
        }

        let model = AuxModel {
            layout,
            columns: aux_columns,
            constraints,
        };
        log::debug!(
            "auxiliary model: {} columns, {} constraints, {} nonzeros ({} empty rows skipped)",
            model.num_cols(),
            model.num_rows(),
            model.nnz(),
            skipped
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LpStatus, MicrolpProblem};
    use crate::model::{translate_rows, RowHeader};

    fn scenario_a() -> (Vec<Column>, Vec<RowInterval>, RowMatrix) {
        let columns = vec![Column::continuous(0.0, 8.0), Column::continuous(8.0, 8.0)];
        let intervals = translate_rows(&[RowHeader::le(10.0)], 1e20).unwrap();
        let rows = RowMatrix::from_rows(2, &[vec![(0, 1.0), (1, 1.0)]]).unwrap();
        (columns, intervals, rows)
    }

    #[test]
    fn test_plain_model_shape() {
        let (columns, intervals, rows) = scenario_a();
        let model = AuxModelBuilder::new(PropagationPolicy::RhsConstant)
            .build(&columns, &intervals, &rows)
            .unwrap();

        assert_eq!(model.num_cols(), 4);
        // <= row: upper half only, once per column
        assert_eq!(model.num_rows(), 2);
        assert_eq!(model.columns[0].objective, -1.0);
        assert_eq!(model.columns[3].objective, 1.0);
        assert_eq!((model.columns[3].lower, model.columns[3].upper), (8.0, 8.0));
    }

    #[test]
    fn test_extended_model_shape() {
        let (columns, intervals, rows) = scenario_a();
        let model = AuxModelBuilder::new(PropagationPolicy::ExtendedModel)
            .build(&columns, &intervals, &rows)
            .unwrap();

        assert_eq!(model.num_cols(), 6);
        // 2 columns x 2 halves + 2 row-bound + 1 consistency
        assert_eq!(model.num_rows(), 7);

        let bl = model.columns[4];
        assert_eq!(bl.var, AuxVar::row_lower(0));
        assert_eq!(bl.lower, f64::NEG_INFINITY);
        assert_eq!(bl.objective, 0.0);

        let bu = model.columns[5];
        assert_eq!(bu.var, AuxVar::row_upper(0));
        assert_eq!(bu.upper, 10.0);
        assert_eq!(
            model.constraints.last(),
            Some(&AuxConstraint::row_consistency(0))
        );
    }

    #[test]
    fn test_empty_rows_skipped() {
        let columns = vec![Column::continuous(0.0, 1.0)];
        let intervals = translate_rows(&[RowHeader::le(1.0), RowHeader::eq(0.0)], 1e20).unwrap();
        let rows = RowMatrix::from_rows(1, &[vec![], vec![(0, 1.0)]]).unwrap();

        let model = AuxModelBuilder::new(PropagationPolicy::ExtendedModel)
            .build(&columns, &intervals, &rows)
            .unwrap();
        // row 1: 2 halves + 2 row-bound; both rows: 1 consistency each
        assert_eq!(model.num_rows(), 6);
        assert!(model
            .constraints
            .contains(&AuxConstraint::row_consistency(0)));
    }

    #[test]
    fn test_empty_inverted_row_is_infeasible() {
        let (columns, _, _) = scenario_a();
        let intervals =
            translate_rows(&[RowHeader::le(10.0), RowHeader::ranged(5.0, -1.0)], 1e20).unwrap();
        let rows = RowMatrix::from_rows(2, &[vec![(0, 1.0), (1, 1.0)], vec![]]).unwrap();

        let model = AuxModelBuilder::new(PropagationPolicy::ExtendedModel)
            .build(&columns, &intervals, &rows)
            .unwrap();
        let mut problem = MicrolpProblem::new("FixPointLP");
        model.load_into(&mut problem).unwrap();
        assert_eq!(problem.solve().unwrap(), LpStatus::Infeasible);
    }

    #[test]
    fn test_dimension_mismatch() {
        let (columns, intervals, rows) = scenario_a();
        let err = AuxModelBuilder::new(PropagationPolicy::RhsConstant)
            .build(&columns[..1], &intervals, &rows)
            .unwrap_err();
        assert!(matches!(err, FbbtError::InvalidNode(_)));
    }

    #[test]
    fn test_load_and_solve() {
        let (columns, intervals, rows) = scenario_a();
        let model = AuxModelBuilder::new(PropagationPolicy::RhsConstant)
            .build(&columns, &intervals, &rows)
            .unwrap();

        let mut problem = MicrolpProblem::new("FixPointLP");
        model.load_into(&mut problem).unwrap();
        assert_eq!(problem.num_cols(), 4);
        assert_eq!(problem.num_rows(), 2);
        assert_eq!(problem.solve().unwrap(), LpStatus::Optimal);

        let upper = problem.solution(model.layout.upper_range()).unwrap();
        assert!((upper[0] - 2.0).abs() < 1e-8);
    }
}
