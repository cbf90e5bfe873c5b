//! Fixed-point bound tightening at a search-tree node.
//!
//! One evaluation runs a single cycle:
//!
//! ```text
//! depth gate -> translate rows -> fetch rows -> build aux LP
//!            -> solve (maximize) -> extract -> emit bound cuts
//! ```
//!
//! Only an optimal auxiliary LP yields bounds. Infeasible or unbounded
//! auxiliary problems are a normal outcome and produce no cuts.

use std::time::{Duration, Instant};

use crate::cuts::{BoundCut, CutSink};
use crate::engine::{LpEngine, LpProblem, LpStatus};
use crate::error::{FbbtError, FbbtResult};
use crate::model::{translate_rows, Column, NodeRelaxation, RowInterval, RowMatrix};
use crate::propagation::AuxModelBuilder;
use crate::settings::FbbtSettings;
use crate::stats::RunStatistics;

/// How an evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// Node deeper than the configured maximum; nothing was done.
    Skipped,

    /// The auxiliary LP had no optimal solution.
    PropagationInfeasible(LpStatus),

    /// The auxiliary LP was solved and its bounds were checked.
    Solved,
}

/// Result of evaluating one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// How the evaluation ended.
    pub outcome: EvaluationOutcome,
    /// Lower bound cuts accepted by the host.
    pub lower_tightened: usize,
    /// Upper bound cuts accepted by the host.
    pub upper_tightened: usize,
    /// Wall time of this evaluation.
    pub elapsed: Duration,
}

impl Evaluation {
    fn skipped() -> Self {
        Self {
            outcome: EvaluationOutcome::Skipped,
            lower_tightened: 0,
            upper_tightened: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Total cuts accepted by the host.
    pub fn cuts_added(&self) -> usize {
        self.lower_tightened + self.upper_tightened
    }
}

/// Tightened bounds found for one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundTightening {
    /// Column index.
    pub column: usize,
    /// New lower bound, if accepted.
    pub lower: Option<f64>,
    /// New upper bound, if accepted.
    pub upper: Option<f64>,
}

/// Compare propagated bounds against the node and keep the improving ones.
///
/// Integral columns are rounded inward first. A new lower bound is kept only
/// if it exceeds both the relaxation value `x` and the node lower bound by
/// more than `tol`, so every accepted bound cuts off the current point;
/// upper bounds symmetrically. Non-finite values are ignored for their
/// column only.
pub fn extract_bounds(
    columns: &[Column],
    x: &[f64],
    new_lower: &[f64],
    new_upper: &[f64],
    tol: f64,
) -> Vec<BoundTightening> {
    columns
        .iter()
        .zip(x)
        .zip(new_lower.iter().zip(new_upper))
        .enumerate()
        .filter_map(|(i, ((col, &xi), (&l, &u)))| {
            let (l, u) = col.col_type.round_inward(l, u, tol);

            let lower = (l.is_finite() && l > xi + tol && l > col.lower + tol).then_some(l);
            let upper = (u.is_finite() && u < xi - tol && u < col.upper - tol).then_some(u);

            if lower.is_some() || upper.is_some() {
                Some(BoundTightening {
                    column: i,
                    lower,
                    upper,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Runs fixed-point FBBT at search-tree nodes and keeps run statistics.
#[derive(Debug, Clone)]
pub struct FixedPointEvaluator {
    settings: FbbtSettings,
    builder: AuxModelBuilder,
    stats: RunStatistics,
}

impl FixedPointEvaluator {
    /// Create an evaluator with validated settings.
    pub fn new(settings: FbbtSettings) -> FbbtResult<Self> {
        settings.validate()?;
        Ok(Self {
            builder: AuxModelBuilder::new(settings.policy),
            settings,
            stats: RunStatistics::default(),
        })
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Log the accumulated statistics and return them.
    ///
    /// Meant to be called once, when the host tears down.
    pub fn report(&self) -> RunStatistics {
        log::info!("fixed-point FBBT: {}", self.stats);
        self.stats
    }

    /// Evaluate one node, offering every improving bound to `sink`.
    ///
    /// Undefined row senses and a short row fetch are returned as fatal
    /// errors (see [`FbbtError::is_fatal`]). A host refusing a cut is not an
    /// error: it is logged and evaluation moves on to the next column.
    pub fn evaluate<N, E, S>(
        &mut self,
        node: &N,
        engine: &E,
        sink: &mut S,
    ) -> FbbtResult<Evaluation>
    where
        N: NodeRelaxation + ?Sized,
        E: LpEngine,
        S: CutSink + ?Sized,
    {
        let depth = node.depth();
        if depth > self.settings.max_depth {
            return Ok(Evaluation::skipped());
        }

        let start = Instant::now();

        let intervals = translate_rows(node.row_headers(), self.settings.infinity)?;

        let capacity = node.num_nonzeros();
        let fetched = node.fetch_rows(capacity);
        if fetched.surplus < 0 {
            return Err(FbbtError::Capacity {
                required: capacity + fetched.surplus.unsigned_abs() as usize,
                capacity,
            });
        }

        self.stats.runs += 1;
        log::debug!(
            "node at depth {}: {} rows, {} columns, {} nonzeros",
            depth,
            intervals.len(),
            node.columns().len(),
            fetched.rows.nnz()
        );

        let result = self.propagate(node, &intervals, &fetched.rows, engine, sink);

        let elapsed = start.elapsed();
        self.stats.elapsed += elapsed;
        result.map(|mut evaluation| {
            evaluation.elapsed = elapsed;
            evaluation
        })
    }

    fn propagate<N, E, S>(
        &mut self,
        node: &N,
        intervals: &[RowInterval],
        rows: &RowMatrix,
        engine: &E,
        sink: &mut S,
    ) -> FbbtResult<Evaluation>
    where
        N: NodeRelaxation + ?Sized,
        E: LpEngine,
        S: CutSink + ?Sized,
    {
        let columns: Vec<Column> = node
            .columns()
            .iter()
            .map(|c| Column {
                lower: self.settings.normalize_bound(c.lower),
                upper: self.settings.normalize_bound(c.upper),
                col_type: c.col_type,
            })
            .collect();

        let x = node.solution();
        if x.len() != columns.len() {
            return Err(FbbtError::InvalidNode(format!(
                "solution has {} entries for {} columns",
                x.len(),
                columns.len()
            )));
        }

        let model = self.builder.build(&columns, intervals, rows)?;

        let mut problem = engine.create_problem(&self.settings.problem_name)?;
        model.load_into(&mut problem)?;
        let status = problem.solve()?;

        if !status.is_optimal() {
            log::info!("FPLP infeasible or unbounded ({:?})", status);
            return Ok(Evaluation {
                outcome: EvaluationOutcome::PropagationInfeasible(status),
                lower_tightened: 0,
                upper_tightened: 0,
                elapsed: Duration::ZERO,
            });
        }

        let new_lower = problem.solution(model.layout.lower_range())?;
        let new_upper = problem.solution(model.layout.upper_range())?;
        drop(problem);

        let tol = self.settings.tolerance;
        let mut evaluation = Evaluation {
            outcome: EvaluationOutcome::Solved,
            lower_tightened: 0,
            upper_tightened: 0,
            elapsed: Duration::ZERO,
        };

        for t in extract_bounds(&columns, x, &new_lower, &new_upper, tol) {
            let i = t.column;
            log::debug!(
                "x{}={}: [{},{}] --> [{},{}]",
                i,
                x[i],
                columns[i].lower,
                columns[i].upper,
                t.lower.unwrap_or(columns[i].lower),
                t.upper.unwrap_or(columns[i].upper)
            );

            if let Some(l) = t.lower {
                if let Err(e) = sink.add_bound_cut(BoundCut::lower(i, l)) {
                    log::warn!("lower bound cut on x{} not added: {}", i, e);
                    continue;
                }
                evaluation.lower_tightened += 1;
                self.stats.tightened_lower += 1;
            }
            if let Some(u) = t.upper {
                if let Err(e) = sink.add_bound_cut(BoundCut::upper(i, u)) {
                    log::warn!("upper bound cut on x{} not added: {}", i, e);
                    continue;
                }
                evaluation.upper_tightened += 1;
                self.stats.tightened_upper += 1;
            }
        }

        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;

    #[test]
    fn test_extract_accepts_only_improving_bounds() {
        let columns = vec![Column::continuous(0.0, 8.0), Column::continuous(8.0, 8.0)];
        let x = [5.0, 8.0];
        let out = extract_bounds(&columns, &x, &[0.0, 8.0], &[2.0, 8.0], 1e-5);
        assert_eq!(
            out,
            vec![BoundTightening {
                column: 0,
                lower: None,
                upper: Some(2.0)
            }]
        );
    }

    #[test]
    fn test_extract_requires_separating_bound() {
        let columns = vec![Column::continuous(0.0, 10.0)];
        assert_eq!(
            extract_bounds(&columns, &[1.0], &[3.0], &[10.0], 1e-5)[0].lower,
            Some(3.0)
        );
        assert_eq!(
            extract_bounds(&columns, &[9.0], &[0.0], &[4.0], 1e-5)[0].upper,
            Some(4.0)
        );
        // tighter than the node, but x already satisfies it
        assert!(extract_bounds(&columns, &[3.0], &[3.0], &[10.0], 1e-5).is_empty());
        assert!(extract_bounds(&columns, &[5.0], &[2.0], &[8.0], 1e-5).is_empty());
        assert!(extract_bounds(&columns, &[3.0 - 5e-6], &[3.0], &[10.0], 1e-5).is_empty());
    }

    #[test]
    fn test_extract_rounds_integral_columns() {
        let columns = vec![Column::integer(0.0, 10.0), Column::integer(0.0, 10.0)];
        let out = extract_bounds(&columns, &[3.2, 7.5], &[3.2, 0.0], &[10.0, 7.9], 1e-5);
        assert_eq!(
            out,
            vec![
                BoundTightening {
                    column: 0,
                    lower: Some(4.0),
                    upper: None
                },
                BoundTightening {
                    column: 1,
                    lower: None,
                    upper: Some(7.0)
                },
            ]
        );

        // rounding can empty the box; both sides are reported
        let out = extract_bounds(&columns[..1], &[3.5], &[3.2], &[3.8], 1e-5);
        assert_eq!((out[0].lower, out[0].upper), (Some(4.0), Some(3.0)));
    }

    #[test]
    fn test_extract_tolerance_and_non_finite() {
        let columns = vec![Column {
            lower: 0.0,
            upper: f64::INFINITY,
            col_type: ColumnType::Continuous,
        }];
        assert!(extract_bounds(&columns, &[0.0], &[5e-6], &[f64::INFINITY], 1e-5).is_empty());
        assert!(extract_bounds(&columns, &[1.0], &[f64::NAN], &[f64::NAN], 1e-5).is_empty());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = FixedPointEvaluator::new(FbbtSettings::default().with_tolerance(-1.0)).unwrap_err();
        assert!(matches!(err, FbbtError::InvalidSettings(_)));
    }
}
