//! Fixed-point feasibility-based bound tightening (FBBT) for MIP search.
//!
//! At a branch-and-bound node, [`FixedPointEvaluator`] builds an auxiliary
//! LP whose feasible points are bound boxes closed under one round of
//! row-wise bound propagation, solves it through an [`LpEngine`], and
//! reports every strictly improving column bound to the host as a
//! [`BoundCut`].
//!
//! ```no_run
//! use fixpt_mip::{
//!     Column, CutCollector, FbbtSettings, FixedPointEvaluator, MicrolpEngine, NodeData,
//!     RowHeader, RowMatrix,
//! };
//!
//! // x0 + x1 <= 10, x0 in [0, 8], x1 fixed at 8
//! let rows = RowMatrix::from_rows(2, &[vec![(0, 1.0), (1, 1.0)]])?;
//! let node = NodeData::new(
//!     vec![Column::continuous(0.0, 8.0), Column::continuous(8.0, 8.0)],
//!     vec![RowHeader::le(10.0)],
//!     rows,
//!     vec![5.0, 8.0],
//! )?;
//!
//! let mut evaluator = FixedPointEvaluator::new(FbbtSettings::default())?;
//! let mut cuts = CutCollector::new();
//! evaluator.evaluate(&node, &MicrolpEngine::new(), &mut cuts)?;
//! // cuts now holds x0 <= 2, which cuts off x0 = 5
//! # Ok::<(), fixpt_mip::FbbtError>(())
//! ```

#![warn(missing_docs)]

pub mod cuts;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod propagation;
pub mod settings;
pub mod stats;

pub use cuts::{BoundCut, BoundSense, CutCollector, CutSink};
pub use engine::{LpEngine, LpProblem, LpStatus, MicrolpEngine};
pub use error::{FbbtError, FbbtResult};
pub use evaluator::{Evaluation, EvaluationOutcome, FixedPointEvaluator};
pub use model::{Column, ColumnType, NodeData, NodeRelaxation, RowHeader, RowMatrix};
pub use settings::{FbbtSettings, PropagationPolicy};
pub use stats::RunStatistics;
