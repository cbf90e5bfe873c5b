//! Root-node driver: solve the LP relaxation, then run fixed-point FBBT.

use std::time::Instant;

use anyhow::{anyhow, Result};
use fixpt_mip::engine::{ConstraintSense, LpProblem, ObjectiveSense};
use fixpt_mip::model::RowSense;
use fixpt_mip::{
    BoundCut, CutCollector, Evaluation, FbbtSettings, FixedPointEvaluator, LpEngine, LpStatus,
    MicrolpEngine, NodeData, RunStatistics,
};

use crate::mps::MpsModel;

/// LP relaxation of the root node.
#[derive(Debug, Clone)]
pub struct Relaxation {
    /// Engine status.
    pub status: LpStatus,
    /// Objective value in the model's own sense.
    pub objective: f64,
    /// Primal solution (empty unless optimal).
    pub x: Vec<f64>,
}

/// Everything the driver reports for one model.
#[derive(Debug)]
pub struct RootReport {
    /// Root relaxation.
    pub relaxation: Relaxation,
    /// Evaluation result, if FBBT ran.
    pub evaluation: Option<Evaluation>,
    /// Cuts accepted at the root.
    pub cuts: Vec<BoundCut>,
    /// Statistics at teardown.
    pub stats: RunStatistics,
}

/// Solve the continuous relaxation of `model`.
///
/// Ranged rows become a `>=` and a `<=` row.
pub fn solve_relaxation<E: LpEngine>(model: &MpsModel, engine: &E) -> Result<Relaxation> {
    let mut problem = engine.create_problem(&model.name)?;

    let obj: Vec<f64> = model.objective.iter().map(|c| c * model.obj_sense).collect();
    let lower: Vec<f64> = model.columns.iter().map(|c| c.lower).collect();
    let upper: Vec<f64> = model.columns.iter().map(|c| c.upper).collect();
    problem.add_columns(&obj, &lower, &upper)?;

    let mut rhs = Vec::new();
    let mut sense = Vec::new();
    let mut row_starts = vec![0];
    let mut columns = Vec::new();
    let mut coefs = Vec::new();

    for (i, (header, terms)) in model.headers.iter().zip(&model.rows).enumerate() {
        if terms.is_empty() {
            log::debug!("row {} has no terms", model.row_names[i]);
        }
        let parts: Vec<(ConstraintSense, f64)> = match RowSense::from_code(i, header.sense)? {
            RowSense::Le => vec![(ConstraintSense::Le, header.rhs)],
            RowSense::Ge => vec![(ConstraintSense::Ge, header.rhs)],
            RowSense::Eq => vec![(ConstraintSense::Eq, header.rhs)],
            RowSense::Range if header.range == 0.0 => vec![(ConstraintSense::Eq, header.rhs)],
            RowSense::Range => vec![
                (ConstraintSense::Ge, header.rhs),
                (ConstraintSense::Le, header.rhs + header.range),
            ],
        };
        for (s, b) in parts {
            columns.extend(terms.iter().map(|&(j, _)| j));
            coefs.extend(terms.iter().map(|&(_, a)| a));
            row_starts.push(columns.len());
            rhs.push(b);
            sense.push(s);
        }
    }

    problem.add_rows(&rhs, &sense, &row_starts, &columns, &coefs)?;
    problem.set_objective_sense(ObjectiveSense::Minimize);

    let status = problem.solve()?;
    if !status.is_optimal() {
        return Ok(Relaxation {
            status,
            objective: f64::NAN,
            x: Vec::new(),
        });
    }

    Ok(Relaxation {
        status,
        objective: model.obj_sense * problem.objective_value()?,
        x: problem.solution(0..model.num_cols())?,
    })
}

/// Solve the root relaxation and, given FBBT settings, evaluate fixed-point
/// FBBT at the root.
pub fn run_root(model: &MpsModel, settings: Option<FbbtSettings>) -> Result<RootReport> {
    let engine = MicrolpEngine::new();

    let start = Instant::now();
    let relaxation = solve_relaxation(model, &engine)?;
    log::info!(
        "root relaxation of {}: {:?} in {:.3}s",
        model.name,
        relaxation.status,
        start.elapsed().as_secs_f64()
    );

    let Some(settings) = settings else {
        return Ok(RootReport {
            relaxation,
            evaluation: None,
            cuts: Vec::new(),
            stats: RunStatistics::default(),
        });
    };

    evaluate_root(model, relaxation, settings, &engine)
}

/// Evaluate fixed-point FBBT at the root point of `relaxation`.
///
/// Fatal evaluation errors are returned with context; the binary exits on
/// them.
pub fn evaluate_root<E: LpEngine>(
    model: &MpsModel,
    relaxation: Relaxation,
    settings: FbbtSettings,
    engine: &E,
) -> Result<RootReport> {
    let mut evaluator = FixedPointEvaluator::new(settings)?;
    let mut collector = CutCollector::new();

    let evaluation = if relaxation.status.is_optimal() {
        let node = NodeData::new(
            model.columns.clone(),
            model.headers.clone(),
            model.matrix()?,
            relaxation.x.clone(),
        )?;
        let eval = evaluator
            .evaluate(&node, engine, &mut collector)
            .map_err(|e| {
                if e.is_fatal() {
                    anyhow!(e).context("fatal error in fixed-point FBBT")
                } else {
                    anyhow!(e)
                }
            })?;
        Some(eval)
    } else {
        log::info!("no relaxation solution, skipping fixed-point FBBT");
        None
    };

    Ok(RootReport {
        relaxation,
        evaluation,
        cuts: collector.drain(),
        stats: evaluator.report(),
    })
}
