//! Construction of the auxiliary propagation LP.
//!
//! Every column `x_i` gets two copies `xL_i` and `xU_i` standing for its
//! propagated bounds. Each row contributes one directional constraint per
//! column and applicable side, so that any feasible point of the auxiliary
//! LP is a bound box closed under one round of propagation. Maximizing
//! `sum(xU - xL)` picks the widest such box.

mod builder;
mod directional;
mod variables;

pub use builder::{AuxColumn, AuxConstraint, AuxModel, AuxModelBuilder};
pub use directional::{directional_cut, row_cuts, Direction, Target};
pub use variables::{AuxKind, AuxLayout, AuxVar};
