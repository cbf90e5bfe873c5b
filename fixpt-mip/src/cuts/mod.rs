//! Bound cuts and the host interface that receives them.

mod bound;
mod sink;

pub use bound::{BoundCut, BoundSense};
pub use sink::{CutCollector, CutSink};
