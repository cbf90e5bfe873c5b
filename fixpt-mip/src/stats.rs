//! Aggregate statistics over all evaluations of one evaluator.

use std::fmt;
use std::time::Duration;

/// Counters accumulated across node evaluations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStatistics {
    /// Evaluations that passed the depth gate.
    pub runs: u64,

    /// Lower bound cuts accepted by the host.
    pub tightened_lower: u64,

    /// Upper bound cuts accepted by the host.
    pub tightened_upper: u64,

    /// Time spent in evaluations that passed the depth gate.
    pub elapsed: Duration,
}

impl RunStatistics {
    /// Total accepted cuts.
    pub fn tightened(&self) -> u64 {
        self.tightened_lower + self.tightened_upper
    }

    /// Fold another worker's statistics into these.
    pub fn merge(&mut self, other: &RunStatistics) {
        self.runs += other.runs;
        self.tightened_lower += other.tightened_lower;
        self.tightened_upper += other.tightened_upper;
        self.elapsed += other.elapsed;
    }

    /// One-line CSV report: seconds, runs, then placeholders for fields
    /// this generator does not track.
    pub fn csv_row(&self) -> String {
        format!("{},{},-1,-1,-1,-1,-1,", self.elapsed.as_secs_f64(), self.runs)
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ran {} times, tightened {} lower and {} upper bounds, time: {:.3}s",
            self.runs,
            self.tightened_lower,
            self.tightened_upper,
            self.elapsed.as_secs_f64()
        )
    }
}
