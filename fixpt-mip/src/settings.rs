//! Configuration settings for fixed-point bound tightening.

use crate::error::{FbbtError, FbbtResult};

/// Which propagation model the auxiliary LP encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropagationPolicy {
    /// Row bounds are the constant row sides.
    #[default]
    RhsConstant,

    /// Row bounds are auxiliary variables that can themselves be tightened.
    ///
    /// Adds two variables per row, upward constraints on them, and a
    /// consistency constraint `bL_j <= bU_j`.
    ExtendedModel,
}

impl PropagationPolicy {
    /// Returns true if row-bound auxiliaries are part of the model.
    pub fn is_extended(self) -> bool {
        matches!(self, PropagationPolicy::ExtendedModel)
    }
}

/// Fixed-point FBBT settings.
///
/// These are static for the lifetime of an evaluator.
#[derive(Debug, Clone)]
pub struct FbbtSettings {
    /// Deepest node (root = 0) at which the evaluator runs.
    pub max_depth: usize,

    /// Propagation model.
    pub policy: PropagationPolicy,

    /// Numeric tolerance for rounding and for accepting a tightening.
    pub tolerance: f64,

    /// Magnitude at or beyond which a bound is considered infinite.
    pub infinity: f64,

    /// Name given to the auxiliary problem in the LP engine.
    pub problem_name: String,
}

impl Default for FbbtSettings {
    fn default() -> Self {
        Self {
            max_depth: 0,
            policy: PropagationPolicy::default(),
            tolerance: 1e-5,
            infinity: 1e20,
            problem_name: "FixPointLP".to_string(),
        }
    }
}

impl FbbtSettings {
    /// Settings for the extended row-bound model.
    pub fn extended() -> Self {
        Self {
            policy: PropagationPolicy::ExtendedModel,
            ..Self::default()
        }
    }

    /// Set maximum evaluation depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set propagation policy.
    pub fn with_policy(mut self, policy: PropagationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set numeric tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set the infinity threshold.
    pub fn with_infinity(mut self, infinity: f64) -> Self {
        self.infinity = infinity;
        self
    }

    /// Check that tolerances are usable.
    pub fn validate(&self) -> FbbtResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(FbbtError::InvalidSettings(format!(
                "tolerance must be finite and nonnegative, got {}",
                self.tolerance
            )));
        }
        if self.infinity.is_nan() || self.infinity <= 0.0 {
            return Err(FbbtError::InvalidSettings(format!(
                "infinity threshold must be positive, got {}",
                self.infinity
            )));
        }
        if self.tolerance >= self.infinity {
            return Err(FbbtError::InvalidSettings(
                "tolerance must be smaller than the infinity threshold".to_string(),
            ));
        }
        Ok(())
    }

    /// Map host values beyond the infinity threshold to IEEE infinities.
    pub fn normalize_bound(&self, value: f64) -> f64 {
        normalize_infinite(value, self.infinity)
    }
}

/// Map `value` to an IEEE infinity once its magnitude reaches `infinity`.
pub(crate) fn normalize_infinite(value: f64, infinity: f64) -> f64 {
    if value >= infinity {
        f64::INFINITY
    } else if value <= -infinity {
        f64::NEG_INFINITY
    } else {
        value
    }
}
