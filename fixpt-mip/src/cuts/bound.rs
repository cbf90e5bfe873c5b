//! Bound cuts reported to the host.

use std::fmt;

/// Which bound of a column a cut tightens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSense {
    /// `x_i >= value`
    Lower,
    /// `x_i <= value`
    Upper,
}

impl BoundSense {
    /// Host sense character (`G` for lower bounds, `L` for upper bounds).
    pub fn code(self) -> u8 {
        match self {
            BoundSense::Lower => b'G',
            BoundSense::Upper => b'L',
        }
    }
}

/// A single-column bound cut: `x_i >= value` or `x_i <= value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundCut {
    /// Column index.
    pub column: usize,

    /// New bound.
    pub value: f64,

    /// Lower or upper bound.
    pub sense: BoundSense,

    /// Host may drop the cut again once it stops being useful.
    pub purge_allowed: bool,
}

impl BoundCut {
    /// Lower bound cut `x_column >= value`.
    pub fn lower(column: usize, value: f64) -> Self {
        Self {
            column,
            value,
            sense: BoundSense::Lower,
            purge_allowed: true,
        }
    }

    /// Upper bound cut `x_column <= value`.
    pub fn upper(column: usize, value: f64) -> Self {
        Self {
            column,
            value,
            sense: BoundSense::Upper,
            purge_allowed: true,
        }
    }

    /// Amount by which `x` violates the cut (positive means violated).
    pub fn violation(&self, x: &[f64]) -> f64 {
        let xi = x.get(self.column).copied().unwrap_or(f64::NAN);
        match self.sense {
            BoundSense::Lower => self.value - xi,
            BoundSense::Upper => xi - self.value,
        }
    }

    /// Check whether `x` violates the cut by more than `tol`.
    pub fn is_violated(&self, x: &[f64], tol: f64) -> bool {
        self.violation(x) > tol
    }
}

impl fmt::Display for BoundCut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.sense {
            BoundSense::Lower => ">=",
            BoundSense::Upper => "<=",
        };
        write!(f, "x{} {} {}", self.column, op, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_violation() {
        let cut = BoundCut::upper(1, 2.0);
        assert!(!cut.is_violated(&[0.0, 2.0], 1e-6));
        assert!(cut.is_violated(&[0.0, 2.5], 1e-6));
        assert!((cut.violation(&[0.0, 2.5]) - 0.5).abs() < 1e-12);

        let cut = BoundCut::lower(0, 4.0);
        assert!(cut.is_violated(&[3.0], 1e-6));
        assert!(!cut.is_violated(&[4.0], 1e-6));
    }

    #[test]
    fn test_display_and_codes() {
        assert_eq!(BoundCut::lower(3, 1.5).to_string(), "x3 >= 1.5");
        assert_eq!(BoundCut::upper(0, 2.0).to_string(), "x0 <= 2");
        assert_eq!(BoundSense::Lower.code(), b'G');
        assert_eq!(BoundSense::Upper.code(), b'L');
        assert!(BoundCut::upper(0, 2.0).purge_allowed);
    }
}
