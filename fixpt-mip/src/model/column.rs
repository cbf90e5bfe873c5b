//! Column (variable) data of a node relaxation.

/// Integrality of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    /// Continuous variable
    #[default]
    Continuous,
    /// Integer variable
    Integer,
    /// Binary variable (0 or 1)
    Binary,
}

impl ColumnType {
    /// Returns true for integer and binary columns.
    pub fn is_integral(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Binary)
    }

    /// Round a propagated interval inward to integers.
    ///
    /// Values within `tol` of an integer snap to it instead of being pushed
    /// past it. Continuous columns are returned unchanged.
    pub fn round_inward(self, lower: f64, upper: f64, tol: f64) -> (f64, f64) {
        if self.is_integral() {
            ((lower - tol).ceil(), (upper + tol).floor())
        } else {
            (lower, upper)
        }
    }
}

/// One column of the node relaxation: current bounds and integrality.
///
/// The column index is its position in the node's column slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    /// Current node lower bound (may be `-inf`).
    pub lower: f64,
    /// Current node upper bound (may be `+inf`).
    pub upper: f64,
    /// Integrality flag.
    pub col_type: ColumnType,
}

impl Column {
    /// Continuous column in `[lower, upper]`.
    pub fn continuous(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            col_type: ColumnType::Continuous,
        }
    }

    /// Integer column in `[lower, upper]`.
    pub fn integer(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            col_type: ColumnType::Integer,
        }
    }

    /// Binary column with its implicit `[0, 1]` bounds.
    pub fn binary() -> Self {
        Self {
            lower: 0.0,
            upper: 1.0,
            col_type: ColumnType::Binary,
        }
    }

    /// Check that the bounds are ordered and not NaN.
    pub fn bounds_consistent(&self) -> bool {
        !self.lower.is_nan() && !self.upper.is_nan() && self.lower <= self.upper
    }
}
