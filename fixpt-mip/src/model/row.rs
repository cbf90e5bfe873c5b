//! Constraint rows and their translation to explicit intervals.
//!
//! Hosts describe a row the way LP engines usually do: a sense code, a
//! right-hand side, and a range width that only matters for ranged rows.
//! Propagation wants the explicit interval `rowLower <= a^T x <= rowUpper`.

use crate::error::{FbbtError, FbbtResult};
use crate::settings::normalize_infinite;

/// Sense of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    /// `a^T x <= rhs`
    Le,
    /// `a^T x = rhs`
    Eq,
    /// `a^T x >= rhs`
    Ge,
    /// `rhs <= a^T x <= rhs + range`
    Range,
}

impl RowSense {
    /// Parse a host sense code (`L`, `E`, `G`, `R`).
    ///
    /// `row` is only used for the error message.
    pub fn from_code(row: usize, code: u8) -> FbbtResult<Self> {
        match code {
            b'L' => Ok(RowSense::Le),
            b'E' => Ok(RowSense::Eq),
            b'G' => Ok(RowSense::Ge),
            b'R' => Ok(RowSense::Range),
            other => Err(FbbtError::Configuration {
                row,
                sense: other as char,
            }),
        }
    }

    /// Host sense code for this sense.
    pub fn code(self) -> u8 {
        match self {
            RowSense::Le => b'L',
            RowSense::Eq => b'E',
            RowSense::Ge => b'G',
            RowSense::Range => b'R',
        }
    }
}

/// Sense, right-hand side and range of one row, as supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHeader {
    /// Raw sense code.
    pub sense: u8,
    /// Right-hand side.
    pub rhs: f64,
    /// Range width (ranged rows only).
    pub range: f64,
}

impl RowHeader {
    /// Header with an explicit sense.
    pub fn new(sense: RowSense, rhs: f64, range: f64) -> Self {
        Self {
            sense: sense.code(),
            rhs,
            range,
        }
    }

    /// `a^T x <= rhs`
    pub fn le(rhs: f64) -> Self {
        Self::new(RowSense::Le, rhs, 0.0)
    }

    /// `a^T x = rhs`
    pub fn eq(rhs: f64) -> Self {
        Self::new(RowSense::Eq, rhs, 0.0)
    }

    /// `a^T x >= rhs`
    pub fn ge(rhs: f64) -> Self {
        Self::new(RowSense::Ge, rhs, 0.0)
    }

    /// `lower <= a^T x <= lower + width`
    pub fn ranged(lower: f64, width: f64) -> Self {
        Self::new(RowSense::Range, lower, width)
    }
}

/// Explicit interval `[lower, upper]` a row activity must lie in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowInterval {
    /// Row lower bound (may be `-inf`).
    pub lower: f64,
    /// Row upper bound (may be `+inf`).
    pub upper: f64,
}

impl RowInterval {
    /// Translate a row header into its interval.
    ///
    /// Sides whose magnitude reaches `infinity` become IEEE infinities.
    pub fn translate(row: usize, header: &RowHeader, infinity: f64) -> FbbtResult<Self> {
        let rhs = header.rhs;
        let (lower, upper) = match RowSense::from_code(row, header.sense)? {
            RowSense::Le => (f64::NEG_INFINITY, rhs),
            RowSense::Eq => (rhs, rhs),
            RowSense::Ge => (rhs, f64::INFINITY),
            RowSense::Range => (rhs, rhs + header.range),
        };

        Ok(Self {
            lower: normalize_infinite(lower, infinity),
            upper: normalize_infinite(upper, infinity),
        })
    }

    /// Returns true if the `>=` half of the row is present.
    pub fn has_lower(&self) -> bool {
        self.lower.is_finite()
    }

    /// Returns true if the `<=` half of the row is present.
    pub fn has_upper(&self) -> bool {
        self.upper.is_finite()
    }
}

/// Translate every row header of a node.
///
/// Fails on the first row with an undefined sense.
pub fn translate_rows(headers: &[RowHeader], infinity: f64) -> FbbtResult<Vec<RowInterval>> {
    headers
        .iter()
        .enumerate()
        .map(|(j, h)| RowInterval::translate(j, h, infinity))
        .collect()
}

/// Borrowed view of one sparse row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    /// Row index in the node relaxation.
    pub index: usize,
    /// Column indices of the nonzeros.
    pub columns: &'a [usize],
    /// Coefficients, parallel to `columns`.
    pub coefs: &'a [f64],
}

impl<'a> RowView<'a> {
    /// Number of nonzeros.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true for a row with no terms.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over `(column, coefficient)` pairs.
    pub fn terms(&self) -> impl Iterator<Item = (usize, f64)> + 'a {
        self.columns.iter().copied().zip(self.coefs.iter().copied())
    }
}
