//! Directional propagation constraints.
//!
//! For row `j` with interval `[b_lo, b_hi]` and a target column `i`, one
//! propagation step bounds `x_i` by the row side minus the extreme activity
//! of the other terms. Written over the auxiliary copies:
//!
//! ```text
//! a_ji xL_i + sum_{I+} a_jk xU_k + sum_{I-} a_jk xL_k >= b_lo   (lower side, a_ji > 0)
//! a_ji xU_i + sum_{I+} a_jk xL_k + sum_{I-} a_jk xU_k <= b_hi   (upper side, a_ji > 0)
//! a_ji xU_i + sum_{I+} a_jk xU_k + sum_{I-} a_jk xL_k >= b_lo   (lower side, a_ji < 0)
//! a_ji xL_i + sum_{I+} a_jk xL_k + sum_{I-} a_jk xU_k <= b_hi   (upper side, a_ji < 0)
//! ```
//!
//! In the extended model the constant side is replaced by `bL_j` / `bU_j`.

use super::builder::AuxConstraint;
use super::variables::AuxVar;
use crate::engine::ConstraintSense;
use crate::model::{RowInterval, RowView};
use crate::settings::PropagationPolicy;

/// Which half of a row is propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The `>=` half (sign -1).
    Lower,
    /// The `<=` half (sign +1).
    Upper,
}

impl Direction {
    /// Both directions, lower first.
    pub const BOTH: [Direction; 2] = [Direction::Lower, Direction::Upper];

    /// -1 for the lower half, +1 for the upper half.
    pub fn sign(self) -> i8 {
        match self {
            Direction::Lower => -1,
            Direction::Upper => 1,
        }
    }

    /// Engine sense of the emitted constraint.
    pub fn sense(self) -> ConstraintSense {
        match self {
            Direction::Lower => ConstraintSense::Ge,
            Direction::Upper => ConstraintSense::Le,
        }
    }

    /// Row-bound auxiliary replacing the constant side in the extended model.
    pub fn row_bound(self, row: usize) -> AuxVar {
        match self {
            Direction::Lower => AuxVar::row_lower(row),
            Direction::Upper => AuxVar::row_upper(row),
        }
    }

    /// Copy used for a non-target column with coefficient `coef`.
    fn other_copy(self, column: usize, coef: f64) -> AuxVar {
        let upper = match self {
            Direction::Lower => coef > 0.0,
            Direction::Upper => coef < 0.0,
        };
        if upper {
            AuxVar::upper(column)
        } else {
            AuxVar::lower(column)
        }
    }

    /// Copy used for the target column: the opposite of what the others get.
    fn target_copy(self, column: usize, coef: f64) -> AuxVar {
        let upper = match self {
            Direction::Lower => coef < 0.0,
            Direction::Upper => coef > 0.0,
        };
        if upper {
            AuxVar::upper(column)
        } else {
            AuxVar::lower(column)
        }
    }

    /// Whether this half of `interval` is propagated under `policy`.
    pub fn applies(self, interval: &RowInterval, policy: PropagationPolicy) -> bool {
        policy.is_extended()
            || match self {
                Direction::Lower => interval.has_lower(),
                Direction::Upper => interval.has_upper(),
            }
    }
}

/// What a directional constraint derives a bound for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Bound of one column of the row.
    Column(usize),
    /// The row side itself (extended model only).
    RowBound,
}

/// Emit the directional constraint for `target` on one half of `row`.
///
/// Returns `None` when the half does not apply (infinite side in the plain
/// model), when the target column is not in the row, or for a row-bound
/// target in the plain model.
pub fn directional_cut(
    row: &RowView<'_>,
    interval: &RowInterval,
    target: Target,
    direction: Direction,
    policy: PropagationPolicy,
) -> Option<AuxConstraint> {
    if !direction.applies(interval, policy) {
        return None;
    }

    let mut terms = Vec::with_capacity(row.len() + 1);
    match target {
        Target::Column(i) => {
            let coef = row.terms().find(|&(k, _)| k == i).map(|(_, a)| a)?;
            if coef == 0.0 {
                return None;
            }
            terms.push((direction.target_copy(i, coef), coef));
        }
        Target::RowBound if !policy.is_extended() => return None,
        Target::RowBound => {}
    }

    let skip = match target {
        Target::Column(i) => Some(i),
        Target::RowBound => None,
    };
    terms.extend(
        row.terms()
            .filter(|&(k, a)| Some(k) != skip && a != 0.0)
            .map(|(k, a)| (direction.other_copy(k, a), a)),
    );

    let rhs = if policy.is_extended() {
        terms.push((direction.row_bound(row.index), -1.0));
        0.0
    } else {
        match direction {
            Direction::Lower => interval.lower,
            Direction::Upper => interval.upper,
        }
    };

    Some(AuxConstraint {
        sense: direction.sense(),
        rhs,
        terms,
    })
}

/// All directional constraints of one row.
///
/// Per column of the row, the lower half then the upper half where they
/// apply; in the extended model, followed by the two row-bound constraints.
/// Rows without terms produce nothing.
pub fn row_cuts(
    row: &RowView<'_>,
    interval: &RowInterval,
    policy: PropagationPolicy,
) -> Vec<AuxConstraint> {
    if row.is_empty() {
        return Vec::new();
    }

    let mut cuts = Vec::with_capacity(2 * row.len() + 2);
    for &column in row.columns {
        for direction in Direction::BOTH {
            cuts.extend(directional_cut(row, interval, Target::Column(column), direction, policy));
        }
    }
    for direction in Direction::BOTH {
        cuts.extend(directional_cut(row, interval, Target::RowBound, direction, policy));
    }
    cuts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row<'a>(columns: &'a [usize], coefs: &'a [f64]) -> RowView<'a> {
        RowView {
            index: 0,
            columns,
            coefs,
        }
    }

    fn interval(lower: f64, upper: f64) -> RowInterval {
        RowInterval { lower, upper }
    }

    #[test]
    fn test_sign_to_sense() {
        assert_eq!(Direction::Lower.sign(), -1);
        assert_eq!(Direction::Upper.sign(), 1);
        assert_eq!(Direction::Lower.sense(), ConstraintSense::Ge);
        assert_eq!(Direction::Upper.sense(), ConstraintSense::Le);
    }

    #[test]
    fn test_canonical_positive_target() {
        // 2 x0 + 3 x1 - x2 in [1, 5]
        let cols = [0, 1, 2];
        let coefs = [2.0, 3.0, -1.0];
        let r = row(&cols, &coefs);
        let iv = interval(1.0, 5.0);
        let plain = PropagationPolicy::RhsConstant;

        let lo = directional_cut(&r, &iv, Target::Column(0), Direction::Lower, plain).unwrap();
        assert_eq!(lo.sense, ConstraintSense::Ge);
        assert_eq!(lo.rhs, 1.0);
        assert_eq!(
            lo.terms,
            vec![
                (AuxVar::lower(0), 2.0),
                (AuxVar::upper(1), 3.0),
                (AuxVar::lower(2), -1.0)
            ]
        );

        let up = directional_cut(&r, &iv, Target::Column(0), Direction::Upper, plain).unwrap();
        assert_eq!(up.sense, ConstraintSense::Le);
        assert_eq!(up.rhs, 5.0);
        assert_eq!(
            up.terms,
            vec![
                (AuxVar::upper(0), 2.0),
                (AuxVar::lower(1), 3.0),
                (AuxVar::upper(2), -1.0)
            ]
        );
    }

    #[test]
    fn test_canonical_negative_target() {
        let cols = [0, 1, 2];
        let coefs = [2.0, 3.0, -1.0];
        let r = row(&cols, &coefs);
        let iv = interval(1.0, 5.0);
        let plain = PropagationPolicy::RhsConstant;

        let lo = directional_cut(&r, &iv, Target::Column(2), Direction::Lower, plain).unwrap();
        assert_eq!(
            lo.terms,
            vec![
                (AuxVar::upper(2), -1.0),
                (AuxVar::upper(0), 2.0),
                (AuxVar::upper(1), 3.0)
            ]
        );

        let up = directional_cut(&r, &iv, Target::Column(2), Direction::Upper, plain).unwrap();
        assert_eq!(
            up.terms,
            vec![
                (AuxVar::lower(2), -1.0),
                (AuxVar::lower(0), 2.0),
                (AuxVar::lower(1), 3.0)
            ]
        );
    }

    #[test]
    fn test_infinite_side_skipped_in_plain_model() {
        let cols = [0, 1];
        let coefs = [1.0, 1.0];
        let r = row(&cols, &coefs);
        let le = interval(f64::NEG_INFINITY, 10.0);

        assert!(directional_cut(&r, &le, Target::Column(0), Direction::Lower, PropagationPolicy::RhsConstant).is_none());
        assert_eq!(row_cuts(&r, &le, PropagationPolicy::RhsConstant).len(), 2);
    }

    #[test]
    fn test_extended_model_terms() {
        let cols = [0, 1];
        let coefs = [1.0, -1.0];
        let r = RowView {
            index: 4,
            columns: &cols,
            coefs: &coefs,
        };
        let le = interval(f64::NEG_INFINITY, 10.0);
        let ext = PropagationPolicy::ExtendedModel;

        let lo = directional_cut(&r, &le, Target::Column(1), Direction::Lower, ext).unwrap();
        assert_eq!(lo.rhs, 0.0);
        assert_eq!(lo.terms.last(), Some(&(AuxVar::row_lower(4), -1.0)));

        let upward = directional_cut(&r, &le, Target::RowBound, Direction::Upper, ext).unwrap();
        assert_eq!(
            upward.terms,
            vec![
                (AuxVar::lower(0), 1.0),
                (AuxVar::upper(1), -1.0),
                (AuxVar::row_upper(4), -1.0)
            ]
        );

        // two columns x two halves, plus two row-bound constraints
        assert_eq!(row_cuts(&r, &le, ext).len(), 6);
    }

    #[test]
    fn test_degenerate_inputs() {
        let r = row(&[], &[]);
        assert!(row_cuts(&r, &interval(0.0, 1.0), PropagationPolicy::ExtendedModel).is_empty());

        let cols = [0];
        let coefs = [1.0];
        let r = row(&cols, &coefs);
        let iv = interval(0.0, 1.0);
        assert!(directional_cut(&r, &iv, Target::Column(3), Direction::Upper, PropagationPolicy::RhsConstant).is_none());
        assert!(directional_cut(&r, &iv, Target::RowBound, Direction::Upper, PropagationPolicy::RhsConstant).is_none());
    }
}
