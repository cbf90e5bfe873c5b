//! Auxiliary variables of the propagation LP and their engine layout.

use crate::settings::PropagationPolicy;

/// Role of an auxiliary variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuxKind {
    /// Propagated lower bound `xL_i` of column `i`.
    LowerCopy,
    /// Propagated upper bound `xU_i` of column `i`.
    UpperCopy,
    /// Propagated lower side `bL_j` of row `j` (extended model only).
    RowLowerAux,
    /// Propagated upper side `bU_j` of row `j` (extended model only).
    RowUpperAux,
}

/// Tagged auxiliary variable: its kind and the column or row that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AuxVar {
    /// Role.
    pub kind: AuxKind,
    /// Owning column (copies) or row (row-bound auxiliaries).
    pub owner: usize,
}

impl AuxVar {
    /// `xL_i`
    pub fn lower(column: usize) -> Self {
        Self {
            kind: AuxKind::LowerCopy,
            owner: column,
        }
    }

    /// `xU_i`
    pub fn upper(column: usize) -> Self {
        Self {
            kind: AuxKind::UpperCopy,
            owner: column,
        }
    }

    /// `bL_j`
    pub fn row_lower(row: usize) -> Self {
        Self {
            kind: AuxKind::RowLowerAux,
            owner: row,
        }
    }

    /// `bU_j`
    pub fn row_upper(row: usize) -> Self {
        Self {
            kind: AuxKind::RowUpperAux,
            owner: row,
        }
    }
}

/// Maps auxiliary variables to engine column indices and back.
///
/// ```text
/// [0, n)          LowerCopy
/// [n, 2n)         UpperCopy
/// [2n, 2n+m)      RowLowerAux   (extended model)
/// [2n+m, 2n+2m)   RowUpperAux   (extended model)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxLayout {
    n: usize,
    m: usize,
    policy: PropagationPolicy,
}

impl AuxLayout {
    /// Layout for `n` columns and `m` rows.
    pub fn new(n: usize, m: usize, policy: PropagationPolicy) -> Self {
        Self { n, m, policy }
    }

    /// Total number of auxiliary columns.
    pub fn num_vars(&self) -> usize {
        if self.policy.is_extended() {
            2 * self.n + 2 * self.m
        } else {
            2 * self.n
        }
    }

    /// Engine column of `var`, or `None` if it does not exist in this layout.
    pub fn index_of(&self, var: AuxVar) -> Option<usize> {
        let (base, limit) = match var.kind {
            AuxKind::LowerCopy => (0, self.n),
            AuxKind::UpperCopy => (self.n, self.n),
            AuxKind::RowLowerAux if self.policy.is_extended() => (2 * self.n, self.m),
            AuxKind::RowUpperAux if self.policy.is_extended() => (2 * self.n + self.m, self.m),
            _ => return None,
        };
        (var.owner < limit).then(|| base + var.owner)
    }

    /// Auxiliary variable stored at engine column `index`.
    pub fn var_at(&self, index: usize) -> Option<AuxVar> {
        let (n, m) = (self.n, self.m);
        if index < n {
            Some(AuxVar::lower(index))
        } else if index < 2 * n {
            Some(AuxVar::upper(index - n))
        } else if !self.policy.is_extended() {
            None
        } else if index < 2 * n + m {
            Some(AuxVar::row_lower(index - 2 * n))
        } else if index < 2 * n + 2 * m {
            Some(AuxVar::row_upper(index - 2 * n - m))
        } else {
            None
        }
    }

    /// Engine columns holding the lower copies.
    pub fn lower_range(&self) -> std::ops::Range<usize> {
        0..self.n
    }

    /// Engine columns holding the upper copies.
    pub fn upper_range(&self) -> std::ops::Range<usize> {
        self.n..2 * self.n
    }

    /// Iterate over all variables in engine order.
    pub fn iter(&self) -> impl Iterator<Item = AuxVar> + '_ {
        (0..self.num_vars()).filter_map(move |k| self.var_at(k))
    }
}
