//! Node relaxation access.
//!
//! The evaluator never owns node data. It reads it through
//! [`NodeRelaxation`], which mirrors what a branch-and-bound callback can
//! query at a node: depth, column bounds and types, row headers, the sparse
//! rows, and the current relaxation solution.

use std::borrow::Cow;

use sprs::{CsMat, TriMat};

use super::{Column, RowHeader, RowView};
use crate::cuts::{BoundCut, BoundSense};
use crate::error::{FbbtError, FbbtResult};

/// Row-wise (CSR) sparse constraint matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMatrix {
    inner: CsMat<f64>,
}

impl RowMatrix {
    /// Build from `(row, col, value)` triplets.
    ///
    /// Duplicate entries are summed.
    pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> FbbtResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut tri = TriMat::new((nrows, ncols));
        for (i, j, v) in triplets {
            if i >= nrows || j >= ncols {
                return Err(FbbtError::InvalidNode(format!(
                    "entry ({}, {}) outside a {}x{} matrix",
                    i, j, nrows, ncols
                )));
            }
            if !v.is_finite() {
                return Err(FbbtError::InvalidNode(format!(
                    "non-finite coefficient {} at ({}, {})",
                    v, i, j
                )));
            }
            tri.add_triplet(i, j, v);
        }
        Ok(Self { inner: tri.to_csr() })
    }

    /// Build from one term list per row.
    pub fn from_rows(ncols: usize, rows: &[Vec<(usize, f64)>]) -> FbbtResult<Self> {
        let triplets = rows
            .iter()
            .enumerate()
            .flat_map(|(i, terms)| terms.iter().map(move |&(j, v)| (i, j, v)));
        Self::from_triplets(rows.len(), ncols, triplets)
    }

    /// Build from compressed row arrays (`row_starts` has `nrows + 1` entries).
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_starts: &[usize],
        columns: &[usize],
        coefs: &[f64],
    ) -> FbbtResult<Self> {
        if row_starts.len() != nrows + 1 || columns.len() != coefs.len() {
            return Err(FbbtError::InvalidNode(format!(
                "CSR arrays inconsistent: {} row starts for {} rows, {} indices, {} values",
                row_starts.len(),
                nrows,
                columns.len(),
                coefs.len()
            )));
        }
        if row_starts.windows(2).any(|w| w[0] > w[1]) || row_starts[nrows] != columns.len() {
            return Err(FbbtError::InvalidNode("row starts are not monotone".to_string()));
        }

        let triplets = (0..nrows).flat_map(|i| {
            (row_starts[i]..row_starts[i + 1]).map(move |k| (i, columns[k], coefs[k]))
        });
        Self::from_triplets(nrows, ncols, triplets)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.inner.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.inner.cols()
    }

    /// Number of stored nonzeros.
    pub fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    /// View of row `j`.
    pub fn row(&self, j: usize) -> RowView<'_> {
        match self.inner.outer_view(j) {
            Some(view) => {
                let (columns, coefs) = view.into_raw_storage();
                RowView {
                    index: j,
                    columns,
                    coefs,
                }
            }
            None => RowView {
                index: j,
                columns: &[],
                coefs: &[],
            },
        }
    }

    /// Iterate over all rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.rows()).map(move |j| self.row(j))
    }
}

/// Result of fetching the node rows into a caller-sized buffer.
#[derive(Debug, Clone)]
pub struct RowFetch<'a> {
    /// The rows themselves.
    pub rows: Cow<'a, RowMatrix>,

    /// Capacity minus nonzeros; negative when the requested space was too small.
    pub surplus: i64,
}

/// Read access to a search-tree node, supplied by the host per evaluation.
pub trait NodeRelaxation {
    /// Depth in the search tree (0 for root).
    fn depth(&self) -> usize;

    /// Columns with their current node bounds.
    fn columns(&self) -> &[Column];

    /// One header per row.
    fn row_headers(&self) -> &[RowHeader];

    /// Number of nonzeros the host reports for its row matrix.
    fn num_nonzeros(&self) -> usize;

    /// Fetch the sparse rows, with room for `capacity` nonzeros.
    fn fetch_rows(&self, capacity: usize) -> RowFetch<'_>;

    /// Current relaxation solution (one value per column).
    fn solution(&self) -> &[f64];
}

/// Owned node relaxation.
#[derive(Debug, Clone)]
pub struct NodeData {
    depth: usize,
    columns: Vec<Column>,
    headers: Vec<RowHeader>,
    rows: RowMatrix,
    solution: Vec<f64>,
}

impl NodeData {
    /// Create a node, checking that all dimensions agree.
    pub fn new(
        columns: Vec<Column>,
        headers: Vec<RowHeader>,
        rows: RowMatrix,
        solution: Vec<f64>,
    ) -> FbbtResult<Self> {
        let n = columns.len();
        if rows.cols() != n {
            return Err(FbbtError::InvalidNode(format!(
                "row matrix has {} columns but node has {}",
                rows.cols(),
                n
            )));
        }
        if rows.rows() != headers.len() {
            return Err(FbbtError::InvalidNode(format!(
                "row matrix has {} rows but {} headers were given",
                rows.rows(),
                headers.len()
            )));
        }
        if solution.len() != n {
            return Err(FbbtError::InvalidNode(format!(
                "solution has {} entries for {} columns",
                solution.len(),
                n
            )));
        }
        if let Some(i) = columns.iter().position(|c| !c.bounds_consistent()) {
            return Err(FbbtError::InvalidNode(format!(
                "column {} has bounds [{}, {}]",
                i, columns[i].lower, columns[i].upper
            )));
        }

        Ok(Self {
            depth: 0,
            columns,
            headers,
            rows,
            solution,
        })
    }

    /// Place the node at a given depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Apply a bound cut to the node's column bounds.
    ///
    /// Bounds only ever move inward; a looser cut is ignored.
    pub fn apply_cut(&mut self, cut: &BoundCut) -> FbbtResult<()> {
        let n = self.columns.len();
        let col = self.columns.get_mut(cut.column).ok_or_else(|| {
            FbbtError::InvalidNode(format!("cut on column {} but node has {}", cut.column, n))
        })?;
        match cut.sense {
            BoundSense::Lower => col.lower = col.lower.max(cut.value),
            BoundSense::Upper => col.upper = col.upper.min(cut.value),
        }
        Ok(())
    }

    /// Sparse rows.
    pub fn rows(&self) -> &RowMatrix {
        &self.rows
    }

    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.headers.len()
    }
}

impl NodeRelaxation for NodeData {
    fn depth(&self) -> usize {
        self.depth
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn row_headers(&self) -> &[RowHeader] {
        &self.headers
    }

    fn num_nonzeros(&self) -> usize {
        self.rows.nnz()
    }

    fn fetch_rows(&self, capacity: usize) -> RowFetch<'_> {
        RowFetch {
            rows: Cow::Borrowed(&self.rows),
            surplus: capacity as i64 - self.rows.nnz() as i64,
        }
    }

    fn solution(&self) -> &[f64] {
        &self.solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> RowMatrix {
        RowMatrix::from_rows(2, &[vec![(0, 1.0), (1, 1.0)], vec![(1, -2.0)]]).unwrap()
    }

    #[test]
    fn test_row_views() {
        let m = two_by_two();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.nnz(), 3);

        let r0: Vec<_> = m.row(0).terms().collect();
        assert_eq!(r0, vec![(0, 1.0), (1, 1.0)]);

        let r1 = m.row(1);
        assert_eq!(r1.index, 1);
        assert_eq!(r1.columns, &[1]);
        assert_eq!(r1.coefs, &[-2.0]);
    }

    #[test]
    fn test_duplicates_summed() {
        let m = RowMatrix::from_rows(2, &[vec![(1, 1.0), (0, 2.0), (1, 3.0)]]).unwrap();
        let terms: Vec<_> = m.row(0).terms().collect();
        assert_eq!(terms, vec![(0, 2.0), (1, 4.0)]);
    }

    #[test]
    fn test_from_csr_matches_rows() {
        let csr = RowMatrix::from_csr(2, 2, &[0, 2, 3], &[0, 1, 1], &[1.0, 1.0, -2.0]).unwrap();
        assert_eq!(csr, two_by_two());

        assert!(RowMatrix::from_csr(2, 2, &[0, 2], &[0, 1], &[1.0, 1.0]).is_err());
        assert!(RowMatrix::from_csr(1, 2, &[0, 1], &[5], &[1.0]).is_err());
    }

    #[test]
    fn test_node_dimension_checks() {
        let cols = vec![Column::continuous(0.0, 1.0); 2];
        let headers = vec![RowHeader::le(1.0), RowHeader::ge(0.0)];

        assert!(NodeData::new(cols.clone(), headers.clone(), two_by_two(), vec![0.0; 2]).is_ok());
        assert!(NodeData::new(cols.clone(), headers[..1].to_vec(), two_by_two(), vec![0.0; 2]).is_err());
        assert!(NodeData::new(cols, headers, two_by_two(), vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_fetch_surplus() {
        let node = NodeData::new(
            vec![Column::continuous(0.0, 1.0); 2],
            vec![RowHeader::le(1.0), RowHeader::ge(0.0)],
            two_by_two(),
            vec![0.0; 2],
        )
        .unwrap();

        assert_eq!(node.fetch_rows(3).surplus, 0);
        assert_eq!(node.fetch_rows(1).surplus, -2);
    }

    #[test]
    fn test_apply_cut_moves_inward_only() {
        let mut node = NodeData::new(
            vec![Column::continuous(0.0, 8.0); 2],
            vec![RowHeader::le(10.0), RowHeader::le(10.0)],
            two_by_two(),
            vec![0.0; 2],
        )
        .unwrap();

        node.apply_cut(&BoundCut::upper(0, 2.0)).unwrap();
        node.apply_cut(&BoundCut::upper(0, 5.0)).unwrap();
        node.apply_cut(&BoundCut::lower(1, 1.5)).unwrap();

        assert_eq!(node.columns()[0].upper, 2.0);
        assert_eq!(node.columns()[1].lower, 1.5);
        assert!(node.apply_cut(&BoundCut::lower(9, 0.0)).is_err());
    }
}
