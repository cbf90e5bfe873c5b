//! Node relaxation data as seen by the bound tightener.

mod column;
mod node;
mod row;

pub use column::{Column, ColumnType};
pub use node::{NodeData, NodeRelaxation, RowFetch, RowMatrix};
pub use row::{translate_rows, RowHeader, RowInterval, RowSense, RowView};
