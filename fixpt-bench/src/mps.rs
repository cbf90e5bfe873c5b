//! MPS reader for mixed-integer linear models.
//!
//! Free-format MPS: fields are separated by whitespace, so names must not
//! contain blanks.
//!
//! Sections:
//! - NAME: problem name
//! - OBJSENSE: MIN or MAX (optional, value on the same or the next line)
//! - ROWS: row definitions (N=objective, E/L/G=equality/less/greater)
//! - COLUMNS: matrix coefficients, with MARKER INTORG/INTEND integer blocks
//! - RHS: right-hand sides
//! - RANGES: range widths (optional)
//! - BOUNDS: column bounds (optional)
//! - ENDATA: end marker

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use fixpt_mip::{Column, ColumnType, RowHeader, RowMatrix};

/// A parsed MPS model.
#[derive(Debug, Clone)]
pub struct MpsModel {
    /// Problem name
    pub name: String,
    /// Objective sense (1 = minimize, -1 = maximize)
    pub obj_sense: f64,
    /// Objective coefficients (length n)
    pub objective: Vec<f64>,
    /// Column bounds and integrality (length n)
    pub columns: Vec<Column>,
    /// Row sense, rhs and range (length m)
    pub headers: Vec<RowHeader>,
    /// Sparse rows as (column, coefficient) lists (length m)
    pub rows: Vec<Vec<(usize, f64)>>,
    /// Column names
    pub col_names: Vec<String>,
    /// Row names
    pub row_names: Vec<String>,
}

impl MpsModel {
    /// Number of columns.
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Number of constraint rows (objective excluded).
    pub fn num_rows(&self) -> usize {
        self.headers.len()
    }

    /// Number of integer and binary columns.
    pub fn num_integral(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.col_type.is_integral())
            .count()
    }

    /// Row-wise constraint matrix.
    pub fn matrix(&self) -> Result<RowMatrix> {
        RowMatrix::from_rows(self.num_cols(), &self.rows)
            .with_context(|| format!("Building constraint matrix of {}", self.name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    ObjSense,
    Rows,
    Columns,
    Rhs,
    Ranges,
    Bounds,
}

/// Converts MPS row type and range value into a row header.
///
/// ```text
/// type  R      interval
/// E     >= 0   [rhs, rhs + |R|]
/// E     < 0    [rhs - |R|, rhs]
/// L     any    [rhs - |R|, rhs]
/// G     any    [rhs, rhs + |R|]
/// ```
fn row_header(rtype: char, rhs: f64, range: Option<f64>) -> RowHeader {
    match (rtype, range) {
        ('L', None) => RowHeader::le(rhs),
        ('G', None) => RowHeader::ge(rhs),
        (_, None) => RowHeader::eq(rhs),
        ('E', Some(r)) if r >= 0.0 => RowHeader::ranged(rhs, r),
        ('G', Some(r)) => RowHeader::ranged(rhs, r.abs()),
        (_, Some(r)) => RowHeader::ranged(rhs - r.abs(), r.abs()),
    }
}

fn parse_value(token: &str, line_no: usize) -> Result<f64> {
    token
        .parse()
        .with_context(|| format!("line {}: bad number {:?}", line_no, token))
}

/// Read an MPS file.
pub fn read_mps<P: AsRef<Path>>(path: P) -> Result<MpsModel> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("Failed to open MPS file: {:?}", path.as_ref()))?;
    parse_mps(BufReader::new(file))
}

/// Parse an MPS model from a reader.
pub fn parse_mps<R: BufRead>(reader: R) -> Result<MpsModel> {
    let mut name = String::from("unknown");
    let mut obj_sense = 1.0;
    let mut obj_row: Option<String> = None;

    let mut row_map: HashMap<String, usize> = HashMap::new();
    let mut row_names: Vec<String> = Vec::new();
    let mut row_types: Vec<char> = Vec::new();
    let mut rows: Vec<Vec<(usize, f64)>> = Vec::new();

    let mut col_map: HashMap<String, usize> = HashMap::new();
    let mut col_names: Vec<String> = Vec::new();
    let mut objective: Vec<f64> = Vec::new();
    let mut col_types: Vec<ColumnType> = Vec::new();

    let mut rhs: Vec<f64> = Vec::new();
    let mut ranges: Vec<Option<f64>> = Vec::new();
    let mut lower: Vec<Option<f64>> = Vec::new();
    let mut upper: Vec<Option<f64>> = Vec::new();

    let mut section = Section::None;
    let mut in_integer_block = false;

    for (k, line_result) in reader.lines().enumerate() {
        let line_no = k + 1;
        let line_raw = line_result?;
        let line = line_raw.trim();

        if line.is_empty() || line.starts_with('*') {
            continue;
        }

        // Section headers start in column 1
        if !line_raw.starts_with(char::is_whitespace) {
            let mut tokens = line.split_whitespace();
            let keyword = tokens.next().unwrap_or_default();
            section = match keyword {
                "NAME" => {
                    if let Some(n) = tokens.next() {
                        name = n.to_string();
                    }
                    Section::None
                }
                "OBJSENSE" => match tokens.next() {
                    Some(s) => {
                        obj_sense = if s.starts_with("MAX") { -1.0 } else { 1.0 };
                        Section::None
                    }
                    None => Section::ObjSense,
                },
                "ROWS" => Section::Rows,
                "COLUMNS" => Section::Columns,
                "RHS" => Section::Rhs,
                "RANGES" => Section::Ranges,
                "BOUNDS" => Section::Bounds,
                "ENDATA" => break,
                other => bail!("line {}: unknown section {:?}", line_no, other),
            };
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();

        match section {
            Section::ObjSense => {
                obj_sense = if tokens[0].starts_with("MAX") { -1.0 } else { 1.0 };
            }
            Section::Rows => {
                if tokens.len() < 2 {
                    bail!("line {}: row needs a type and a name", line_no);
                }
                let rtype = tokens[0].chars().next().unwrap_or('?');
                let rname = tokens[1].to_string();
                match rtype {
                    'N' => {
                        // further free rows are ignored
                        if obj_row.is_none() {
                            obj_row = Some(rname);
                        }
                    }
                    'E' | 'L' | 'G' => {
                        row_map.insert(rname.clone(), row_names.len());
                        row_names.push(rname);
                        row_types.push(rtype);
                        rows.push(Vec::new());
                        rhs.push(0.0);
                        ranges.push(None);
                    }
                    other => bail!("line {}: unknown row type {:?}", line_no, other),
                }
            }
            Section::Columns => {
                if tokens.len() >= 3 && tokens[1] == "'MARKER'" {
                    match tokens[2] {
                        "'INTORG'" => in_integer_block = true,
                        "'INTEND'" => in_integer_block = false,
                        other => bail!("line {}: unknown marker {}", line_no, other),
                    }
                    continue;
                }
                if tokens.len() < 3 || tokens.len() % 2 == 0 {
                    bail!("line {}: malformed COLUMNS entry", line_no);
                }

                let cname = tokens[0];
                let j = match col_map.get(cname) {
                    Some(&j) => j,
                    None => {
                        let j = col_names.len();
                        col_map.insert(cname.to_string(), j);
                        col_names.push(cname.to_string());
                        objective.push(0.0);
                        col_types.push(if in_integer_block {
                            ColumnType::Integer
                        } else {
                            ColumnType::Continuous
                        });
                        lower.push(None);
                        upper.push(None);
                        j
                    }
                };

                for pair in tokens[1..].chunks(2) {
                    let value = parse_value(pair[1], line_no)?;
                    if Some(pair[0]) == obj_row.as_deref() {
                        objective[j] = value;
                    } else if let Some(&i) = row_map.get(pair[0]) {
                        rows[i].push((j, value));
                    } else {
                        bail!("line {}: unknown row {}", line_no, pair[0]);
                    }
                }
            }
            Section::Rhs | Section::Ranges => {
                // The set name is optional in free format
                let pairs = if tokens.len() % 2 == 1 {
                    &tokens[1..]
                } else {
                    &tokens[..]
                };
                for pair in pairs.chunks(2) {
                    let value = parse_value(pair[1], line_no)?;
                    if Some(pair[0]) == obj_row.as_deref() {
                        if section == Section::Rhs {
                            log::debug!("ignoring objective constant {}", -value);
                        }
                        continue;
                    }
                    let i = *row_map
                        .get(pair[0])
                        .ok_or_else(|| anyhow!("line {}: unknown row {}", line_no, pair[0]))?;
                    if section == Section::Rhs {
                        rhs[i] = value;
                    } else {
                        ranges[i] = Some(value);
                    }
                }
            }
            Section::Bounds => {
                let btype = tokens[0];
                let needs_value = !matches!(btype, "FR" | "MI" | "PL" | "BV");
                if tokens.len() < 2 || (needs_value && tokens.len() < 3) {
                    bail!("line {}: malformed BOUNDS entry", line_no);
                }
                // The set name is optional
                let (cname, value_tok) = match (needs_value, tokens.len()) {
                    (true, 3) => (tokens[1], Some(tokens[2])),
                    (true, _) => (tokens[2], Some(tokens[3])),
                    (false, 2) => (tokens[1], None),
                    (false, _) => (tokens[2], None),
                };
                let j = *col_map
                    .get(cname)
                    .ok_or_else(|| anyhow!("line {}: unknown column {}", line_no, cname))?;
                let value = value_tok.map(|t| parse_value(t, line_no)).transpose()?;

                match (btype, value) {
                    ("LO", Some(v)) => lower[j] = Some(v),
                    ("UP", Some(v)) => {
                        if v < 0.0 && lower[j].is_none() {
                            log::warn!("column {} has negative upper bound and no lower bound, making it free below", cname);
                            lower[j] = Some(f64::NEG_INFINITY);
                        }
                        upper[j] = Some(v);
                    }
                    ("FX", Some(v)) => {
                        lower[j] = Some(v);
                        upper[j] = Some(v);
                    }
                    ("LI", Some(v)) => {
                        lower[j] = Some(v);
                        col_types[j] = ColumnType::Integer;
                    }
                    ("UI", Some(v)) => {
                        upper[j] = Some(v);
                        col_types[j] = ColumnType::Integer;
                    }
                    ("FR", _) => {
                        lower[j] = Some(f64::NEG_INFINITY);
                        upper[j] = Some(f64::INFINITY);
                    }
                    ("MI", _) => lower[j] = Some(f64::NEG_INFINITY),
                    ("PL", _) => upper[j] = Some(f64::INFINITY),
                    ("BV", _) => {
                        lower[j] = Some(0.0);
                        upper[j] = Some(1.0);
                        col_types[j] = ColumnType::Binary;
                    }
                    (other, _) => bail!("line {}: unknown bound type {}", line_no, other),
                }
            }
            Section::None => bail!("line {}: data outside of a section", line_no),
        }
    }

    if col_names.is_empty() {
        return Err(anyhow!("No columns found in MPS file"));
    }

    let columns = col_types
        .iter()
        .enumerate()
        .map(|(j, &col_type)| Column {
            lower: lower[j].unwrap_or(0.0),
            upper: upper[j].unwrap_or(f64::INFINITY),
            col_type,
        })
        .collect();

    let headers = row_types
        .iter()
        .enumerate()
        .map(|(i, &rtype)| row_header(rtype, rhs[i], ranges[i]))
        .collect();

    log::debug!(
        "read {}: {} rows, {} columns",
        name,
        row_names.len(),
        col_names.len()
    );

    Ok(MpsModel {
        name,
        obj_sense,
        objective,
        columns,
        headers,
        rows,
        col_names,
        row_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(content: &str) -> MpsModel {
        parse_mps(Cursor::new(content)).unwrap()
    }

    const KNAP: &str = r#"NAME          KNAP
OBJSENSE
    MAX
ROWS
 N  PROFIT
 L  CAP
 G  MINW
 E  LINK
COLUMNS
    MARKER                 'MARKER'                 'INTORG'
    X1        PROFIT       3.0   CAP          2.0
    X1        MINW         1.0
    MARKER                 'MARKER'                 'INTEND'
    Y         PROFIT       1.0   CAP          1.0
    Y         LINK         1.0
    Z         LINK        -1.0
RHS
    RHS       CAP          10.0  MINW         1.0
RANGES
    RNG       CAP          4.0
BOUNDS
 UP BND       X1           5.0
 BV BND       Z
 FR BND       Y
ENDATA
"#;

    #[test]
    fn test_parse_small_mip() {
        let m = parse(KNAP);
        assert_eq!(m.name, "KNAP");
        assert_eq!(m.obj_sense, -1.0);
        assert_eq!(m.num_cols(), 3);
        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.objective, vec![3.0, 1.0, 0.0]);
        assert_eq!(m.num_integral(), 2);

        assert_eq!(m.columns[0], Column::integer(0.0, 5.0));
        assert_eq!(m.columns[1].lower, f64::NEG_INFINITY);
        assert_eq!(m.columns[2], Column::binary());

        assert_eq!(m.rows[0], vec![(0, 2.0), (1, 1.0)]);
        assert_eq!(m.rows[2], vec![(1, 1.0), (2, -1.0)]);
    }

    #[test]
    fn test_ranges_follow_mps_semantics() {
        let m = parse(KNAP);
        // L row with range 4: [6, 10]
        assert_eq!(m.headers[0], RowHeader::ranged(6.0, 4.0));
        assert_eq!(m.headers[1], RowHeader::ge(1.0));
        assert_eq!(m.headers[2], RowHeader::eq(0.0));

        assert_eq!(row_header('E', 3.0, Some(-2.0)), RowHeader::ranged(1.0, 2.0));
        assert_eq!(row_header('E', 3.0, Some(2.0)), RowHeader::ranged(3.0, 2.0));
        assert_eq!(row_header('G', 3.0, Some(-2.0)), RowHeader::ranged(3.0, 2.0));
    }

    #[test]
    fn test_matrix_and_defaults() {
        let m = parse(
            "NAME T\nROWS\n N OBJ\n L C1\nCOLUMNS\n    X OBJ 1 C1 1\n    Y C1 2\nRHS\n    C1 4\nBOUNDS\n UP BND Y -1\nENDATA\n",
        );
        assert_eq!(m.obj_sense, 1.0);
        assert_eq!(m.columns[0], Column::continuous(0.0, f64::INFINITY));
        assert_eq!(m.columns[1].lower, f64::NEG_INFINITY);
        assert_eq!(m.headers[0], RowHeader::le(4.0));

        let matrix = m.matrix().unwrap();
        assert_eq!(matrix.nnz(), 2);
    }

    #[test]
    fn test_bounds_without_set_name() {
        let m = parse(
            "NAME T\nROWS\n N OBJ\n L C1\nCOLUMNS\n    X C1 1\n    Y C1 1\n    Z C1 1\nRHS\n    C1 4\nBOUNDS\n UP X 3\n FR Y\n BV Z\nENDATA\n",
        );
        assert_eq!(m.columns[0], Column::continuous(0.0, 3.0));
        assert_eq!(m.columns[1], Column::continuous(f64::NEG_INFINITY, f64::INFINITY));
        assert_eq!(m.columns[2], Column::binary());

        assert!(parse_mps(Cursor::new(
            "NAME T\nROWS\n N OBJ\n L C1\nCOLUMNS\n    X C1 1\nBOUNDS\n UP X\nENDATA\n"
        ))
        .is_err());
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse_mps(Cursor::new("NAME T\nROWS\n N OBJ\nENDATA\n")).is_err());
        assert!(parse_mps(Cursor::new("NAME T\nROWS\n X C1\nENDATA\n")).is_err());
        assert!(parse_mps(Cursor::new(
            "NAME T\nROWS\n N OBJ\nCOLUMNS\n    X NOPE 1\nENDATA\n"
        ))
        .is_err());
        assert!(parse_mps(Cursor::new(
            "NAME T\nROWS\n N OBJ\nCOLUMNS\n    X OBJ abc\nENDATA\n"
        ))
        .is_err());
    }
}
