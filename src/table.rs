//! Column-labelled numeric tables shared by every stage
//!
//! Values are stored row-major in an `Array2<f64>` with one label per column.
//! Empty CSV cells are read as `NaN` so sparse field measurements survive the
//! round trip; inputs to the solver are checked with [`Table::ensure_finite`].

use {
    crate::error::{Error, Result},
    ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis},
    std::path::Path,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    data: Array2<f64>,
}

impl Table {
    pub fn new(columns: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if columns.len() != data.ncols() {
            return Err(Error::config(format!(
                "table has {} column labels for {} data columns",
                columns.len(),
                data.ncols()
            )));
        }

        Ok(Self { columns, data })
    }

    /// Builds a table from named columns of equal length
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let nrows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);

        if let Some((name, c)) = columns.iter().find(|(_, c)| c.len() != nrows) {
            return Err(Error::config(format!(
                "column \"{}\" has {} rows, expected {}",
                name,
                c.len(),
                nrows
            )));
        }

        let mut data = Array2::zeros((nrows, columns.len()));
        for (j, (_, c)) in columns.iter().enumerate() {
            data.column_mut(j).assign(&ArrayView1::from(c.as_slice()));
        }

        Table::new(columns.into_iter().map(|(name, _)| name).collect(), data)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<ArrayView1<f64>> {
        self.position(name).map(|j| self.data.column(j))
    }

    pub fn column_at(&self, j: usize) -> ArrayView1<f64> {
        self.data.column(j)
    }

    /// Column-wise sums over rows `start..end`, clamped to the table height
    ///
    /// Empty cells (`NaN`) count as zero.
    pub fn sum_rows(&self, start: usize, end: usize) -> Array1<f64> {
        let end = end.min(self.nrows());
        let start = start.min(end);
        self.data
            .slice(s![start..end, ..])
            .fold_axis(Axis(0), 0.0, |&sum, &x| if x.is_nan() { sum } else { sum + x })
    }

    /// Fails if any cell is NaN or infinite
    pub fn ensure_finite(&self, what: &str) -> Result<()> {
        for ((i, j), x) in self.data.indexed_iter() {
            if !x.is_finite() {
                return Err(Error::config(format!(
                    "{} has a non-numeric value in row {} column \"{}\"",
                    what, i, self.columns[j]
                )));
            }
        }
        Ok(())
    }

    /// Reads a fully numeric CSV file
    ///
    /// Without headers the columns are labelled by their position (`"0"`, `"1"`, ...).
    pub fn read_csv<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<Self> {
        let path = path.as_ref();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(has_headers)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| Error::csv(path, e))?;

        let mut columns = if has_headers {
            reader
                .headers()
                .map_err(|e| Error::csv(path, e))?
                .iter()
                .map(str::to_owned)
                .collect::<Vec<_>>()
        } else {
            vec![]
        };

        let mut values = vec![];
        let mut nrows = 0;
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::csv(path, e))?;

            if columns.is_empty() {
                columns = (0..record.len()).map(|j| j.to_string()).collect();
            }

            for field in record.iter() {
                values.push(parse_cell(field).ok_or_else(|| {
                    Error::malformed(
                        path,
                        row + 1 + has_headers as usize,
                        format!("\"{}\" is not a number", field),
                    )
                })?);
            }
            nrows += 1;
        }

        let data = Array2::from_shape_vec((nrows, columns.len()), values)
            .map_err(|e| Error::malformed(path, 0, e.to_string()))?;

        Table::new(columns, data)
    }

    /// Writes the table with a header row and no index column
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;

        writer
            .write_record(&self.columns)
            .map_err(|e| Error::csv(path, e))?;

        for row in self.data.outer_iter() {
            writer
                .write_record(row.iter().map(|x| format_cell(*x)))
                .map_err(|e| Error::csv(path, e))?;
        }

        writer.flush().map_err(|e| Error::io(path, e))
    }
}

fn parse_cell(field: &str) -> Option<f64> {
    if field.is_empty() || field.eq_ignore_ascii_case("nan") {
        Some(f64::NAN)
    } else {
        field.parse().ok()
    }
}

fn format_cell(x: f64) -> String {
    if x.is_nan() {
        String::new()
    } else {
        x.to_string()
    }
}

/// Formats a simulation time the way column suffixes have always been written (`90.0`, `12.5`)
pub fn format_time(t: f64) -> String {
    if t.fract() == 0.0 && t.abs() < 1e15 {
        format!("{:.1}", t)
    } else {
        t.to_string()
    }
}
