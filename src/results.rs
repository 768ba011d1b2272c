//! Result Extraction
//!
//! Parsers for the three solver output files. Each reader fails with
//! [`Error::MissingOutput`] when its file is absent and with [`Error::MalformedOutput`] when the
//! column layout does not match.

use {
    crate::{
        error::{Error, Result},
        table::Table,
        utils::read_lines,
    },
    log::debug,
    ndarray::Array2,
    std::path::Path,
};

pub const T_LEVEL_OUT: &str = "T_LEVEL.OUT";
pub const OBS_NODE_OUT: &str = "OBS_NODE.OUT";
pub const NOD_INF_OUT: &str = "NOD_INF.OUT";

pub const OUTPUT_FILES: [&str; 3] = [T_LEVEL_OUT, OBS_NODE_OUT, NOD_INF_OUT];

/// State time series at one observation node
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSeries {
    /// 1-based profile node index
    pub node: usize,
    /// `time` followed by the state variables (`h`, `theta`, ...)
    pub table: Table,
}

/// Nodal profile at one print time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub time: f64,
    /// `Node`, `Depth` and the nodal variables
    pub table: Table,
}

/// Reads the boundary flux summary, one row per time level, `Time` first
pub fn read_tlevel(workspace: &Path) -> Result<Table> {
    let path = workspace.join(T_LEVEL_OUT);
    let lines = read_lines(&path)?;

    let header = lines
        .iter()
        .position(|l| {
            let mut tokens = l.split_whitespace();
            tokens.next() == Some("Time") && tokens.any(|t| t == "rTop")
        })
        .ok_or_else(|| Error::malformed(&path, 0, "no \"Time rTop ...\" header"))?;

    let columns = tokens(&lines[header]);
    let table = parse_rows(&path, &lines, header + 1, columns)?;

    debug!("Read {} time levels from {}", table.nrows(), path.display());

    Ok(table)
}

/// Reads the observation node series, returned in the order of `nodes`
pub fn read_obs_nodes(workspace: &Path, nodes: &[usize]) -> Result<Vec<ObservationSeries>> {
    let path = workspace.join(OBS_NODE_OUT);
    let lines = read_lines(&path)?;

    if nodes.is_empty() {
        return Ok(vec![]);
    }

    let listed = lines
        .iter()
        .filter(|l| l.trim_start().starts_with("Node("))
        .flat_map(|l| node_labels(l))
        .collect::<Vec<_>>();
    if !listed.is_empty() && listed != nodes {
        return Err(Error::malformed(
            &path,
            0,
            format!(
                "output lists nodes {:?}, registered nodes are {:?}",
                listed, nodes
            ),
        ));
    }

    let header = lines
        .iter()
        .position(|l| l.split_whitespace().next() == Some("time"))
        .ok_or_else(|| Error::malformed(&path, 0, "no \"time\" header"))?;
    let columns = tokens(&lines[header]);

    let width = columns.len() - 1;
    if width == 0 || width % nodes.len() != 0 {
        return Err(Error::malformed(
            &path,
            header + 1,
            format!(
                "{} value columns cannot be split between {} nodes",
                width,
                nodes.len()
            ),
        ));
    }
    let group = width / nodes.len();

    let table = parse_rows(&path, &lines, header + 1, columns.clone())?;

    let series = nodes
        .iter()
        .enumerate()
        .map(|(k, &node)| {
            let mut selected = vec![("time".to_owned(), table.column_at(0).to_vec())];
            for j in 1 + k * group..1 + (k + 1) * group {
                selected.push((columns[j].clone(), table.column_at(j).to_vec()));
            }
            Ok(ObservationSeries {
                node,
                table: Table::from_columns(selected)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Read {} observation nodes with {} records from {}",
        series.len(),
        table.nrows(),
        path.display()
    );

    Ok(series)
}

/// Reads the nodal profile snapshots in print-time order
pub fn read_nod_inf(workspace: &Path) -> Result<Vec<Snapshot>> {
    let path = workspace.join(NOD_INF_OUT);
    let lines = read_lines(&path)?;

    let mut snapshots = vec![];
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if let Some(time) = line.strip_prefix("Time:") {
            let time = time
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::malformed(&path, i + 1, format!("bad time \"{}\"", time)))?;

            let header = lines[i + 1..]
                .iter()
                .position(|l| l.split_whitespace().next() == Some("Node"))
                .map(|p| i + 1 + p)
                .ok_or_else(|| {
                    Error::malformed(&path, i + 1, format!("no node header after time {}", time))
                })?;

            let columns = tokens(&lines[header]);
            let table = parse_rows(&path, &lines, header + 1, columns)?;
            i = header;

            snapshots.push(Snapshot { time, table });
        }

        i += 1;
    }

    if snapshots.is_empty() {
        return Err(Error::malformed(&path, 0, "no profile snapshots"));
    }

    if let Some(bad) = snapshots
        .iter()
        .find(|s| s.table.columns() != snapshots[0].table.columns())
    {
        return Err(Error::malformed(
            &path,
            0,
            format!("snapshot at time {} has a different column layout", bad.time),
        ));
    }

    debug!(
        "Read {} profile snapshots from {}",
        snapshots.len(),
        path.display()
    );

    Ok(snapshots)
}

fn tokens(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_owned).collect()
}

/// Node indices from a line such as `Node(   11)   Node(   31)`
fn node_labels(line: &str) -> Vec<usize> {
    line.split("Node(")
        .skip(1)
        .filter_map(|s| s.split(')').next())
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Parses whitespace-separated numeric rows following a header
///
/// A units line (`[T] [L/T] ...`) and blank lines directly after the header are skipped; rows
/// end at a line starting with `end` or at the end of the file.
fn parse_rows(path: &Path, lines: &[String], start: usize, columns: Vec<String>) -> Result<Table> {
    let mut i = start;
    while i < lines.len() && (lines[i].trim().is_empty() || lines[i].trim_start().starts_with('[')) {
        i += 1;
    }

    let mut values = vec![];
    let mut nrows = 0;

    for (offset, line) in lines[i..].iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("end") {
            break;
        }

        let row = trimmed
            .split_whitespace()
            .map(|t| t.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::malformed(path, i + offset + 1, e.to_string()))?;

        if row.len() != columns.len() {
            return Err(Error::malformed(
                path,
                i + offset + 1,
                format!("{} values for {} columns", row.len(), columns.len()),
            ));
        }

        values.extend(row);
        nrows += 1;
    }

    let data = Array2::from_shape_vec((nrows, columns.len()), values)
        .map_err(|e| Error::malformed(path, start, e.to_string()))?;

    Table::new(columns, data)
}
