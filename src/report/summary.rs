use {
    crate::{
        error::{Error, Result},
        table::Table,
    },
    log::{debug, info, warn},
    ndarray::Array2,
    serde::Deserialize,
    std::path::{Path, PathBuf},
};

/// Labelled half-open row range `[start, end)` summed in the report
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Window {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn new(label: &str, start: usize, end: usize) -> Self {
        Window {
            label: label.to_owned(),
            start,
            end,
        }
    }
}

/// Sums every column of `table` over each window
///
/// The result has one row per input column and one column per window, in window order.
/// Windows reaching past the last row are clamped.
pub fn windowed_sums(table: &Table, windows: &[Window]) -> Result<Table> {
    for pair in windows.windows(2) {
        if pair[1].start > pair[0].end {
            warn!(
                "Rows {}..{} fall between windows \"{}\" and \"{}\"",
                pair[0].end, pair[1].start, pair[0].label, pair[1].label
            );
        }
    }

    let mut data = Array2::<f64>::zeros((table.ncols(), windows.len()));

    for (j, window) in windows.iter().enumerate() {
        if window.end > table.nrows() {
            warn!(
                "Window \"{}\" ends at row {} but the table has {} rows",
                window.label,
                window.end,
                table.nrows()
            );
        }

        data.column_mut(j)
            .assign(&table.sum_rows(window.start, window.end));
    }

    Table::new(windows.iter().map(|w| w.label.clone()).collect(), data)
}

/// Reads `<variable>.csv` from `directory` and writes its windowed sums to `summary_file`
pub fn summarize_sink(
    directory: &Path,
    sink_variable: &str,
    windows: &[Window],
    summary_file: &str,
) -> Result<PathBuf> {
    let input = directory.join(format!("{}.csv", sink_variable));
    if !input.is_file() {
        return Err(Error::MissingOutput(input));
    }

    let sink = Table::read_csv(&input, true)?;
    debug!(
        "Summing {} columns of {} over {} windows",
        sink.ncols(),
        input.display(),
        windows.len()
    );

    let summary = windowed_sums(&sink, windows)?;

    let output = directory.join(summary_file);
    summary.write_csv(&output)?;
    info!("Wrote sink summary to \"{}\"", output.display());

    Ok(output)
}
