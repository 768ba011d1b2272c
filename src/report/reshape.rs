use {
    crate::{
        error::{Error, Result},
        results::Snapshot,
        table::{format_time, Table},
        utils::create_dir_all,
    },
    log::{debug, info},
    std::{
        ops::Range,
        path::{Path, PathBuf},
    },
};

/// Pivots profile snapshots into one wide table per variable
///
/// `columns` selects the variables by position in the snapshot tables. Each wide table keeps the
/// node rows of the snapshots and gains one `<variable>_<time>` column per snapshot, in snapshot
/// order.
pub fn reshape_profiles(snapshots: &[Snapshot], columns: Range<usize>) -> Result<Vec<(String, Table)>> {
    let first = snapshots
        .first()
        .ok_or_else(|| Error::config("no profile snapshots to reshape"))?;

    if columns.end > first.table.ncols() {
        return Err(Error::config(format!(
            "variable columns {:?} exceed the {} snapshot columns",
            columns,
            first.table.ncols()
        )));
    }

    columns
        .map(|j| {
            let variable = first.table.columns()[j].clone();

            let wide = snapshots
                .iter()
                .map(|snapshot| {
                    let column = snapshot.table.column(&variable).ok_or_else(|| {
                        Error::config(format!(
                            "snapshot at time {} has no \"{}\" column",
                            snapshot.time, variable
                        ))
                    })?;
                    Ok((
                        format!("{}_{}", variable, format_time(snapshot.time)),
                        column.to_vec(),
                    ))
                })
                .collect::<Result<Vec<_>>>()?;

            Ok((variable, Table::from_columns(wide)?))
        })
        .collect()
}

/// Writes each wide table as `<variable>.csv`, creating `directory` if needed
pub fn write_wide_tables(directory: &Path, tables: &[(String, Table)]) -> Result<Vec<PathBuf>> {
    create_dir_all(directory)?;

    let paths = tables
        .iter()
        .map(|(variable, table)| {
            let path = directory.join(format!("{}.csv", variable));
            table.write_csv(&path)?;
            debug!("Wrote {}", path.display());
            Ok(path)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Wrote {} profile tables to \"{}\"",
        paths.len(),
        directory.display()
    );

    Ok(paths)
}

#[cfg(test)]
mod test {
    use {super::*, tempdir::TempDir};

    fn snapshot(time: f64, offset: f64) -> Snapshot {
        Snapshot {
            time,
            table: Table::from_columns(vec![
                ("Node".into(), vec![1.0, 2.0, 3.0]),
                ("Depth".into(), vec![0.0, -1.0, -2.0]),
                ("Head".into(), vec![-60.0 + offset, -61.0 + offset, -62.0 + offset]),
                ("Moisture".into(), vec![0.2, 0.21 + offset / 100.0, 0.22]),
                ("Sink".into(), vec![0.0, 1e-3 * offset, 2e-3]),
            ])
            .unwrap(),
        }
    }

    #[test]
    fn lossless_pivot() {
        let snapshots = vec![snapshot(0.0, 0.0), snapshot(90.0, 5.0), snapshot(92.5, 7.0)];
        let wide = reshape_profiles(&snapshots, 2..5).unwrap();

        assert_eq!(
            wide.iter().map(|(v, _)| v.as_str()).collect::<Vec<_>>(),
            vec!["Head", "Moisture", "Sink"]
        );

        let (_, head) = &wide[0];
        assert_eq!(head.columns(), &["Head_0.0", "Head_90.0", "Head_92.5"]);
        assert_eq!(head.nrows(), 3);

        for (variable, table) in &wide {
            for snapshot in &snapshots {
                assert_eq!(
                    table
                        .column(&format!("{}_{}", variable, format_time(snapshot.time)))
                        .unwrap(),
                    snapshot.table.column(variable).unwrap()
                );
            }
        }
    }

    #[test]
    fn range_past_columns() {
        assert!(matches!(
            reshape_profiles(&[snapshot(0.0, 0.0)], 2..8),
            Err(Error::Config(_))
        ));
        assert!(reshape_profiles(&[], 2..5).is_err());
    }

    #[test]
    fn writes_one_file_per_variable() {
        let tempdir = TempDir::new("soil-column").unwrap();
        let output = tempdir.path().join("output");

        let wide = reshape_profiles(&[snapshot(0.0, 0.0), snapshot(10.0, 1.0)], 2..5).unwrap();
        let paths = write_wide_tables(&output, &wide).unwrap();

        assert_eq!(paths.len(), 3);
        assert!(output.join("Sink.csv").is_file());
        assert_eq!(
            Table::read_csv(output.join("Head.csv"), true).unwrap(),
            wide[0].1
        );
    }
}
