use {
    crate::{
        error::{Error, Result},
        model::ObservationNode,
        results::ObservationSeries,
        table::Table,
    },
    log::{debug, info},
    plotters::prelude::*,
    std::{error::Error as StdError, ops::Range, path::Path},
};

const PANEL_SIZE: (u32, u32) = (400, 300);

/// One subplot: an observation node paired with a measured column
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub depth: f64,
    pub node: usize,
    pub column: String,
}

/// Pairs the i-th observation node with the i-th measured column
pub fn pair_panels(observations: &[ObservationNode], columns: &[String]) -> Result<Vec<Panel>> {
    if observations.len() != columns.len() {
        return Err(Error::config(format!(
            "{} observation nodes for {} measured columns",
            observations.len(),
            columns.len()
        )));
    }

    Ok(observations
        .iter()
        .zip(columns)
        .map(|(o, column)| Panel {
            depth: o.depth,
            node: o.node,
            column: column.clone(),
        })
        .collect())
}

/// Measured `(time, value)` pairs with gaps dropped
fn measured_points(measured: &Table, time_column: &str, column: &str) -> Result<Vec<(f64, f64)>> {
    let missing = |name: &str| Error::config(format!("measured table has no \"{}\" column", name));
    let t = measured.column(time_column).ok_or_else(|| missing(time_column))?;
    let y = measured.column(column).ok_or_else(|| missing(column))?;

    Ok(t.iter()
        .zip(y.iter())
        .filter(|(t, y)| t.is_finite() && y.is_finite())
        .map(|(t, y)| (*t, *y))
        .collect())
}

/// Simulated `(time, theta)` line of one observation node
fn simulated_line(series: &ObservationSeries) -> Result<Vec<(f64, f64)>> {
    let missing = |name: &str| {
        Error::config(format!(
            "observation node {} has no \"{}\" column",
            series.node, name
        ))
    };
    let t = series.table.column("time").ok_or_else(|| missing("time"))?;
    let theta = series.table.column("theta").ok_or_else(|| missing("theta"))?;

    Ok(t.iter().copied().zip(theta.iter().copied()).collect())
}

/// Axis range covering every point, padded so markers on the edge stay visible
fn bounds<'a, I: Iterator<Item = &'a f64>>(values: I) -> Range<f64> {
    let (lo, hi) = values
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(*x), hi.max(*x))
        });

    if lo > hi {
        return 0.0..1.0;
    }

    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    lo - pad..hi + pad
}

/// Renders simulated against measured water content, one subplot per panel
///
/// Subplots share their axis ranges and are laid out `columns_per_row` to a row. Measured values
/// are red markers, simulated values a black line.
pub fn plot_comparison(
    path: &Path,
    panels: &[Panel],
    series: &[ObservationSeries],
    measured: &Table,
    time_column: &str,
    columns_per_row: usize,
) -> Result<()> {
    let mut data = vec![];
    for panel in panels {
        let simulated = series
            .iter()
            .find(|s| s.node == panel.node)
            .ok_or_else(|| {
                Error::config(format!("no simulated series for node {}", panel.node))
            })?;
        data.push((
            measured_points(measured, time_column, &panel.column)?,
            simulated_line(simulated)?,
        ));
    }

    let all = || data.iter().flat_map(|(m, s)| m.iter().chain(s.iter()));
    let x_range = bounds(all().map(|(x, _)| x));
    let y_range = bounds(all().map(|(_, y)| y));

    let columns_per_row = columns_per_row.max(1);
    let rows = (panels.len() + columns_per_row - 1) / columns_per_row;

    draw_comparison(
        path,
        (rows.max(1), columns_per_row),
        panels,
        &data,
        x_range,
        y_range,
    )
    .map_err(|e| Error::Plot {
        path: path.to_owned(),
        message: e.to_string(),
    })?;

    info!(
        "Wrote water content comparison of {} depths to \"{}\"",
        panels.len(),
        path.display()
    );

    Ok(())
}

fn draw_comparison(
    path: &Path,
    (rows, cols): (usize, usize),
    panels: &[Panel],
    data: &[(Vec<(f64, f64)>, Vec<(f64, f64)>)],
    x_range: Range<f64>,
    y_range: Range<f64>,
) -> std::result::Result<(), Box<dyn StdError>> {
    let root = SVGBackend::new(
        path,
        (PANEL_SIZE.0 * cols as u32, PANEL_SIZE.1 * rows as u32),
    )
    .into_drawing_area();
    root.fill(&WHITE)?;

    for ((area, panel), (measured, simulated)) in root
        .split_evenly((rows, cols))
        .iter()
        .zip(panels)
        .zip(data)
    {
        debug!(
            "Plotting node {} against \"{}\": {} measured, {} simulated",
            panel.node,
            panel.column,
            measured.len(),
            simulated.len()
        );

        let mut chart = ChartBuilder::on(area)
            .caption(format!("{} depth", panel.column), ("sans-serif", 16))
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(45)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Time [days]")
            .y_desc("theta [-]")
            .draw()?;

        chart.draw_series(
            measured
                .iter()
                .map(|&point| Circle::new(point, 2, RED.filled())),
        )?;
        chart.draw_series(LineSeries::new(simulated.iter().copied(), &BLACK))?;
    }

    root.present()?;

    Ok(())
}

/// Renders every column of `table` against its first column, one stacked subplot per column
pub fn plot_time_series(path: &Path, table: &Table) -> Result<()> {
    draw_time_series(path, table).map_err(|e| Error::Plot {
        path: path.to_owned(),
        message: e.to_string(),
    })?;

    info!(
        "Wrote {} time series to \"{}\"",
        table.ncols().saturating_sub(1),
        path.display()
    );

    Ok(())
}

fn draw_time_series(path: &Path, table: &Table) -> std::result::Result<(), Box<dyn StdError>> {
    if table.ncols() < 2 {
        return Err(format!("{} columns leave nothing to plot", table.ncols()).into());
    }

    let time = table.column_at(0);
    let x_range = bounds(time.iter());
    let n = table.ncols() - 1;

    let root = SVGBackend::new(path, (2 * PANEL_SIZE.0, PANEL_SIZE.1 / 2 * n as u32))
        .into_drawing_area();
    root.fill(&WHITE)?;

    for (j, area) in (1..table.ncols()).zip(root.split_evenly((n, 1)).iter()) {
        let values = table.column_at(j);

        let mut chart = ChartBuilder::on(area)
            .margin(4)
            .x_label_area_size(20)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), bounds(values.iter()))?;

        chart
            .configure_mesh()
            .disable_mesh()
            .y_desc(table.columns()[j].as_str())
            .draw()?;

        chart.draw_series(LineSeries::new(
            time.iter()
                .zip(values.iter())
                .filter(|(t, y)| t.is_finite() && y.is_finite())
                .map(|(t, y)| (*t, *y)),
            &BLUE,
        ))?;
    }

    root.present()?;

    Ok(())
}

#[cfg(test)]
mod test {
    use {super::*, std::fs, tempdir::TempDir};

    fn nodes() -> Vec<ObservationNode> {
        vec![
            ObservationNode {
                depth: -10.0,
                node: 11,
            },
            ObservationNode {
                depth: -30.0,
                node: 31,
            },
            ObservationNode {
                depth: -50.0,
                node: 51,
            },
        ]
    }

    fn series(node: usize, theta: f64) -> ObservationSeries {
        ObservationSeries {
            node,
            table: Table::from_columns(vec![
                ("time".into(), vec![1.0, 2.0, 3.0]),
                ("h".into(), vec![-60.0; 3]),
                ("theta".into(), vec![theta; 3]),
            ])
            .unwrap(),
        }
    }

    #[test]
    fn positional_pairing() {
        let columns = vec!["10 cm".to_owned(), "30 cm".into(), "50 cm".into()];
        let panels = pair_panels(&nodes(), &columns).unwrap();

        assert_eq!(
            panels.iter().map(|p| (p.node, p.column.as_str())).collect::<Vec<_>>(),
            vec![(11, "10 cm"), (31, "30 cm"), (51, "50 cm")]
        );

        let arbitrary = vec!["c".to_owned(), "a".into(), "b".into()];
        let panels = pair_panels(&nodes(), &arbitrary).unwrap();
        assert_eq!(
            panels.iter().map(|p| (p.depth, p.column.as_str())).collect::<Vec<_>>(),
            vec![(-10.0, "c"), (-30.0, "a"), (-50.0, "b")]
        );
    }

    #[test]
    fn pairing_needs_equal_lengths() {
        assert!(matches!(
            pair_panels(&nodes(), &["10 cm".to_owned()]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn measured_gaps_are_skipped() {
        let measured = Table::from_columns(vec![
            ("tAtm".into(), vec![1.0, 2.0, 3.0]),
            ("10 cm".into(), vec![0.2, f64::NAN, 0.25]),
        ])
        .unwrap();

        assert_eq!(
            measured_points(&measured, "tAtm", "10 cm").unwrap(),
            vec![(1.0, 0.2), (3.0, 0.25)]
        );
        assert!(measured_points(&measured, "tAtm", "30 cm").is_err());
    }

    #[test]
    fn shared_bounds() {
        let r = bounds([0.1, 0.3, f64::NAN].iter());
        assert!(r.start < 0.1 && r.end > 0.3);
        assert_eq!(bounds(std::iter::empty()), 0.0..1.0);
    }

    #[test]
    fn renders_svg() {
        let tempdir = TempDir::new("soil-column").unwrap();
        let path = tempdir.path().join("theta_comparison.svg");

        let columns = vec!["10 cm".to_owned(), "30 cm".into(), "50 cm".into()];
        let measured = Table::from_columns(vec![
            ("tAtm".into(), vec![1.0, 2.0]),
            ("10 cm".into(), vec![0.2, 0.21]),
            ("30 cm".into(), vec![0.22, f64::NAN]),
            ("50 cm".into(), vec![0.24, 0.25]),
        ])
        .unwrap();

        plot_comparison(
            &path,
            &pair_panels(&nodes(), &columns).unwrap(),
            &[series(11, 0.2), series(31, 0.22), series(51, 0.24)],
            &measured,
            "tAtm",
            3,
        )
        .unwrap();

        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("30 cm depth"));
    }
}
