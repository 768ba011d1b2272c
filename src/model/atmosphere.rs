//! Time-indexed atmospheric forcing with the lower-boundary head series

use {
    crate::{
        error::{Error, Result},
        table::Table,
    },
    log::warn,
    ndarray::ArrayView1,
};

/// Forcing columns understood by the solver, with the value used when a column is absent
pub const COLUMNS: [(&str, f64); 8] = [
    ("tAtm", 0.0),
    ("Prec", 0.0),
    ("rSoil", 0.0),
    ("rRoot", 0.0),
    ("hCritA", 1.0e5),
    ("rB", 0.0),
    ("hB", 0.0),
    ("ht", 0.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Atmosphere {
    table: Table,
}

impl Atmosphere {
    /// Builds the forcing from a table whose first column is the time index
    ///
    /// Remaining columns are matched to the solver columns by name; unknown columns are ignored
    /// and missing ones take their default.
    pub fn from_forcing(forcing: &Table) -> Result<Self> {
        if forcing.ncols() == 0 || forcing.nrows() == 0 {
            return Err(Error::config("atmospheric forcing table is empty"));
        }
        forcing.ensure_finite("atmospheric forcing")?;

        let times = forcing.column_at(0).to_vec();
        if !times.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::config(
                "atmospheric forcing time index is not strictly increasing",
            ));
        }

        for name in forcing.columns().iter().skip(1) {
            if !COLUMNS.iter().skip(1).any(|(c, _)| *c == name.as_str()) {
                warn!("Ignoring unknown atmospheric column \"{}\"", name);
            }
        }

        let columns = COLUMNS
            .iter()
            .enumerate()
            .map(|(j, (name, default))| {
                let values = if j == 0 {
                    times.clone()
                } else {
                    forcing
                        .columns()
                        .iter()
                        .skip(1)
                        .position(|c| c.as_str() == *name)
                        .map(|k| forcing.column_at(k + 1).to_vec())
                        .unwrap_or_else(|| vec![*default; forcing.nrows()])
                };
                (name.to_string(), values)
            })
            .collect();

        Ok(Atmosphere {
            table: Table::from_columns(columns)?,
        })
    }

    /// Replaces the `hB` column with an observed head series sharing the same time index
    pub fn with_bottom_head(self, series: &Table) -> Result<Self> {
        if series.ncols() != 2 {
            return Err(Error::config(format!(
                "bottom head series needs a time index and one value column, found {} columns",
                series.ncols()
            )));
        }
        series.ensure_finite("bottom head series")?;

        let index = series.column_at(0);
        if index != self.times() {
            return Err(Error::config(format!(
                "bottom head series index ({} rows) does not match the atmospheric time index ({} rows)",
                index.len(),
                self.len()
            )));
        }

        self.with_column("hB", series.column_at(1))
    }

    fn with_column(self, name: &str, values: ArrayView1<f64>) -> Result<Self> {
        let columns = self
            .table
            .columns()
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let column = if c == name {
                    values.to_vec()
                } else {
                    self.table.column_at(j).to_vec()
                };
                (c.clone(), column)
            })
            .collect();

        Ok(Atmosphere {
            table: Table::from_columns(columns)?,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn times(&self) -> ArrayView1<f64> {
        self.table.column_at(0)
    }

    pub fn len(&self) -> usize {
        self.table.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.nrows() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn forcing() -> Table {
        Table::from_columns(vec![
            ("tAtm".into(), vec![1.0, 2.0, 3.0]),
            ("Prec".into(), vec![0.5, 0.0, 1.2]),
            ("rRoot".into(), vec![0.3, 0.31, 0.29]),
        ])
        .unwrap()
    }

    #[test]
    fn fills_missing_columns() {
        let atm = Atmosphere::from_forcing(&forcing()).unwrap();

        assert_eq!(
            atm.table().columns(),
            &["tAtm", "Prec", "rSoil", "rRoot", "hCritA", "rB", "hB", "ht"]
        );
        assert_eq!(atm.table().column("rRoot").unwrap().to_vec(), vec![0.3, 0.31, 0.29]);
        assert_eq!(atm.table().column("hCritA").unwrap().to_vec(), vec![1.0e5; 3]);
        assert_eq!(atm.times().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn aligned_bottom_head() {
        let gwl = Table::from_columns(vec![
            ("tAtm".into(), vec![1.0, 2.0, 3.0]),
            ("hB".into(), vec![-300.0, -301.0, -302.0]),
        ])
        .unwrap();

        let atm = Atmosphere::from_forcing(&forcing())
            .unwrap()
            .with_bottom_head(&gwl)
            .unwrap();

        assert_eq!(
            atm.table().column("hB").unwrap().to_vec(),
            vec![-300.0, -301.0, -302.0]
        );
        assert_eq!(atm.table().column("Prec").unwrap().to_vec(), vec![0.5, 0.0, 1.2]);
    }

    #[test]
    fn misaligned_bottom_head() {
        let atm = Atmosphere::from_forcing(&forcing()).unwrap();

        let shifted = Table::from_columns(vec![
            ("t".into(), vec![0.0, 1.0, 2.0]),
            ("hB".into(), vec![-300.0, -301.0, -302.0]),
        ])
        .unwrap();
        assert!(matches!(
            atm.clone().with_bottom_head(&shifted),
            Err(Error::Config(_))
        ));

        let short = Table::from_columns(vec![
            ("t".into(), vec![1.0, 2.0]),
            ("hB".into(), vec![-300.0, -301.0]),
        ])
        .unwrap();
        assert!(matches!(atm.with_bottom_head(&short), Err(Error::Config(_))));
    }

    #[test]
    fn unordered_time_index() {
        let table = Table::from_columns(vec![("tAtm".into(), vec![2.0, 1.0])]).unwrap();
        assert!(Atmosphere::from_forcing(&table).is_err());
    }
}
