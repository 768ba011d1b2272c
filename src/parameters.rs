use {
    crate::{
        error::{Error, Result},
        model::{material::Material, uptake::RootUptake},
        report::summary::Window,
    },
    serde::Deserialize,
    std::{ops::Range, path::PathBuf},
};

/// Run parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Parameters {
    pub environment: Environment,
    pub model: ModelInfo,
    /// Soil materials, material ID `i` is the `i`-th entry counting from 1
    pub materials: Vec<Material>,
    pub profile: ProfileLayout,
    /// Depths at which the solver reports state time series, in registration order
    pub observation_depths: Vec<f64>,
    pub root_uptake: RootUptake,
    pub measurements: Measurements,
    pub comparison: Comparison,
    pub report: Report,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            environment: Environment::default(),
            model: ModelInfo::default(),
            materials: vec![
                Material::new(0.0364, 0.3766, 0.01396, 1.562, 145.8, 0.05),
                Material::new(0.045, 0.3635, 0.010299, 1.334, 160.3, 0.05),
                Material::new(0.0513, 0.4051, 0.004948, 1.308, 37.638, 0.05),
                Material::new(0.0449, 0.3477, 0.00894, 1.521, 67.44, 0.05),
            ],
            profile: ProfileLayout::default(),
            observation_depths: vec![
                -10.0, -30.0, -50.0, -90.0, -150.0, -250.0, -350.0, -450.0, -550.0,
            ],
            root_uptake: RootUptake::default(),
            measurements: Measurements::default(),
            comparison: Comparison::default(),
            report: Report::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Environment {
    /// Path to the solver executable
    pub solver: PathBuf,
    /// Directory holding solver input and output files
    pub workspace: PathBuf,
    /// Directory receiving reshaped tables, plots and the summary
    pub output_directory: PathBuf,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            solver: PathBuf::from("Hydrus1D/hydrus"),
            workspace: PathBuf::from("2022&2023"),
            output_directory: PathBuf::from("output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub description: String,
    pub units: Units,
    pub time: TimeInfo,
    pub water_flow: WaterFlow,
}

impl Default for ModelInfo {
    fn default() -> Self {
        ModelInfo {
            name: "model".into(),
            description: "Root uptake with meteorological data".into(),
            units: Units::default(),
            time: TimeInfo::default(),
            water_flow: WaterFlow::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Units {
    pub mass: String,
    pub time: String,
    pub length: String,
}

impl Default for Units {
    fn default() -> Self {
        Units {
            mass: "mmol".into(),
            time: "days".into(),
            length: "cm".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeInfo {
    /// Start of the simulation
    pub initial: f64,
    /// End of the simulation
    pub maximum: f64,
    /// Whether to request intermediate profile snapshots
    pub print_times: bool,
    /// Spacing of intermediate snapshots
    pub print_interval: f64,
}

impl Default for TimeInfo {
    fn default() -> Self {
        TimeInfo {
            initial: 0.0,
            maximum: 730.0,
            print_times: true,
            print_interval: 10.0,
        }
    }
}

impl TimeInfo {
    /// Snapshot times, always ending at `maximum`
    pub fn print_times(&self) -> Vec<f64> {
        if !self.print_times {
            return vec![self.maximum];
        }

        let mut times = (1..)
            .map(|i| self.initial + i as f64 * self.print_interval)
            .take_while(|t| *t < self.maximum - 1e-9 * self.print_interval)
            .collect::<Vec<_>>();
        times.push(self.maximum);
        times
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaterFlow {
    /// Top boundary condition code: 0 constant head, 1 constant flux, 2 atmospheric with
    /// surface layer, 3 atmospheric with surface runoff, 4 variable head, 5 variable head/flux
    pub top_boundary: u8,
    /// Bottom boundary condition code: 0 constant head, 1 constant flux, 2 variable head,
    /// 3 variable flux, 4 free drainage, 6 seepage face
    pub bottom_boundary: u8,
    /// Initial condition given as water content instead of the nodal heads of the profile
    pub initial_water_content: bool,
    /// Prescribed potential transpiration rate for constant boundaries
    pub root_flux: f64,
}

impl Default for WaterFlow {
    fn default() -> Self {
        WaterFlow {
            top_boundary: 3,
            bottom_boundary: 2,
            initial_water_content: false,
            root_flux: 0.0,
        }
    }
}

/// Layered discretisation of the soil column
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileLayout {
    /// Elevation of the land surface
    pub top: f64,
    /// Lower boundary of each layer, decreasing downwards
    pub bottoms: Vec<f64>,
    /// Node spacing
    pub spacing: f64,
    /// Uniform default pressure head before measured heads are applied
    pub initial_head: f64,
    /// Material ID of each layer
    pub materials: Vec<usize>,
}

impl Default for ProfileLayout {
    fn default() -> Self {
        ProfileLayout {
            top: 0.0,
            bottoms: vec![-140.0, -200.0, -440.0, -600.0],
            spacing: 1.0,
            initial_head: -60.0,
            materials: vec![1, 2, 3, 4],
        }
    }
}

/// Externally supplied measurement files
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Measurements {
    /// Initial pressure head per node, no header
    pub initial_head: PathBuf,
    /// Atmospheric forcing, first column is the time index
    pub atmosphere: PathBuf,
    /// Observed groundwater head, first column is the time index
    pub bottom_head: PathBuf,
    /// Root-stress coefficient per node, one header row
    pub beta: PathBuf,
    /// Measured volumetric water content by depth
    pub water_content: PathBuf,
}

impl Default for Measurements {
    fn default() -> Self {
        Measurements {
            initial_head: PathBuf::from("data/h.csv"),
            atmosphere: PathBuf::from("data/2022&2023.csv"),
            bottom_head: PathBuf::from("data/gwl.csv"),
            beta: PathBuf::from("data/beta.csv"),
            water_content: PathBuf::from("data/swc.csv"),
        }
    }
}

impl Measurements {
    fn paths(&self) -> [(&'static str, &PathBuf); 5] {
        [
            ("initial head", &self.initial_head),
            ("atmosphere", &self.atmosphere),
            ("bottom head", &self.bottom_head),
            ("beta", &self.beta),
            ("water content", &self.water_content),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comparison {
    /// Time column of the measured water content table
    pub time_column: String,
    /// Measured column paired with each observation depth, in the same order
    pub columns: Vec<String>,
    /// Number of subplots per row
    pub columns_per_row: usize,
}

impl Default for Comparison {
    fn default() -> Self {
        Comparison {
            time_column: "tAtm".into(),
            columns: [10, 30, 50, 90, 150, 250, 350, 450, 550]
                .iter()
                .map(|d| format!("{} cm", d))
                .collect(),
            columns_per_row: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Report {
    /// Positions of the profile snapshot columns reshaped into wide tables
    pub variable_columns: Range<usize>,
    /// Reshaped variable summed over the row windows
    pub sink_variable: String,
    pub windows: Vec<Window>,
    /// File name of the windowed summary inside the output directory
    pub summary_file: String,
}

impl Default for Report {
    fn default() -> Self {
        Report {
            variable_columns: 2..8,
            sink_variable: "Sink".into(),
            windows: vec![
                Window::new("sum", 0, 600),
                Window::new("0-100", 0, 100),
                Window::new("100-600", 101, 600),
                Window::new("0-60", 0, 60),
                Window::new("60-200", 60, 200),
            ],
            summary_file: "sum_sink.csv".into(),
        }
    }
}

impl Parameters {
    /// Checks everything that can be checked before any file is read or written
    pub fn validate(&self) -> Result<()> {
        for (what, path) in self.measurements.paths().iter() {
            if !path.is_file() {
                return Err(Error::config(format!(
                    "{} file {} does not exist",
                    what,
                    path.display()
                )));
            }
        }

        if !self.environment.solver.is_file() {
            return Err(Error::config(format!(
                "solver executable {} does not exist",
                self.environment.solver.display()
            )));
        }

        if self.comparison.columns.len() != self.observation_depths.len() {
            return Err(Error::config(format!(
                "{} comparison columns for {} observation depths",
                self.comparison.columns.len(),
                self.observation_depths.len()
            )));
        }

        if self.comparison.columns_per_row == 0 {
            return Err(Error::config("comparison needs at least one subplot per row"));
        }

        if self.report.variable_columns.start < 2
            || self.report.variable_columns.end <= self.report.variable_columns.start
        {
            return Err(Error::config(format!(
                "variable columns {:?} must be a non-empty range after the node and depth columns",
                self.report.variable_columns
            )));
        }

        for window in &self.report.windows {
            if window.end <= window.start {
                return Err(Error::config(format!(
                    "report window \"{}\" is empty",
                    window.label
                )));
            }
        }

        let time = &self.model.time;
        if time.maximum <= time.initial || (time.print_times && time.print_interval <= 0.0) {
            return Err(Error::config(format!(
                "invalid time horizon {}..{} with print interval {}",
                time.initial, time.maximum, time.print_interval
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use {super::*, std::fs::File, tempdir::TempDir};

    #[test]
    fn defaults() {
        assert_eq!(
            Parameters::default(),
            serde_yaml::from_reader::<_, Parameters>(
                File::open("src/testdata/defaults.yaml").unwrap()
            )
            .unwrap()
        );
    }

    #[test]
    fn print_times() {
        let time = TimeInfo::default();
        let times = time.print_times();
        assert_eq!(times.len(), 73);
        assert_eq!(times[0], 10.0);
        assert_eq!(times[8], 90.0);
        assert_eq!(*times.last().unwrap(), 730.0);

        let time = TimeInfo {
            maximum: 25.0,
            ..TimeInfo::default()
        };
        assert_eq!(time.print_times(), vec![10.0, 20.0, 25.0]);

        let time = TimeInfo {
            print_times: false,
            ..TimeInfo::default()
        };
        assert_eq!(time.print_times(), vec![730.0]);
    }

    fn with_files(tempdir: &TempDir) -> Parameters {
        let mut params = Parameters::default();
        let dir = tempdir.path();
        for name in &["h.csv", "atm.csv", "gwl.csv", "beta.csv", "swc.csv", "hydrus"] {
            File::create(dir.join(name)).unwrap();
        }
        params.measurements = Measurements {
            initial_head: dir.join("h.csv"),
            atmosphere: dir.join("atm.csv"),
            bottom_head: dir.join("gwl.csv"),
            beta: dir.join("beta.csv"),
            water_content: dir.join("swc.csv"),
        };
        params.environment.solver = dir.join("hydrus");
        params
    }

    #[test]
    fn validates_existing_files() {
        let tempdir = TempDir::new("soil-column").unwrap();
        with_files(&tempdir).validate().unwrap();
    }

    #[test]
    fn missing_bottom_head_file() {
        let tempdir = TempDir::new("soil-column").unwrap();
        let mut params = with_files(&tempdir);
        params.measurements.bottom_head = tempdir.path().join("absent.csv");

        match params.validate() {
            Err(Error::Config(message)) => assert!(message.contains("bottom head")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn comparison_columns_must_match_depths() {
        let tempdir = TempDir::new("soil-column").unwrap();
        let mut params = with_files(&tempdir);
        params.comparison.columns.pop();

        assert!(params.validate().is_err());
    }

    #[test]
    fn empty_window() {
        let tempdir = TempDir::new("soil-column").unwrap();
        let mut params = with_files(&tempdir);
        params.report.windows.push(Window::new("none", 10, 10));

        assert!(params.validate().is_err());
    }

    #[test]
    fn structural_columns_are_not_variables() {
        let tempdir = TempDir::new("soil-column").unwrap();
        let mut params = with_files(&tempdir);
        params.report.variable_columns = 1..8;

        assert!(params.validate().is_err());
    }
}
