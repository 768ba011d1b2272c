//! Stage orchestration
//!
//! Each function runs one stage against a validated [`Parameters`]; [`run`] chains all of them
//! and stops at the first failure.

use {
    crate::{
        error::{Error, Result},
        model::{atmosphere::Atmosphere, profile::Profile, Assembly, Model},
        parameters::Parameters,
        report::{compare, reshape, summary},
        results::{self, ObservationSeries, Snapshot},
        solver,
        table::Table,
        utils::create_dir_all,
    },
    log::{debug, info},
    std::path::{Path, PathBuf},
};

pub const T_LEVEL_CSV: &str = "t_level.csv";
pub const T_LEVEL_SVG: &str = "t_level.svg";
pub const COMPARISON_SVG: &str = "theta_comparison.svg";

/// Tables read back from the solver output
#[derive(Debug, Clone, PartialEq)]
pub struct Results {
    pub tlevel: Table,
    /// One series per observation node, in registration order
    pub observations: Vec<ObservationSeries>,
    /// Profile snapshots in print-time order
    pub profiles: Vec<Snapshot>,
}

fn read_measurement(path: &Path, has_headers: bool) -> Result<Table> {
    let table = Table::read_csv(path, has_headers)?;
    if table.ncols() == 0 || table.nrows() == 0 {
        return Err(Error::config(format!(
            "measurement file {} is empty",
            path.display()
        )));
    }
    debug!(
        "Read {}x{} measurement table from {}",
        table.nrows(),
        table.ncols(),
        path.display()
    );
    Ok(table)
}

/// Builds the model from the structural parameters and patches in the measured overrides
pub fn assemble(params: &Parameters) -> Result<Model> {
    params.validate()?;

    info!("Assembling model \"{}\"", params.model.name);

    let measurements = &params.measurements;
    let heads = read_measurement(&measurements.initial_head, false)?;
    let forcing = read_measurement(&measurements.atmosphere, true)?;
    let bottom_head = read_measurement(&measurements.bottom_head, true)?;
    let beta = read_measurement(&measurements.beta, true)?;

    let model = Assembly::new(params.model.clone())
        .with_materials(params.materials.clone())?
        .with_profile(Profile::create(&params.profile)?)?
        .with_atmosphere(Atmosphere::from_forcing(&forcing)?)?
        .with_bottom_head(&bottom_head)?
        .with_observation_depths(&params.observation_depths)?
        .with_root_uptake(params.root_uptake.clone())?
        .with_initial_heads(&heads.column_at(0).to_vec())?
        .with_beta(&beta.column_at(0).to_vec())?
        .finish()?;

    info!(
        "Assembled {} nodes, {} materials, {} atmospheric records, observation nodes {:?}",
        model.profile.len(),
        model.materials.len(),
        model.atmosphere.as_ref().map(Atmosphere::len).unwrap_or(0),
        model.observation_indices()
    );

    Ok(model)
}

pub fn write_input(model: &Model, params: &Parameters) -> Result<Vec<PathBuf>> {
    solver::write_input(model, &params.environment.workspace)
}

pub fn simulate(params: &Parameters) -> Result<()> {
    solver::simulate(&params.environment.solver, &params.environment.workspace)
}

/// Reads the three solver outputs and persists the time-level summary
pub fn extract(model: &Model, params: &Parameters) -> Result<Results> {
    let workspace = &params.environment.workspace;

    info!("Extracting results from \"{}\"", workspace.display());

    let results = Results {
        tlevel: results::read_tlevel(workspace)?,
        observations: results::read_obs_nodes(workspace, &model.observation_indices())?,
        profiles: results::read_nod_inf(workspace)?,
    };

    create_dir_all(&params.environment.output_directory)?;
    let path = params.environment.output_directory.join(T_LEVEL_CSV);
    results.tlevel.write_csv(&path)?;
    debug!("Wrote {}", path.display());

    info!(
        "Extracted {} time levels, {} observation nodes, {} profile snapshots",
        results.tlevel.nrows(),
        results.observations.len(),
        results.profiles.len()
    );

    Ok(results)
}

/// Renders the plots, writes the wide profile tables and the windowed sink summary
///
/// Measured data and the reshaped tables are checked before anything is written, and the
/// summary only ever reads the sink table written by this call.
pub fn report(model: &Model, results: &Results, params: &Parameters) -> Result<PathBuf> {
    let output = &params.environment.output_directory;

    let measured = read_measurement(&params.measurements.water_content, true)?;
    let panels = compare::pair_panels(&model.observation_nodes, &params.comparison.columns)?;
    if let Some(missing) = std::iter::once(&params.comparison.time_column)
        .chain(panels.iter().map(|p| &p.column))
        .find(|name| measured.position(name).is_none())
    {
        return Err(Error::config(format!(
            "measured water content {} has no \"{}\" column",
            params.measurements.water_content.display(),
            missing
        )));
    }

    let wide = reshape::reshape_profiles(&results.profiles, params.report.variable_columns.clone())?;
    if !wide.iter().any(|(variable, _)| *variable == params.report.sink_variable) {
        return Err(Error::config(format!(
            "sink variable \"{}\" is not among the reshaped variables {:?}",
            params.report.sink_variable,
            wide.iter().map(|(variable, _)| variable).collect::<Vec<_>>()
        )));
    }

    create_dir_all(output)?;

    info!("Reporting to \"{}\"", output.display());

    compare::plot_time_series(&output.join(T_LEVEL_SVG), &results.tlevel)?;
    compare::plot_comparison(
        &output.join(COMPARISON_SVG),
        &panels,
        &results.observations,
        &measured,
        &params.comparison.time_column,
        params.comparison.columns_per_row,
    )?;

    reshape::write_wide_tables(output, &wide)?;

    summary::summarize_sink(
        output,
        &params.report.sink_variable,
        &params.report.windows,
        &params.report.summary_file,
    )
}

/// Runs every stage in order
pub fn run(params: &Parameters) -> Result<Results> {
    let model = assemble(params)?;
    write_input(&model, params)?;
    simulate(params)?;
    let results = extract(&model, params)?;
    let summary = report(&model, &results, params)?;

    info!("Run complete, summary in \"{}\"", summary.display());

    Ok(results)
}
