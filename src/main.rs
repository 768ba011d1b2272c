#[macro_use]
extern crate clap;

use {
    anyhow::{bail, Result},
    log::{error, info},
    simplelog::{Config as LogConfig, LevelFilter, TermLogger, TerminalMode},
    soil_column::{parameters::Parameters, pipeline},
    std::fs::File,
};

#[quit::main]
fn main() {
    let matches = clap_app!(soil_column =>
        (version: crate_version!())
        (@arg PARAMETERS: -p --parameters +takes_value +required "Path to file containing run parameters.")
        (@subcommand assemble =>
            (about: "Assembles the soil column model and writes the solver input files to the workspace.")
        )
        (@subcommand simulate =>
            (about: "Assembles the model, writes the solver input files and runs the solver.")
        )
        (@subcommand extract =>
            (about: "Reads the solver output files from the workspace and writes the time-level summary.")
        )
        (@subcommand report =>
            (about: "Plots simulated against measured water content, reshapes the profile output and sums the root sink over the report windows.")
        )
        (@subcommand run =>
            (about: "Runs every stage from model assembly to the sink summary.")
        )
    )
    .get_matches();

    TermLogger::init(
        LevelFilter::Debug,
        LogConfig::default(),
        TerminalMode::Mixed,
    )
    .expect("Failed to initialize logger");

    let params = {
        // Should never panic as clap should return an error if the argument was not supplied
        let path = matches
            .value_of("PARAMETERS")
            .expect("Path to parameters file not supplied");

        let file = File::open(path).unwrap_or_else(|e| {
            error!("Failed to open {}: \"{}\"", path, e);
            quit::with_code(1);
        });

        let params = serde_yaml::from_reader::<_, Parameters>(file).unwrap_or_else(|e| {
            error!("Failed to parse parameters from {}: \"{}\"", path, e);
            quit::with_code(1);
        });

        info!(
            "Successfully loaded run parameters from \"{}\": \n{:#?}",
            path, params
        );

        params
    };

    run_subcommand(matches.subcommand_name(), params).unwrap_or_else(|e| {
        error!("Error: \"{}\"", e);
        quit::with_code(1);
    });
}

fn run_subcommand(subcmd: Option<&str>, params: Parameters) -> Result<()> {
    let subcmd = match subcmd {
        Some(s) => s,
        None => bail!("No subcommand selected"),
    };

    info!("Starting {}", subcmd);

    match subcmd {
        "assemble" => {
            let model = pipeline::assemble(&params)?;
            pipeline::write_input(&model, &params)?;
        }
        "simulate" => {
            let model = pipeline::assemble(&params)?;
            pipeline::write_input(&model, &params)?;
            pipeline::simulate(&params)?;
        }
        "extract" => {
            let model = pipeline::assemble(&params)?;
            pipeline::extract(&model, &params)?;
        }
        "report" => {
            let model = pipeline::assemble(&params)?;
            let results = pipeline::extract(&model, &params)?;
            pipeline::report(&model, &results, &params)?;
        }
        "run" => {
            pipeline::run(&params)?;
        }
        _ => {
            // Should be unreachable due to clap catching this error
            bail!("Unrecognized subcommand");
        }
    }

    info!("Finished {}", subcmd);

    Ok(())
}
