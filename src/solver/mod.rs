//! Solver Invocation
//!
//! Serialises a frozen [`Model`] into the workspace and runs the external solver against it.

pub mod input;

use {
    crate::{
        error::{Error, Result},
        model::Model,
        results,
        utils::create_dir_all,
    },
    log::{debug, info},
    std::{
        fs::{self, File},
        io::{self, BufWriter, Write},
        path::{Path, PathBuf},
        process::Command,
    },
};

/// Writes the solver input file set, returning the paths written
pub fn write_input(model: &Model, workspace: &Path) -> Result<Vec<PathBuf>> {
    create_dir_all(workspace)?;

    let mut written = vec![];

    let mut write = |name: &str, f: &dyn Fn(&mut BufWriter<File>) -> io::Result<()>| {
        let path = workspace.join(name);
        let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
        let mut w = BufWriter::new(file);
        f(&mut w)
            .and_then(|_| w.flush())
            .map_err(|e| Error::io(&path, e))?;
        debug!("Wrote {}", path.display());
        written.push(path);
        Ok::<_, Error>(())
    };

    write(input::HYDRUS1D_DAT, &|w| input::write_hydrus1d(model, w))?;
    write(input::SELECTOR_IN, &|w| input::write_selector(model, w))?;
    write(input::PROFILE_DAT, &|w| input::write_profile(model, w))?;
    if model.atmosphere.is_some() {
        write(input::ATMOSPH_IN, &|w| input::write_atmosphere(model, w))?;
    }

    info!(
        "Wrote {} solver input files to \"{}\"",
        written.len(),
        workspace.display()
    );

    Ok(written)
}

/// Runs `<executable> <workspace> -1` and waits for it to exit
///
/// Output files left by an earlier run are removed first so that a failed solve can never
/// be mistaken for a successful one.
pub fn simulate(executable: &Path, workspace: &Path) -> Result<()> {
    let executable = fs::canonicalize(executable).map_err(|e| {
        Error::Solver(format!(
            "executable {} is unreachable: {}",
            executable.display(),
            e
        ))
    })?;
    let workspace = fs::canonicalize(workspace).map_err(|e| Error::io(workspace, e))?;

    for name in results::OUTPUT_FILES.iter() {
        let path = workspace.join(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
    }

    info!(
        "Running {} in \"{}\"",
        executable.display(),
        workspace.display()
    );

    let output = Command::new(&executable)
        .arg(&workspace)
        .arg("-1")
        .current_dir(&workspace)
        .output()
        .map_err(|e| {
            Error::Solver(format!("failed to start {}: {}", executable.display(), e))
        })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("solver: {}", line);
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        debug!("solver stderr: {}", line);
    }

    if !output.status.success() {
        return Err(Error::Solver(format!(
            "{} exited with {}{}",
            executable.display(),
            output.status,
            stderr
                .lines()
                .last()
                .map(|l| format!(": {}", l))
                .unwrap_or_default()
        )));
    }

    info!("Solver finished");

    Ok(())
}

#[cfg(all(test, target_os = "linux"))]
mod test {
    use {super::*, tempdir::TempDir};

    #[test]
    fn missing_executable() {
        let tempdir = TempDir::new("soil-column").unwrap();

        match simulate(&tempdir.path().join("hydrus"), tempdir.path()) {
            Err(Error::Solver(message)) => assert!(message.contains("unreachable")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn nonzero_exit() {
        let tempdir = TempDir::new("soil-column").unwrap();

        assert!(matches!(
            simulate(Path::new("/bin/false"), tempdir.path()),
            Err(Error::Solver(_))
        ));
    }

    #[test]
    fn clears_stale_output() {
        let tempdir = TempDir::new("soil-column").unwrap();
        let stale = tempdir.path().join(results::T_LEVEL_OUT);
        fs::write(&stale, "stale").unwrap();

        simulate(Path::new("/bin/true"), tempdir.path()).unwrap();
        assert!(!stale.exists());
    }
}
