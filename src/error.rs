use {
    std::{io, path::PathBuf},
    thiserror::Error,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of one pipeline stage; every variant names the offending artifact
#[derive(Error, Debug)]
pub enum Error {
    /// Misaligned or incomplete tables supplied during model assembly
    #[error("configuration error: {0}")]
    Config(String),

    /// Solver could not be started or exited unsuccessfully
    #[error("solver invocation failed: {0}")]
    Solver(String),

    /// Expected solver output file is absent
    #[error("missing solver output {}", .0.display())]
    MissingOutput(PathBuf),

    /// Solver output file exists but could not be parsed
    #[error("malformed output in {} at line {line}: {message}", .path.display())]
    MalformedOutput {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render {}: {message}", .path.display())]
    Plot { path: PathBuf, message: String },
}

impl Error {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv<P: Into<PathBuf>>(path: P, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn malformed<P: Into<PathBuf>, S: Into<String>>(path: P, line: usize, message: S) -> Self {
        Error::MalformedOutput {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
