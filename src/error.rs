use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{path:?} file format error: expected {expected}")]
    Format {
        path: PathBuf,
        expected: &'static str,
    },

    #[error("Malformed record on line {line} in {source_name}: {reason}")]
    MalformedRecord {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Error reading or writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Failure writing report output to the caller's writer.
    pub(crate) fn output(source: io::Error) -> Self {
        Error::io("<output>", source)
    }

    pub(crate) fn malformed(source_name: &str, line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            source_name: source_name.to_string(),
            line,
            reason: reason.into(),
        }
    }
}
