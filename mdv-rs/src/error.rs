//! Fatal errors for a document pass.
//!
//! Expression failures are not here: they are recovered inside the
//! resolution pass (see [`EvalError`](crate::script::expr::EvalError)) and
//! never abort a run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("unknown encoding '{0}'")]
    UnknownEncoding(String),

    #[error("{}: input is not valid {encoding}", path.display())]
    Undecodable { path: PathBuf, encoding: &'static str },

    #[error("{}: text cannot be encoded as {encoding}", path.display())]
    Unencodable { path: PathBuf, encoding: &'static str },

    #[error("cannot access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: malformed directive: {message}")]
    MalformedDirective { line: usize, message: String },

    #[error("line {line}: name '{name}' is not defined")]
    UnresolvedReference { line: usize, name: String },

    #[error("line {line}: {message}")]
    Template { line: usize, message: String },

    #[error("no content to write to the output: no rendered line recorded")]
    EmptyOutput,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
