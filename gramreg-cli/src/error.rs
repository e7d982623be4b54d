use gramreg_core::ExtractError;
use gramreg_engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RunError>;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("{0} not found, check the path for typos")]
    SourceNotFound(PathBuf),

    /// No updated grammar to compare against and no test set requested.
    #[error("provide a second grammar at {compare} for comparison or generate a tset file")]
    MissingComparisonTarget { grammar: PathBuf, compare: PathBuf },

    #[error("{0} produced no sentences")]
    NoSentences(PathBuf),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Output(#[from] ExtractError),

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] gramreg_config::Error),
}

impl RunError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RunError::Engine(err) => err.hint(),
            RunError::NoSentences(_) => Some("The grammar may not be able to produce any sentence."),
            _ => None,
        }
    }
}
