//! Error types for slot extraction and test set output.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// A parse-result document is not well-formed XML.
    #[error("malformed parse result: {0}")]
    Parse(#[from] roxmltree::Error),

    /// Writing a .tset or .comp file failed.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Write {
            path: path.into(),
            source,
        }
    }
}
