use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Errors raised while obtaining, extracting or purging an IvyDB archive.
#[derive(Error, Debug)]
pub enum ObtainError {
    /// The transfer finished but the archive is not on disk.
    #[error(
        "file {name} cannot be processed, either it was not found on the FTP server, or it could not be saved"
    )]
    Retrieval { name: String },

    #[error("failed to extract {archive} (exit code {code:?}): {stderr}")]
    Extraction {
        archive: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to delete {path:?} (exit code {code:?}): {stderr}")]
    Deletion {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    /// The external program could not be started, or waiting on it failed.
    #[error("failed to run {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} did not finish within {after:?} and was killed")]
    Timeout { program: String, after: Duration },

    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Date(#[from] jiff::Error),
}
