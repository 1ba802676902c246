use std::{
    fs,
    path::{Path, PathBuf},
};

use glob::glob;

use crate::error::ObtainError;

/// What the retriever needs to know about, or do to, the local filesystem.
pub trait FsProbe {
    fn exists(&self, path: &Path) -> bool;

    /// Paths matching a glob pattern, sorted.
    fn matching(&self, pattern: &str) -> Result<Vec<PathBuf>, ObtainError>;

    /// Used to clean up after a download that did not finish.
    fn remove_file(&self, path: &Path) -> Result<(), ObtainError>;
}

impl<T: FsProbe + ?Sized> FsProbe for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn matching(&self, pattern: &str) -> Result<Vec<PathBuf>, ObtainError> {
        (**self).matching(pattern)
    }

    fn remove_file(&self, path: &Path) -> Result<(), ObtainError> {
        (**self).remove_file(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FsProbe for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn matching(&self, pattern: &str) -> Result<Vec<PathBuf>, ObtainError> {
        let mut paths = Vec::new();
        for entry in glob(pattern)? {
            paths.push(entry?);
        }
        paths.sort();
        Ok(paths)
    }

    fn remove_file(&self, path: &Path) -> Result<(), ObtainError> {
        fs::remove_file(path).map_err(|source| ObtainError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
