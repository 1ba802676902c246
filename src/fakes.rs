//! In-memory stand-ins for the filesystem and for curl/unzip/rm.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use glob::{MatchOptions, Pattern};

use crate::{
    error::ObtainError,
    probe::FsProbe,
    runner::{CommandOutput, CommandRunner},
};

#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<BTreeSet<PathBuf>>,
}

impl MemoryFs {
    pub fn insert(&self, path: impl Into<PathBuf>) {
        self.files.borrow_mut().insert(path.into());
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.files.borrow_mut().remove(path)
    }

    pub fn files(&self) -> Vec<PathBuf> {
        self.files.borrow().iter().cloned().collect()
    }
}

impl FsProbe for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains(path)
    }

    fn matching(&self, pattern: &str) -> Result<Vec<PathBuf>, ObtainError> {
        let pattern = Pattern::new(pattern)?;
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        Ok(self
            .files
            .borrow()
            .iter()
            .filter(|p| pattern.matches_path_with(p, options))
            .cloned()
            .collect())
    }

    fn remove_file(&self, path: &Path) -> Result<(), ObtainError> {
        if self.remove(path) {
            Ok(())
        } else {
            Err(ObtainError::Io {
                path: path.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            })
        }
    }
}

/// Plays curl, unzip and rm against a [`MemoryFs`].  Programs are recognized
/// by file name, so `/opt/local/bin/curl` is curl.
pub struct FakeRunner<'a> {
    fs: &'a MemoryFs,
    /// Archives on the FTP server and the files inside each one.
    remote: BTreeMap<String, Vec<String>>,
    failing: Option<String>,
    timing_out: Option<String>,
    calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl<'a> FakeRunner<'a> {
    pub fn new(fs: &'a MemoryFs) -> FakeRunner<'a> {
        FakeRunner {
            fs,
            remote: BTreeMap::new(),
            failing: None,
            timing_out: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_remote(mut self, archive: &str, members: &[&str]) -> Self {
        self.remote.insert(
            archive.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// Make every call to this program exit with code 1 without doing anything.
    pub fn failing(mut self, program: &str) -> Self {
        self.failing = Some(program.to_string());
        self
    }

    /// Make this program hang until killed.  curl leaves part of the file behind.
    pub fn timing_out(mut self, program: &str) -> Self {
        self.timing_out = Some(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, program: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(p, _)| base_name(p) == program)
            .count()
    }

    fn curl(&self, args: &[String]) -> CommandOutput {
        let name = args[1].rsplit('/').next().unwrap_or_default();
        if self.remote.contains_key(name) {
            self.fs.insert(&args[4]);
            exited(0, "")
        } else {
            // RETR failed
            exited(78, "")
        }
    }

    fn unzip(&self, args: &[String]) -> CommandOutput {
        let archive = Path::new(&args[1]);
        let members = archive
            .file_name()
            .and_then(|n| self.remote.get(n.to_string_lossy().as_ref()));
        match members {
            Some(members) if self.fs.exists(archive) => {
                for m in members {
                    self.fs.insert(Path::new(&args[3]).join(m));
                }
                exited(0, "")
            }
            _ => exited(
                9,
                &format!("unzip:  cannot find or open {}", archive.display()),
            ),
        }
    }

    fn rm(&self, args: &[String]) -> CommandOutput {
        if self.fs.remove(Path::new(&args[0])) {
            exited(0, "")
        } else {
            exited(1, &format!("rm: {}: No such file or directory", args[0]))
        }
    }
}

impl CommandRunner for FakeRunner<'_> {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, ObtainError> {
        self.calls
            .borrow_mut()
            .push((program.to_string(), args.to_vec()));
        let name = base_name(program);
        if self.timing_out.as_deref() == Some(name.as_str()) {
            if name == "curl" {
                self.fs.insert(&args[4]);
            }
            return Err(ObtainError::Timeout {
                program: program.to_string(),
                after: Duration::from_secs(1),
            });
        }
        if self.failing.as_deref() == Some(name.as_str()) {
            return Ok(exited(1, "simulated failure"));
        }
        match name.as_str() {
            "curl" => Ok(self.curl(args)),
            "unzip" => Ok(self.unzip(args)),
            "rm" => Ok(self.rm(args)),
            _ => Err(ObtainError::Launch {
                program: program.to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }
}

fn base_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn exited(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}
