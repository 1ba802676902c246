use std::path::{Path, PathBuf};

use glob::Pattern;
use jiff::civil::Date;
use log::{debug, error, info, warn};

use crate::{
    archive::{archive_name, extracted_pattern, yyyymmdd},
    config::{ExistenceCheck, RetrieverConfig},
    error::ObtainError,
    probe::{FsProbe, LocalFs},
    runner::{CommandRunner, SystemRunner},
};

/// What [`Retriever::ensure`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ensured {
    /// The existence check path was there, nothing was downloaded.
    AlreadyPresent(PathBuf),
    Fetched(PathBuf),
}

/// Downloads, unzips and cleans up the IvyDB International daily files.
pub struct Retriever<R, P> {
    config: RetrieverConfig,
    runner: R,
    probe: P,
}

impl Retriever<SystemRunner, LocalFs> {
    /// Run the real programs against the local disk.
    pub fn from_config(config: RetrieverConfig) -> Self {
        let runner = SystemRunner::new(config.timeout);
        Retriever::new(config, runner, LocalFs)
    }
}

impl<R: CommandRunner, P: FsProbe> Retriever<R, P> {
    pub fn new(config: RetrieverConfig, runner: R, probe: P) -> Self {
        Retriever {
            config,
            runner,
            probe,
        }
    }

    /// Local path of the zip file for the day.  Does not check if the file exists.
    pub fn archive_path(&self, date: &Date) -> PathBuf {
        self.config.local_path(&archive_name(date))
    }

    /// The path [`Retriever::ensure`] looks at.
    pub fn existence_check_path(&self, date: &Date) -> PathBuf {
        match self.config.existence_check {
            ExistenceCheck::BareDate => self.config.local_path(&yyyymmdd(date)),
            ExistenceCheck::Archive => self.archive_path(date),
        }
    }

    /// Get the file `name` from the FTP server and save it in the save directory.
    ///
    /// curl takes the username and password from the user's `.netrc`.  Its exit
    /// code is not looked at: the download worked if and only if the file is on
    /// disk afterwards.  No retries.  If curl could not be run to the end (e.g.
    /// it was killed after the timeout), a partial file it left is removed.
    pub fn fetch(&self, name: &str) -> Result<PathBuf, ObtainError> {
        let dest = self.config.local_path(name);
        let existed = self.probe.exists(&dest);
        let args = vec![
            "-s".to_string(),
            self.config.remote_url(name),
            "--netrc".to_string(),
            "--output".to_string(),
            dest.display().to_string(),
        ];
        let output = match self.runner.run(&self.config.curl_path, &args) {
            Ok(output) => output,
            Err(e) => {
                if !existed && self.probe.exists(&dest) {
                    warn!("removing partial download {}", dest.display());
                    if let Err(rm_err) = self.probe.remove_file(&dest) {
                        error!("{}", rm_err);
                    }
                }
                return Err(e);
            }
        };

        if self.probe.exists(&dest) {
            info!("successfully downloaded {}", name);
            Ok(dest)
        } else {
            debug!(
                "curl exited with {:?} for {}: {}",
                output.code,
                name,
                output.stderr.trim()
            );
            Err(ObtainError::Retrieval {
                name: name.to_string(),
            })
        }
    }

    /// Fetch the archive for the day.
    pub fn fetch_date(&self, date: Date) -> Result<PathBuf, ObtainError> {
        self.fetch(&archive_name(&date))
    }

    /// Fetch yesterday's archive.  This is what the scheduled job runs; it is up
    /// to the caller to decide what a failure means.
    pub fn fetch_previous_day(&self, today: Date) -> Result<PathBuf, ObtainError> {
        self.fetch_date(today.yesterday()?)
    }

    /// Unzip the archive for the day into the save directory, overwriting files
    /// from an earlier extraction.  The archive must already be downloaded.
    pub fn extract(&self, date: Date) -> Result<(), ObtainError> {
        let name = archive_name(&date);
        let args = vec![
            "-o".to_string(),
            self.config.local_path(&name).display().to_string(),
            "-d".to_string(),
            self.config.save_dir.clone(),
        ];
        let output = self.runner.run(&self.config.unzip_path, &args)?;
        if !output.success() {
            error!("*** File {} was not found or could not be unzipped ***", name);
            return Err(ObtainError::Extraction {
                archive: name,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        info!("extracted {}", name);
        Ok(())
    }

    /// Extracted files for the day currently in the save directory.
    pub fn extracted(&self, date: Date) -> Result<Vec<PathBuf>, ObtainError> {
        let dir = Pattern::escape(&self.config.save_dir);
        let pattern = Path::new(&dir).join(extracted_pattern(&date));
        self.probe.matching(&pattern.to_string_lossy())
    }

    /// Delete the extracted files for the day, one `rm` per file.  Returns how
    /// many were removed.  Having nothing to delete is fine.
    pub fn purge(&self, date: Date) -> Result<usize, ObtainError> {
        let paths = self.extracted(date)?;
        for path in &paths {
            let output = self
                .runner
                .run(&self.config.rm_path, &[path.display().to_string()])?;
            if !output.success() {
                return Err(ObtainError::Deletion {
                    path: path.clone(),
                    code: output.code,
                    stderr: output.stderr.trim().to_string(),
                });
            }
            info!("removed {}", path.display());
        }
        Ok(paths.len())
    }

    /// Download the archive for the day unless the existence check says it is
    /// already there.
    pub fn ensure(&self, date: Date) -> Result<Ensured, ObtainError> {
        let check = self.existence_check_path(&date);
        if self.probe.exists(&check) {
            debug!("{} exists, nothing to download", check.display());
            return Ok(Ensured::AlreadyPresent(check));
        }
        self.fetch_date(date).map(Ensured::Fetched)
    }
}
