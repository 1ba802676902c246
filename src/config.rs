use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::error::ObtainError;

pub const DEFAULT_FTP_URL: &str = "ftp://ftp.ivydb.com/IvyDBIntl/v2.1/";
pub const DEFAULT_SAVE_DIR: &str = "/if/udata/optionmetrics/raw_zip";
pub const DEFAULT_CURL: &str = "/opt/local/bin/curl";

/// Which path `ensure` looks at to decide if a day was already downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistenceCheck {
    /// `<save_dir>/<YYYYMMDD>`.  This is not the path `fetch` writes, so unless
    /// something else creates it every call ends up downloading the archive.
    #[default]
    BareDate,
    /// `<save_dir>/INTL.IVYDB.<YYYYMMDD>D.zip`
    Archive,
}

impl FromStr for ExistenceCheck {
    type Err = ObtainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bare-date" | "bare_date" | "date" => Ok(ExistenceCheck::BareDate),
            "archive" | "zip" => Ok(ExistenceCheck::Archive),
            other => Err(ObtainError::Config(format!(
                "unknown existence check '{}', expected 'bare-date' or 'archive'",
                other
            ))),
        }
    }
}

/// Locations and programs used by the [`crate::retriever::Retriever`].
///
/// Credentials are not part of the config, curl reads them from `~/.netrc`:
/// ```text
/// machine ftp.ivydb.com
///      login USERNAME
///      password PASSWORD
/// ```
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Remote directory holding the daily zip files.  Case sensitive.
    pub ftp_url: String,
    pub save_dir: String,
    pub curl_path: String,
    pub unzip_path: String,
    pub rm_path: String,
    /// Kill external programs that run longer than this.  `None` waits forever.
    pub timeout: Option<Duration>,
    pub existence_check: ExistenceCheck,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        RetrieverConfig {
            ftp_url: DEFAULT_FTP_URL.to_string(),
            save_dir: DEFAULT_SAVE_DIR.to_string(),
            curl_path: DEFAULT_CURL.to_string(),
            unzip_path: "unzip".to_string(),
            rm_path: "rm".to_string(),
            timeout: None,
            existence_check: ExistenceCheck::default(),
        }
    }
}

impl RetrieverConfig {
    /// Read the configuration from the `IVYDB_*` environment variables, falling
    /// back to the defaults for the ones not set.
    pub fn from_env() -> Result<RetrieverConfig, ObtainError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<RetrieverConfig, ObtainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = RetrieverConfig::default();
        if let Some(v) = lookup("IVYDB_FTP_URL") {
            config.ftp_url = v;
        }
        if let Some(v) = lookup("IVYDB_SAVE_DIR") {
            config.save_dir = v;
        }
        if let Some(v) = lookup("IVYDB_CURL") {
            config.curl_path = v;
        }
        if let Some(v) = lookup("IVYDB_UNZIP") {
            config.unzip_path = v;
        }
        if let Some(v) = lookup("IVYDB_RM") {
            config.rm_path = v;
        }
        if let Some(v) = lookup("IVYDB_TIMEOUT_SECS") {
            let secs = v.trim().parse::<u64>().map_err(|_| {
                ObtainError::Config(format!("IVYDB_TIMEOUT_SECS is not a number: '{}'", v))
            })?;
            config.timeout = if secs == 0 {
                None
            } else {
                Some(Duration::from_secs(secs))
            };
        }
        if let Some(v) = lookup("IVYDB_EXISTENCE_CHECK") {
            config.existence_check = v.parse()?;
        }
        Ok(config)
    }

    /// Full url of a file on the FTP server.
    pub fn remote_url(&self, name: &str) -> String {
        if self.ftp_url.ends_with('/') {
            format!("{}{}", self.ftp_url, name)
        } else {
            format!("{}/{}", self.ftp_url, name)
        }
    }

    /// Where a file with this name is saved locally.  Does not check if it exists.
    pub fn local_path(&self, name: &str) -> PathBuf {
        Path::new(&self.save_dir).join(name)
    }
}
