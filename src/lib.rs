//! Download the OptionMetrics IvyDB International daily archives from their FTP
//! server, unzip them and clean up the extracted files.

pub mod archive;
pub mod config;
pub mod error;
pub mod probe;
pub mod retriever;
pub mod runner;

#[cfg(test)]
mod fakes;

pub use config::{ExistenceCheck, RetrieverConfig};
pub use error::ObtainError;
pub use retriever::{Ensured, Retriever};
