use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::{ConfigurationError, ExistingPolicy};

/// Config file as written by the user. Every field is optional here;
/// required ones are checked once file and flags are merged.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Config {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub target_directory: Option<PathBuf>,
    pub follow_pagination: Option<bool>,
    pub page_size: Option<u32>,
    pub on_existing: Option<ExistingPolicy>,
    pub concurrency: Option<usize>,
    pub clone_timeout_secs: Option<u64>,
    pub batch_deadline_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

pub fn read_config(config: &str) -> Result<Config, serde_yaml::Error> {
    serde_yaml::from_str(config)
}

pub fn read_config_file(path: &Path) -> Result<Config, ConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    read_config(&content).map_err(|source| ConfigurationError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
