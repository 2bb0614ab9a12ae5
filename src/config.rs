//! Resolved mirror configuration.
//!
//! [`SourceConfig`] holds the four required connection fields and
//! [`MirrorOptions`] the tunables. Both are validated on construction so that
//! a [`MirrorConfig`] handed to the pipeline is always usable.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Field names the host must supply, in display order.
pub const REQUIRED_FIELDS: [&str; 4] = ["base_url", "username", "token", "target_directory"];

/// Largest page Gitea serves by default (`MAX_RESPONSE_ITEMS`).
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("missing required configuration field `{0}`")]
    Missing(&'static str),

    #[error("configuration field `{0}` must not be empty")]
    Empty(&'static str),

    #[error("invalid base_url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid value for `{option}`: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("could not read config file `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file `{}`: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// What to do when a repository's destination directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Leave it alone and record the repository as skipped.
    Skip,
    /// Record the repository as failed without touching it.
    Fail,
    /// Fast-forward the existing clone.
    Update,
}

impl Default for ExistingPolicy {
    fn default() -> Self {
        ExistingPolicy::Skip
    }
}

impl FromStr for ExistingPolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(ExistingPolicy::Skip),
            "fail" => Ok(ExistingPolicy::Fail),
            "update" => Ok(ExistingPolicy::Update),
            other => Err(ConfigurationError::InvalidOption {
                option: "on_existing",
                reason: format!("expected one of skip, fail, update; got `{}`", other),
            }),
        }
    }
}

impl fmt::Display for ExistingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExistingPolicy::Skip => "skip",
            ExistingPolicy::Fail => "fail",
            ExistingPolicy::Update => "update",
        };
        f.write_str(name)
    }
}

/// Connection to the forge and the local destination.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Forge root URL without trailing slash.
    pub base_url: String,
    pub username: String,
    pub token: String,
    pub target_directory: PathBuf,
}

impl SourceConfig {
    pub fn new(
        base_url: &str,
        username: &str,
        token: &str,
        target_directory: impl Into<PathBuf>,
    ) -> Result<Self, ConfigurationError> {
        let base_url = non_empty("base_url", base_url)?.trim_end_matches('/');
        let username = non_empty("username", username)?;
        let token = non_empty("token", token)?;
        let target_directory = target_directory.into();
        if target_directory.as_os_str().is_empty() {
            return Err(ConfigurationError::Empty("target_directory"));
        }

        let parsed = Url::parse(base_url).map_err(|e| ConfigurationError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigurationError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: base_url.to_string(),
            username: username.to_string(),
            token: token.to_string(),
            target_directory,
        })
    }

    /// Build from the host framework's named parameters.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ConfigurationError> {
        let get = |field: &'static str| {
            params
                .get(field)
                .map(String::as_str)
                .ok_or(ConfigurationError::Missing(field))
        };

        Self::new(
            get("base_url")?,
            get("username")?,
            get("token")?,
            get("target_directory")?,
        )
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("target_directory", &self.target_directory)
            .finish()
    }
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ConfigurationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigurationError::Empty(field))
    } else {
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Walk `page`/`limit` until the listing is exhausted.
    pub follow_pagination: bool,
    pub page_size: u32,
    pub on_existing: ExistingPolicy,
    /// Number of clones in flight. 1 means strictly sequential.
    pub concurrency: usize,
    pub clone_timeout: Option<Duration>,
    /// Deadline for the whole clone phase, measured from its start.
    pub batch_deadline: Option<Duration>,
    pub request_timeout: Duration,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            follow_pagination: true,
            page_size: MAX_PAGE_SIZE,
            on_existing: ExistingPolicy::default(),
            concurrency: 1,
            clone_timeout: None,
            batch_deadline: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl MirrorOptions {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.concurrency == 0 {
            return Err(ConfigurationError::InvalidOption {
                option: "concurrency",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigurationError::InvalidOption {
                option: "page_size",
                reason: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
        for (option, value) in [
            ("clone_timeout", self.clone_timeout),
            ("batch_deadline", self.batch_deadline),
            ("request_timeout", Some(self.request_timeout)),
        ] {
            if value == Some(Duration::ZERO) {
                return Err(ConfigurationError::InvalidOption {
                    option,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Everything the pipeline needs, resolved and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub source: SourceConfig,
    pub options: MirrorOptions,
}

impl MirrorConfig {
    pub fn new(source: SourceConfig, options: MirrorOptions) -> Result<Self, ConfigurationError> {
        options.validate()?;
        Ok(Self { source, options })
    }
}
